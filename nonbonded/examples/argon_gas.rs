// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Argon gas force evaluation
//!
//! Builds a small box of neutral Lennard-Jones particles (argon-like
//! parameters in reduced units), constructs a half neighbor list with a
//! naive O(n²) search, and runs one force-and-energy pass over it.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --example argon_gas
//! ```

use nonbonded::driver::run_force_pass;
use nonbonded::kernel::NonbondedInput;
use nonbonded::pairlist::NeighborList;
use nonbonded::simd::active_simd_description;
use nonbonded::system::{Accumulators, PairParams};
use nonbonded::table::{PotentialTable, Term};

/// Deterministic pseudo-random value in [0, 1) from a linear congruential
/// generator, so the example needs no external dependencies.
fn uniform(seed: &mut u64) -> f32 {
    *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    ((*seed >> 33) as f32) / (u32::MAX >> 1) as f32
}

const SEED: u64 = 0x00a6_900d ^ 0x9e37_79b9_7f4a_7c15;

fn main() {
    println!("=== Argon Gas Example ===\n");
    println!("Vector level: {}\n", active_simd_description());

    // 5×5×5 lattice at 1.1σ spacing, jittered so the geometry is not
    // perfectly symmetric.
    let spacing = 1.1f32;
    let mut seed = SEED;
    let mut positions = Vec::new();
    for ix in 0..5 {
        for iy in 0..5 {
            for iz in 0..5 {
                positions.push(ix as f32 * spacing + 0.1 * (uniform(&mut seed) - 0.5));
                positions.push(iy as f32 * spacing + 0.1 * (uniform(&mut seed) - 0.5));
                positions.push(iz as f32 * spacing + 0.1 * (uniform(&mut seed) - 0.5));
            }
        }
    }
    let n = positions.len() / 3;

    // Neutral atoms: charges are zero, only dispersion and repulsion act.
    let charges = vec![0.0f32; n];
    let type_ids = vec![0usize; n];
    let mut params = PairParams::new(1);
    // Reduced-unit Lennard-Jones: c6 = 4εσ⁶, c12 = 4εσ¹² with ε = σ = 1.
    params.set(0, 0, 4.0, 4.0);

    let cutoff = 2.5f32;
    let mut list = NeighborList::new();
    for i in 0..n {
        let mut js = Vec::new();
        for j in (i + 1)..n {
            let dx = positions[3 * i] - positions[3 * j];
            let dy = positions[3 * i + 1] - positions[3 * j + 1];
            let dz = positions[3 * i + 2] - positions[3 * j + 2];
            if dx * dx + dy * dy + dz * dz < cutoff * cutoff {
                js.push(j);
            }
        }
        if !js.is_empty() {
            list.push(i, 0, 0, &js);
        }
    }

    let shift_vectors = vec![0.0f32; 3];
    let table = PotentialTable::standard_coulomb_lj(500.0, 2048);

    let input = NonbondedInput {
        list: &list,
        positions: &positions,
        charges: &charges,
        type_ids: &type_ids,
        params: &params,
        shift_vectors: &shift_vectors,
        coulomb_factor: 1.0,
        table: &table,
    };

    let mut out = Accumulators::zeroed(n, 1, 1);
    let stats = run_force_pass(&input, &mut out, 1);

    println!("Particles:        {}", n);
    println!("Outer entries:    {}", stats.outer_count);
    println!("Pairs evaluated:  {}", stats.inner_count);
    println!();
    println!("Coulomb energy:   {:+.6}", out.total_energy(Term::Coulomb));
    println!("LJ energy:        {:+.6}", out.total_energy(Term::Dispersion));

    let net = out.net_force();
    println!(
        "Net force:        [{:+.3e}, {:+.3e}, {:+.3e}] (should be ~0)",
        net[0], net[1], net[2]
    );

    // Largest per-particle force magnitude, a quick sanity read on how
    // compressed the lattice is.
    let mut max_f = 0.0f32;
    for i in 0..n {
        let fx = out.forces[3 * i];
        let fy = out.forces[3 * i + 1];
        let fz = out.forces[3 * i + 2];
        max_f = max_f.max((fx * fx + fy * fy + fz * fz).sqrt());
    }
    println!("Max |force|:      {:.4}", max_f);
}
