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
//! Integration tests pinning the remainder paths and kernel variants
//! against each other

use approx::assert_relative_eq;
use nonbonded::driver::{run_energy_pass, run_force_pass};
use nonbonded::kernel::NonbondedInput;
use nonbonded::pairlist::NeighborList;
use nonbonded::system::{Accumulators, PairParams};
use nonbonded::table::PotentialTable;

struct Ring {
    positions: Vec<f32>,
    charges: Vec<f32>,
    type_ids: Vec<usize>,
    params: PairParams,
    shift_vectors: Vec<f32>,
    table: PotentialTable,
}

/// Particle 0 at the origin surrounded by `n` neighbors on a ring of
/// radius 1.3, slightly staggered in z so no two displacements coincide.
fn ring(n: usize) -> Ring {
    let mut positions = vec![0.0, 0.0, 0.0];
    for k in 0..n {
        let angle = 2.0 * std::f32::consts::PI * k as f32 / n as f32;
        positions.push(1.3 * angle.cos());
        positions.push(1.3 * angle.sin());
        positions.push(0.05 * k as f32);
    }
    let charges: Vec<f32> = (0..=n).map(|i| if i % 2 == 0 { 0.7 } else { -0.6 }).collect();
    let type_ids = vec![0usize; n + 1];
    let mut params = PairParams::new(1);
    params.set(0, 0, 3e-3, 2e-6);

    Ring {
        positions,
        charges,
        type_ids,
        params,
        shift_vectors: vec![0.0, 0.0, 0.0],
        table: PotentialTable::standard_coulomb_lj(100.0, 512),
    }
}

impl Ring {
    fn input<'a>(&'a self, list: &'a NeighborList) -> NonbondedInput<'a> {
        NonbondedInput {
            list,
            positions: &self.positions,
            charges: &self.charges,
            type_ids: &self.type_ids,
            params: &self.params,
            shift_vectors: &self.shift_vectors,
            coulomb_factor: 1.0,
            table: &self.table,
        }
    }
}

#[test]
fn test_remainder_paths_match_one_at_a_time() {
    // Neighbor counts 1..=9 hit every remainder lane count (r = 0, 1, 2,
    // 3) on top of zero, one and two full-width batches. The batched
    // result must match pushing each neighbor through its own outer entry,
    // which always takes the 1-wide path.
    for n_neighbors in 1..=9usize {
        let system = ring(n_neighbors);
        let js: Vec<usize> = (1..=n_neighbors).collect();

        let mut batched_list = NeighborList::new();
        batched_list.push(0, 0, 0, &js);

        let mut singles_list = NeighborList::new();
        for &j in &js {
            singles_list.push(0, 0, 0, &[j]);
        }

        let n = n_neighbors + 1;
        let mut batched = Accumulators::zeroed(n, 1, 1);
        run_force_pass(&system.input(&batched_list), &mut batched, 1);
        let mut singles = Accumulators::zeroed(n, 1, 1);
        run_force_pass(&system.input(&singles_list), &mut singles, 1);

        for (a, b) in batched.forces.iter().zip(&singles.forces) {
            assert_relative_eq!(*a, *b, epsilon = 1e-4, max_relative = 1e-4);
        }
        assert_relative_eq!(
            batched.coulomb_energy[0],
            singles.coulomb_energy[0],
            epsilon = 1e-4,
            max_relative = 1e-4
        );
        assert_relative_eq!(
            batched.vdw_energy[0],
            singles.vdw_energy[0],
            epsilon = 1e-4,
            max_relative = 1e-4
        );
    }
}

#[test]
fn test_energy_only_pass_reproduces_full_pass_energies() {
    let system = ring(7);
    let js: Vec<usize> = (1..=7).collect();
    let mut list = NeighborList::new();
    list.push(0, 0, 0, &js);
    let input = system.input(&list);

    let mut full = Accumulators::zeroed(8, 1, 1);
    let full_stats = run_force_pass(&input, &mut full, 1);

    let mut energy_only = Accumulators::zeroed(8, 1, 1);
    let energy_stats = run_energy_pass(&input, &mut energy_only, 1);

    assert_eq!(full_stats, energy_stats);
    // Same lookup indices, same accumulation order: the values-only path
    // must agree to rounding noise.
    assert_relative_eq!(
        full.coulomb_energy[0],
        energy_only.coulomb_energy[0],
        epsilon = 1e-6,
        max_relative = 1e-6
    );
    assert_relative_eq!(
        full.vdw_energy[0],
        energy_only.vdw_energy[0],
        epsilon = 1e-6,
        max_relative = 1e-6
    );
}

#[test]
fn test_two_charges_match_analytic_coulomb() {
    // Pure inverse-square tabulated term: energy is the interpolated 1/r
    // times the charge product, force the analytic derivative.
    let r = 1.25f32;
    let positions = vec![0.0, 0.0, 0.0, r, 0.0, 0.0];
    let charges = vec![1.0, 1.0];
    let type_ids = vec![0, 0];
    let params = PairParams::new(1);
    let shift_vectors = vec![0.0, 0.0, 0.0];
    let table = PotentialTable::tabulate(
        400.0,
        1024,
        &[nonbonded::table::TermSpec {
            term: nonbonded::table::Term::Coulomb,
            value: &|x| 1.0 / x,
            derivative: &|x| -1.0 / (x * x),
        }],
    );

    let mut list = NeighborList::new();
    list.push(0, 0, 0, &[1]);
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

    let mut out = Accumulators::zeroed(2, 1, 1);
    run_force_pass(&input, &mut out, 1);

    assert_relative_eq!(out.coulomb_energy[0], 1.0 / r, max_relative = 1e-3);
    // Repulsive pair: force on particle 0 points along -x with magnitude
    // 1/r².
    assert_relative_eq!(out.forces[0], -1.0 / (r * r), max_relative = 1e-3);
    assert_relative_eq!(out.forces[3], 1.0 / (r * r), max_relative = 1e-3);
}
