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
//! Kernel driver: one full force- or energy-evaluation pass
//!
//! The driver validates the input once, builds the shared work queue, and
//! drives the pair kernel over every claimed outer index. In a parallel
//! pass each worker accumulates into a thread-private buffer sized to the
//! full system and the private buffers are reduced into the shared output
//! at the end; force and energy accumulation are commutative and
//! associative, so any claim interleaving yields the same totals up to
//! floating-point rounding order (which is deliberately not guaranteed to
//! be bit-identical across thread counts).

use crate::kernel::{eval_outer, eval_outer_energy, NonbondedInput};
use crate::partition::WorkQueue;
use crate::system::Accumulators;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Diagnostic counters published by one pass.
///
/// Purely for performance accounting; correctness never depends on them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KernelStats {
    /// Outer indices processed.
    pub outer_count: usize,
    /// Neighbor pairs processed.
    pub inner_count: usize,
}

impl KernelStats {
    fn merge(&mut self, other: KernelStats) {
        self.outer_count += other.outer_count;
        self.inner_count += other.inner_count;
    }
}

fn check_output_sizes(input: &NonbondedInput<'_>, out: &Accumulators) {
    assert_eq!(
        out.forces.len(),
        3 * input.n_particles(),
        "force accumulator sized for a different particle count"
    );
    assert_eq!(
        out.shift_forces.len(),
        input.shift_vectors.len(),
        "shift force accumulator sized for a different shift table"
    );
    assert_eq!(
        out.coulomb_energy.len(),
        out.vdw_energy.len(),
        "energy accumulators must agree on group count"
    );
    if let Some(max) = input.list.max_group_index() {
        assert!(
            max < out.coulomb_energy.len(),
            "neighbor list references energy group {} of {}",
            max,
            out.coulomb_energy.len()
        );
    }
}

fn serial_pass(
    input: &NonbondedInput<'_>,
    out: &mut Accumulators,
    eval: fn(usize, &NonbondedInput<'_>, &mut Accumulators) -> usize,
) -> KernelStats {
    let queue = WorkQueue::new(input.list.n_outer(), 1);
    let mut stats = KernelStats::default();
    while let Some(range) = queue.claim() {
        for n in range {
            stats.inner_count += eval(n, input, out);
            stats.outer_count += 1;
        }
    }
    stats
}

#[cfg(feature = "parallel")]
fn parallel_pass(
    input: &NonbondedInput<'_>,
    out: &mut Accumulators,
    threads: usize,
    eval: fn(usize, &NonbondedInput<'_>, &mut Accumulators) -> usize,
) -> KernelStats {
    let queue = WorkQueue::new(input.list.n_outer(), threads);
    let n_groups = out.coulomb_energy.len();

    // Thread-private accumulation plus a final reduction keeps neighbor
    // force writes race-free without per-particle locking: the neighbor
    // list makes no disjointness promise about j indices across chunks.
    let results: Vec<(Accumulators, KernelStats)> = (0..threads)
        .into_par_iter()
        .map(|_| {
            let mut local =
                Accumulators::zeroed(input.n_particles(), input.n_shifts(), n_groups);
            let mut stats = KernelStats::default();
            while let Some(range) = queue.claim() {
                for n in range {
                    stats.inner_count += eval(n, input, &mut local);
                    stats.outer_count += 1;
                }
            }
            (local, stats)
        })
        .collect();

    let mut stats = KernelStats::default();
    for (local, worker_stats) in &results {
        out.absorb(local);
        stats.merge(*worker_stats);
    }
    stats
}

fn run_pass(
    input: &NonbondedInput<'_>,
    out: &mut Accumulators,
    threads: usize,
    eval: fn(usize, &NonbondedInput<'_>, &mut Accumulators) -> usize,
) -> KernelStats {
    input.validate();
    check_output_sizes(input, out);

    #[cfg(feature = "parallel")]
    {
        if threads > 1 {
            return parallel_pass(input, out, threads, eval);
        }
    }
    let _ = threads;
    serial_pass(input, out, eval)
}

/// Run one full force-and-energy pass.
///
/// Adds forces, shift forces and per-group energies into `out` and returns
/// the diagnostic iteration counts. With `threads > 1` (and the `parallel`
/// feature enabled) the outer indices are shared across that many rayon
/// workers via the claim cursor.
pub fn run_force_pass(
    input: &NonbondedInput<'_>,
    out: &mut Accumulators,
    threads: usize,
) -> KernelStats {
    run_pass(input, out, threads, eval_outer)
}

/// Run one energy-only pass.
///
/// Produces energy totals identical to [`run_force_pass`] on the same
/// inputs, via the values-only table path; force buffers in `out` are left
/// untouched.
pub fn run_energy_pass(
    input: &NonbondedInput<'_>,
    out: &mut Accumulators,
    threads: usize,
) -> KernelStats {
    run_pass(input, out, threads, eval_outer_energy)
}
