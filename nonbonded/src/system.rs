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
//! Per-particle arrays, pair parameters and output accumulators
//!
//! Everything here is index-addressed contiguous storage, allocated and
//! populated by external collaborators before a pass and never resized by
//! the kernels. Positions, charges, types and parameters are read-only for
//! the duration of a pass; forces and energies are additive write targets.

use crate::table::Term;

/// Symmetric type×type matrix of dispersion/repulsion coefficients.
///
/// Stored row-major with two scalars per pair, addressed the way the inner
/// loop wants it: a row offset derived once per outer particle, plus two
/// entries per neighbor type.
#[derive(Debug, Clone)]
pub struct PairParams {
    n_types: usize,
    c6c12: Vec<f32>,
}

impl PairParams {
    /// Create an all-zero matrix for `n_types` particle types.
    pub fn new(n_types: usize) -> Self {
        assert!(n_types > 0, "at least one particle type is required");
        PairParams {
            n_types,
            c6c12: vec![0.0; 2 * n_types * n_types],
        }
    }

    /// Number of particle types.
    pub fn n_types(&self) -> usize {
        self.n_types
    }

    /// Set the coefficients for a type pair, symmetrically.
    pub fn set(&mut self, type_a: usize, type_b: usize, c6: f32, c12: f32) {
        assert!(type_a < self.n_types && type_b < self.n_types, "type index out of range");
        let ab = 2 * (self.n_types * type_a + type_b);
        let ba = 2 * (self.n_types * type_b + type_a);
        self.c6c12[ab] = c6;
        self.c6c12[ab + 1] = c12;
        self.c6c12[ba] = c6;
        self.c6c12[ba + 1] = c12;
    }

    /// Row offset for an outer particle's type, precomputed once per entry.
    #[inline(always)]
    pub fn row_offset(&self, type_i: usize) -> usize {
        2 * self.n_types * type_i
    }

    /// Coefficients at a row offset plus neighbor type.
    #[inline(always)]
    pub fn pair(&self, row_offset: usize, type_j: usize) -> (f32, f32) {
        let base = row_offset + 2 * type_j;
        (self.c6c12[base], self.c6c12[base + 1])
    }
}

/// Additive output region of one force-evaluation pass.
///
/// One instance is owned per worker thread during a parallel pass and
/// merged with [`Accumulators::absorb`] afterwards, so no two threads ever
/// write the same slot concurrently.
#[derive(Debug, Clone)]
pub struct Accumulators {
    /// Per-particle forces, 3 scalars per particle.
    pub forces: Vec<f32>,
    /// Per-shift-vector force totals for virial bookkeeping.
    pub shift_forces: Vec<f32>,
    /// Coulomb energy per energy group.
    pub coulomb_energy: Vec<f32>,
    /// Van-der-Waals (dispersion + repulsion) energy per energy group.
    pub vdw_energy: Vec<f32>,
}

impl Accumulators {
    /// Zeroed accumulators for a system of the given extents.
    pub fn zeroed(n_particles: usize, n_shifts: usize, n_groups: usize) -> Self {
        Accumulators {
            forces: vec![0.0; 3 * n_particles],
            shift_forces: vec![0.0; 3 * n_shifts],
            coulomb_energy: vec![0.0; n_groups],
            vdw_energy: vec![0.0; n_groups],
        }
    }

    /// Reset every slot to zero, keeping the allocations.
    pub fn clear(&mut self) {
        self.forces.iter_mut().for_each(|v| *v = 0.0);
        self.shift_forces.iter_mut().for_each(|v| *v = 0.0);
        self.coulomb_energy.iter_mut().for_each(|v| *v = 0.0);
        self.vdw_energy.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Add another accumulator set into this one, slot by slot.
    ///
    /// # Panics
    ///
    /// Panics if the two sets were sized for different systems.
    pub fn absorb(&mut self, other: &Accumulators) {
        assert_eq!(self.forces.len(), other.forces.len(), "force buffer size mismatch");
        assert_eq!(
            self.shift_forces.len(),
            other.shift_forces.len(),
            "shift force buffer size mismatch"
        );
        assert_eq!(
            self.coulomb_energy.len(),
            other.coulomb_energy.len(),
            "energy group count mismatch"
        );
        for (dst, src) in self.forces.iter_mut().zip(&other.forces) {
            *dst += src;
        }
        for (dst, src) in self.shift_forces.iter_mut().zip(&other.shift_forces) {
            *dst += src;
        }
        for (dst, src) in self.coulomb_energy.iter_mut().zip(&other.coulomb_energy) {
            *dst += src;
        }
        for (dst, src) in self.vdw_energy.iter_mut().zip(&other.vdw_energy) {
            *dst += src;
        }
    }

    /// Net force over all particles, for conservation checks.
    pub fn net_force(&self) -> [f32; 3] {
        let mut net = [0.0f32; 3];
        for chunk in self.forces.chunks_exact(3) {
            net[0] += chunk[0];
            net[1] += chunk[1];
            net[2] += chunk[2];
        }
        net
    }

    /// Total energy of one term summed over all groups.
    ///
    /// Dispersion and repulsion share the van-der-Waals bucket, as is
    /// conventional for Lennard-Jones bookkeeping.
    pub fn total_energy(&self, term: Term) -> f32 {
        match term {
            Term::Coulomb => self.coulomb_energy.iter().sum(),
            Term::Dispersion | Term::Repulsion => self.vdw_energy.iter().sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_params_symmetry() {
        let mut params = PairParams::new(3);
        params.set(0, 2, 1.5, 2.5);

        let row0 = params.row_offset(0);
        let row2 = params.row_offset(2);
        assert_eq!(params.pair(row0, 2), (1.5, 2.5));
        assert_eq!(params.pair(row2, 0), (1.5, 2.5));
        assert_eq!(params.pair(row0, 1), (0.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "type index out of range")]
    fn test_pair_params_bad_type_panics() {
        let mut params = PairParams::new(2);
        params.set(0, 2, 1.0, 1.0);
    }

    #[test]
    fn test_accumulators_zeroed_and_clear() {
        let mut acc = Accumulators::zeroed(4, 2, 3);
        assert_eq!(acc.forces.len(), 12);
        assert_eq!(acc.shift_forces.len(), 6);
        assert_eq!(acc.coulomb_energy.len(), 3);

        acc.forces[0] = 1.0;
        acc.vdw_energy[2] = 3.0;
        acc.clear();
        assert_eq!(acc.forces[0], 0.0);
        assert_eq!(acc.vdw_energy[2], 0.0);
    }

    #[test]
    fn test_absorb_adds_slotwise() {
        let mut a = Accumulators::zeroed(2, 1, 1);
        let mut b = Accumulators::zeroed(2, 1, 1);
        a.forces[3] = 1.0;
        b.forces[3] = 2.0;
        b.coulomb_energy[0] = 0.5;
        a.absorb(&b);
        assert_eq!(a.forces[3], 3.0);
        assert_eq!(a.coulomb_energy[0], 0.5);
    }

    #[test]
    fn test_net_force_sums_components() {
        let mut acc = Accumulators::zeroed(2, 1, 1);
        acc.forces.copy_from_slice(&[1.0, 2.0, 3.0, -1.0, -2.0, -3.0]);
        assert_eq!(acc.net_force(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_total_energy_buckets() {
        let mut acc = Accumulators::zeroed(1, 1, 2);
        acc.coulomb_energy.copy_from_slice(&[1.0, 2.0]);
        acc.vdw_energy.copy_from_slice(&[0.25, 0.75]);
        assert_eq!(acc.total_energy(Term::Coulomb), 3.0);
        assert_eq!(acc.total_energy(Term::Dispersion), 1.0);
        assert_eq!(acc.total_energy(Term::Repulsion), 1.0);
    }
}
