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
//! Neighbor-list data model
//!
//! The kernels consume a flattened neighbor list produced by an external
//! neighbor search: an ordered sequence of outer ("i") entries, each
//! carrying a periodic-shift index and an energy-group index, plus a flat
//! array of neighbor ("j") particle indices sliced by a monotone bounds
//! array. Neighbor order within a slice is whatever the search produced;
//! the kernels do not require it to be sorted.

/// Flattened neighbor list for one force-evaluation pass.
///
/// Built by appending outer entries with [`NeighborList::push`]; the slice
/// bounds array is monotone non-decreasing by construction.
#[derive(Debug, Default, Clone)]
pub struct NeighborList {
    i_particles: Vec<usize>,
    shifts: Vec<usize>,
    groups: Vec<usize>,
    bounds: Vec<usize>,
    neighbors: Vec<usize>,
}

impl NeighborList {
    /// Create an empty list.
    pub fn new() -> Self {
        NeighborList {
            i_particles: Vec::new(),
            shifts: Vec::new(),
            groups: Vec::new(),
            bounds: vec![0],
            neighbors: Vec::new(),
        }
    }

    /// Append one outer entry and its neighbor slice.
    ///
    /// `shift` selects the periodic image applied to the outer particle's
    /// position; `group` selects the energy bucket its contributions are
    /// summed into. Entries with empty neighbor slices are accepted but
    /// contribute nothing.
    pub fn push(&mut self, i_particle: usize, shift: usize, group: usize, js: &[usize]) {
        self.i_particles.push(i_particle);
        self.shifts.push(shift);
        self.groups.push(group);
        self.neighbors.extend_from_slice(js);
        self.bounds.push(self.neighbors.len());
    }

    /// Number of outer entries.
    pub fn n_outer(&self) -> usize {
        self.i_particles.len()
    }

    /// Total number of neighbor pairs across all outer entries.
    pub fn n_pairs(&self) -> usize {
        self.neighbors.len()
    }

    /// Outer particle index of entry `n`.
    #[inline(always)]
    pub fn i_particle(&self, n: usize) -> usize {
        self.i_particles[n]
    }

    /// Shift index of entry `n`.
    #[inline(always)]
    pub fn shift(&self, n: usize) -> usize {
        self.shifts[n]
    }

    /// Energy-group index of entry `n`.
    #[inline(always)]
    pub fn group(&self, n: usize) -> usize {
        self.groups[n]
    }

    /// Neighbor slice of entry `n`.
    #[inline(always)]
    pub fn neighbors(&self, n: usize) -> &[usize] {
        &self.neighbors[self.bounds[n]..self.bounds[n + 1]]
    }

    /// Largest particle index referenced anywhere in the list, if any.
    ///
    /// Used once per pass to validate the list against the coordinate
    /// arrays before the hot loop runs without per-access checks.
    pub fn max_particle_index(&self) -> Option<usize> {
        self.i_particles
            .iter()
            .chain(self.neighbors.iter())
            .copied()
            .max()
    }

    /// Largest shift index referenced, if any.
    pub fn max_shift_index(&self) -> Option<usize> {
        self.shifts.iter().copied().max()
    }

    /// Largest energy-group index referenced, if any.
    pub fn max_group_index(&self) -> Option<usize> {
        self.groups.iter().copied().max()
    }
}
