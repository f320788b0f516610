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
//! Integration tests for degenerate inputs and accumulation semantics

use nonbonded::driver::run_force_pass;
use nonbonded::kernel::NonbondedInput;
use nonbonded::pairlist::NeighborList;
use nonbonded::system::{Accumulators, PairParams};
use nonbonded::table::PotentialTable;

fn pair_system() -> (Vec<f32>, Vec<f32>, Vec<usize>, PairParams, Vec<f32>, PotentialTable) {
    (
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        vec![1.0, -1.0],
        vec![0, 0],
        PairParams::new(1),
        vec![0.0, 0.0, 0.0],
        PotentialTable::standard_coulomb_lj(100.0, 512),
    )
}

#[test]
fn test_empty_neighbor_list_is_a_no_op() {
    let (positions, charges, type_ids, params, shift_vectors, table) = pair_system();
    let list = NeighborList::new();
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
    let stats = run_force_pass(&input, &mut out, 1);
    assert_eq!(stats.outer_count, 0);
    assert_eq!(stats.inner_count, 0);
    assert!(out.forces.iter().all(|&f| f == 0.0));
    assert_eq!(out.coulomb_energy[0], 0.0);
}

#[test]
fn test_outer_entry_with_no_neighbors_contributes_nothing() {
    let (positions, charges, type_ids, params, shift_vectors, table) = pair_system();
    let mut list = NeighborList::new();
    list.push(0, 0, 0, &[]);
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
    let stats = run_force_pass(&input, &mut out, 1);
    assert_eq!(stats.outer_count, 1);
    assert_eq!(stats.inner_count, 0);
    assert!(out.forces.iter().all(|&f| f == 0.0));
}

#[test]
fn test_zero_charges_and_params_yield_zero_output() {
    let (positions, _, type_ids, params, shift_vectors, table) = pair_system();
    let charges = vec![0.0, 0.0];
    let mut list = NeighborList::new();
    list.push(0, 0, 0, &[1]);
    let input = NonbondedInput {
        list: &list,
        positions: &positions,
        charges: &charges,
        type_ids: &type_ids,
        params: &params,
        shift_vectors: &shift_vectors,
        coulomb_factor: 138.935,
        table: &table,
    };

    let mut out = Accumulators::zeroed(2, 1, 1);
    run_force_pass(&input, &mut out, 1);
    assert!(out.forces.iter().all(|&f| f == 0.0));
    assert_eq!(out.coulomb_energy[0], 0.0);
    assert_eq!(out.vdw_energy[0], 0.0);
}

#[test]
fn test_passes_accumulate_additively() {
    let (positions, charges, type_ids, params, shift_vectors, table) = pair_system();
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

    let mut once = Accumulators::zeroed(2, 1, 1);
    run_force_pass(&input, &mut once, 1);
    let mut twice = Accumulators::zeroed(2, 1, 1);
    run_force_pass(&input, &mut twice, 1);
    run_force_pass(&input, &mut twice, 1);

    // Outputs are additive, never overwritten.
    for (a, b) in once.forces.iter().zip(&twice.forces) {
        assert!((2.0 * a - b).abs() < 1e-6);
    }
    assert!((2.0 * once.coulomb_energy[0] - twice.coulomb_energy[0]).abs() < 1e-6);
    assert!((2.0 * once.shift_forces[0] - twice.shift_forces[0]).abs() < 1e-6);
}

#[test]
fn test_shared_shift_slot_accumulates_across_entries() {
    // Two outer entries booking against the same shift index: the shift
    // force slot receives both i-force reductions.
    let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 5.0, 0.0, 0.0, 6.0, 0.0, 0.0];
    let charges = vec![1.0, 1.0, 1.0, 1.0];
    let type_ids = vec![0, 0, 0, 0];
    let params = PairParams::new(1);
    let shift_vectors = vec![0.0, 0.0, 0.0];
    let table = PotentialTable::standard_coulomb_lj(100.0, 512);

    let mut list = NeighborList::new();
    list.push(0, 0, 0, &[1]);
    list.push(2, 0, 0, &[3]);

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
    let mut out = Accumulators::zeroed(4, 1, 1);
    run_force_pass(&input, &mut out, 1);

    let expected = out.forces[0] + out.forces[6];
    assert!((out.shift_forces[0] - expected).abs() < 1e-5);
}
