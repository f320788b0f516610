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
//! Non-bonded pair-interaction kernel
//!
//! For one outer ("i") particle the kernel walks its neighbor slice in
//! 4-lane batches: gather neighbor coordinates by index, form per-axis
//! displacements against the shifted i position, derive inverse distance
//! via refined reciprocal square root, look up tabulated potential and
//! force terms, accumulate energies and the running i-force vector, and
//! scatter the negated force contribution onto each neighbor immediately.
//! After the loop the i-force is reduced horizontally and added once to
//! the particle force array and to the shift-force accumulator; energy
//! totals reduce into the outer entry's group bucket.
//!
//! A single batch routine parameterized by the active-lane count serves
//! both the full-width loop and the remainder (counts not divisible by 4):
//! padding lanes are zeroed in the squared distance before the reciprocal
//! square root and again in the inverse distance after it, and all
//! gathered weights are zero-padded, so lockstep garbage lanes can never
//! pollute a sum or trap.
//!
//! A neighbor at exactly zero distance is a neighbor-list precondition
//! violation (the list must already exclude self-pairs); the reciprocal
//! square root of zero is not guarded here.

use crate::pairlist::NeighborList;
use crate::simd::{self, F32x4, LANES};
use crate::system::{Accumulators, PairParams};
use crate::table::{PotentialTable, Term};

/// Borrowed view of everything one pass consumes.
///
/// All arrays are read-only for the duration of the pass. Validation
/// happens once, up front, so the hot loop carries no per-access checks
/// beyond slice bounds (which abort the process on violation, per the
/// no-recoverable-errors contract of this core).
pub struct NonbondedInput<'a> {
    /// Neighbor list to evaluate.
    pub list: &'a NeighborList,
    /// Particle positions, 3 scalars per particle.
    pub positions: &'a [f32],
    /// Per-particle charges.
    pub charges: &'a [f32],
    /// Per-particle type indices into `params`.
    pub type_ids: &'a [usize],
    /// Symmetric dispersion/repulsion coefficient matrix.
    pub params: &'a PairParams,
    /// Periodic shift vector table, 3 scalars per shift index.
    pub shift_vectors: &'a [f32],
    /// Coulomb prefactor applied to the outer particle's charge.
    pub coulomb_factor: f32,
    /// Shared spline table.
    pub table: &'a PotentialTable,
}

impl NonbondedInput<'_> {
    /// Number of particles described by the coordinate arrays.
    pub fn n_particles(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of shift vectors in the table.
    pub fn n_shifts(&self) -> usize {
        self.shift_vectors.len() / 3
    }

    /// Check array-length consistency and index ranges once per pass.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message on any inconsistency; there is no
    /// recoverable error path for malformed inputs.
    pub fn validate(&self) {
        assert!(
            self.positions.len() % 3 == 0,
            "position array length must be a multiple of 3"
        );
        let n = self.n_particles();
        assert_eq!(self.charges.len(), n, "charge array length mismatch");
        assert_eq!(self.type_ids.len(), n, "type array length mismatch");
        assert!(
            self.shift_vectors.len() % 3 == 0,
            "shift vector array length must be a multiple of 3"
        );
        if let Some(max) = self.list.max_particle_index() {
            assert!(max < n, "neighbor list references particle {} of {}", max, n);
        }
        if let Some(max) = self.list.max_shift_index() {
            assert!(
                max < self.n_shifts(),
                "neighbor list references shift {} of {}",
                max,
                self.n_shifts()
            );
        }
        for &t in self.type_ids {
            assert!(t < self.params.n_types(), "type index {} out of range", t);
        }
    }
}

/// Running per-outer-particle vector accumulators.
struct BatchAcc {
    vc: F32x4,
    vvdw: F32x4,
    fix: F32x4,
    fiy: F32x4,
    fiz: F32x4,
}

impl BatchAcc {
    fn new() -> Self {
        BatchAcc {
            vc: F32x4::ZERO,
            vvdw: F32x4::ZERO,
            fix: F32x4::ZERO,
            fiy: F32x4::ZERO,
            fiz: F32x4::ZERO,
        }
    }
}

/// Shared distance pipeline for a batch of up to four neighbors.
///
/// Returns padded index array, per-axis displacements, inverse distance
/// (padding lanes zeroed) and scaled distance.
#[inline(always)]
fn batch_geometry(
    js: &[usize],
    positions: &[f32],
    ix: F32x4,
    iy: F32x4,
    iz: F32x4,
) -> ([usize; 4], F32x4, F32x4, F32x4, F32x4, F32x4) {
    let active = js.len();
    let mut idx = [0usize; 4];
    idx[..active].copy_from_slice(js);

    let (jx, jy, jz) = simd::gather_coords(positions, &idx, active);
    let dx = ix - jx;
    let dy = iy - jy;
    let dz = iz - jz;

    // Padding lanes hold i-position garbage; zero them before the
    // reciprocal square root and again after, so no lane of the shared
    // reduction state ever sees the result of a bogus denominator.
    let rsq = dz.mul_add(dz, dy.mul_add(dy, dx * dx)).mask_tail(active);
    let rinv = rsq.rsqrt().mask_tail(active);

    (idx, dx, dy, dz, rsq, rinv)
}

/// Gather the per-lane interaction weights: scaled charge products and
/// dispersion/repulsion coefficients, zero-padded.
#[inline(always)]
fn batch_weights(
    idx: &[usize; 4],
    active: usize,
    input: &NonbondedInput<'_>,
    iq: F32x4,
    row: usize,
) -> (F32x4, F32x4, F32x4) {
    let qq = simd::gather_scalars(input.charges, idx, active) * iq;
    let mut c6 = [0.0f32; 4];
    let mut c12 = [0.0f32; 4];
    for l in 0..active {
        let (a, b) = input.params.pair(row, input.type_ids[idx[l]]);
        c6[l] = a;
        c12[l] = b;
    }
    (qq, F32x4::new(c6), F32x4::new(c12))
}

/// Evaluate one batch with force and energy accumulation.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
fn force_batch(
    js: &[usize],
    input: &NonbondedInput<'_>,
    ix: F32x4,
    iy: F32x4,
    iz: F32x4,
    iq: F32x4,
    row: usize,
    tsc: F32x4,
    acc: &mut BatchAcc,
    forces: &mut [f32],
) {
    let active = js.len();
    let (idx, dx, dy, dz, rsq, rinv) = batch_geometry(js, input.positions, ix, iy, iz);
    let r = rinv * rsq;
    let (qq, c6, c12) = batch_weights(&idx, active, input, iq, row);

    let hit = input.table.lookup(r * tsc);

    acc.vc = qq.mul_add(hit.value[Term::Coulomb as usize], acc.vc);
    let mut fs = qq.neg_mul_add(hit.force[Term::Coulomb as usize], F32x4::ZERO);
    acc.vvdw = c6.mul_add(hit.value[Term::Dispersion as usize], acc.vvdw);
    fs = c6.neg_mul_add(hit.force[Term::Dispersion as usize], fs);
    acc.vvdw = c12.mul_add(hit.value[Term::Repulsion as usize], acc.vvdw);
    fs = c12.neg_mul_add(hit.force[Term::Repulsion as usize], fs);

    // Table-domain force to per-unit-displacement force factor.
    fs = fs * tsc * rinv;

    acc.fix = fs.mul_add(dx, acc.fix);
    acc.fiy = fs.mul_add(dy, acc.fiy);
    acc.fiz = fs.mul_add(dz, acc.fiz);

    let fjx = fs.neg_mul_add(dx, F32x4::ZERO);
    let fjy = fs.neg_mul_add(dy, F32x4::ZERO);
    let fjz = fs.neg_mul_add(dz, F32x4::ZERO);
    simd::scatter_add_coords(forces, &idx, active, fjx, fjy, fjz);
}

/// Evaluate one batch with energy accumulation only.
#[inline(always)]
fn energy_batch(
    js: &[usize],
    input: &NonbondedInput<'_>,
    ix: F32x4,
    iy: F32x4,
    iz: F32x4,
    iq: F32x4,
    row: usize,
    tsc: F32x4,
    acc: &mut BatchAcc,
) {
    let active = js.len();
    let (idx, _dx, _dy, _dz, rsq, rinv) = batch_geometry(js, input.positions, ix, iy, iz);
    let r = rinv * rsq;
    let (qq, c6, c12) = batch_weights(&idx, active, input, iq, row);

    let values = input.table.lookup_values(r * tsc);

    acc.vc = qq.mul_add(values[Term::Coulomb as usize], acc.vc);
    acc.vvdw = c6.mul_add(values[Term::Dispersion as usize], acc.vvdw);
    acc.vvdw = c12.mul_add(values[Term::Repulsion as usize], acc.vvdw);
}

/// Per-outer-entry setup shared by both kernel variants.
#[inline(always)]
fn outer_setup(n: usize, input: &NonbondedInput<'_>) -> (F32x4, F32x4, F32x4, F32x4, usize) {
    let list = input.list;
    let ii = list.i_particle(n);
    let is3 = 3 * list.shift(n);
    let i3 = 3 * ii;
    let ix = F32x4::splat(input.positions[i3] + input.shift_vectors[is3]);
    let iy = F32x4::splat(input.positions[i3 + 1] + input.shift_vectors[is3 + 1]);
    let iz = F32x4::splat(input.positions[i3 + 2] + input.shift_vectors[is3 + 2]);
    let iq = F32x4::splat(input.charges[ii] * input.coulomb_factor);
    let row = input.params.row_offset(input.type_ids[ii]);
    (ix, iy, iz, iq, row)
}

/// Evaluate every neighbor interaction of outer entry `n`, with forces.
///
/// Returns the number of neighbor pairs processed.
pub(crate) fn eval_outer(n: usize, input: &NonbondedInput<'_>, out: &mut Accumulators) -> usize {
    let list = input.list;
    let js = list.neighbors(n);
    let (ix, iy, iz, iq, row) = outer_setup(n, input);
    let tsc = F32x4::splat(input.table.scale());

    let mut acc = BatchAcc::new();
    let mut k = 0;
    while k + LANES <= js.len() {
        force_batch(
            &js[k..k + LANES],
            input,
            ix,
            iy,
            iz,
            iq,
            row,
            tsc,
            &mut acc,
            &mut out.forces,
        );
        k += LANES;
    }
    if k < js.len() {
        force_batch(&js[k..], input, ix, iy, iz, iq, row, tsc, &mut acc, &mut out.forces);
    }

    // Reduce the running i-force once and add it to both the particle
    // force slot and the shift-force slot; multiple outer entries can
    // share either slot, so these are adds, never overwrites.
    let fxi = acc.fix.horizontal_sum();
    let fyi = acc.fiy.horizontal_sum();
    let fzi = acc.fiz.horizontal_sum();
    let i3 = 3 * list.i_particle(n);
    out.forces[i3] += fxi;
    out.forces[i3 + 1] += fyi;
    out.forces[i3 + 2] += fzi;
    let is3 = 3 * list.shift(n);
    out.shift_forces[is3] += fxi;
    out.shift_forces[is3 + 1] += fyi;
    out.shift_forces[is3 + 2] += fzi;

    let gid = list.group(n);
    out.coulomb_energy[gid] += acc.vc.horizontal_sum();
    out.vdw_energy[gid] += acc.vvdw.horizontal_sum();

    js.len()
}

/// Energy-only variant of [`eval_outer`]: identical structure, no force
/// factor, no force scatter, values-only table path.
pub(crate) fn eval_outer_energy(
    n: usize,
    input: &NonbondedInput<'_>,
    out: &mut Accumulators,
) -> usize {
    let list = input.list;
    let js = list.neighbors(n);
    let (ix, iy, iz, iq, row) = outer_setup(n, input);
    let tsc = F32x4::splat(input.table.scale());

    let mut acc = BatchAcc::new();
    let mut k = 0;
    while k + LANES <= js.len() {
        energy_batch(&js[k..k + LANES], input, ix, iy, iz, iq, row, tsc, &mut acc);
        k += LANES;
    }
    if k < js.len() {
        energy_batch(&js[k..], input, ix, iy, iz, iq, row, tsc, &mut acc);
    }

    let gid = list.group(n);
    out.coulomb_energy[gid] += acc.vc.horizontal_sum();
    out.vdw_energy[gid] += acc.vvdw.horizontal_sum();

    js.len()
}
