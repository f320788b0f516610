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
//! Tabulated potential lookup
//!
//! Interaction potentials are sampled on a grid that is equally spaced in
//! *scaled distance* (true distance × table scale factor) and stored as
//! cubic spline coefficients, four per interaction term per grid point:
//! value `Y`, derivative `F` (in table units), and the spline corrections
//! `G` and `H`. A batch lookup truncates each lane's scaled distance to a
//! grid index, fetches the four coefficients, and evaluates the cubic via
//! Horner's scheme with fused multiply-adds. The force output is the
//! analytic derivative of the same cubic, so tabulated energies and forces
//! stay consistent.
//!
//! Up to three terms (Coulomb, dispersion, repulsion) share one table; the
//! active subset is described by a [`TermSet`] so a single kernel body can
//! serve every term combination.

use crate::simd::F32x4;

/// One interaction term of the pair potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// Electrostatic term, weighted by the product of scaled charges.
    Coulomb = 0,
    /// Attractive dispersion term, weighted by the pair `c6` coefficient.
    Dispersion = 1,
    /// Short-range repulsion term, weighted by the pair `c12` coefficient.
    Repulsion = 2,
}

const ALL_TERMS: [Term; 3] = [Term::Coulomb, Term::Dispersion, Term::Repulsion];

/// Compact set of active interaction terms.
///
/// The set determines both the table layout (active terms are concatenated
/// in canonical Coulomb/dispersion/repulsion order at each grid point) and
/// which contributions the kernel accumulates. Inactive terms evaluate to
/// zero vectors, so the kernel body never branches per term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSet {
    bits: u8,
}

impl TermSet {
    /// The empty set.
    pub const fn empty() -> Self {
        TermSet { bits: 0 }
    }

    /// All three terms (tabulated Coulomb plus Lennard-Jones).
    pub const fn all() -> Self {
        TermSet { bits: 0b111 }
    }

    /// Build a set from a slice of terms.
    pub fn of(terms: &[Term]) -> Self {
        let mut set = TermSet::empty();
        for &t in terms {
            set.bits |= 1 << (t as u8);
        }
        set
    }

    /// Whether `term` is active.
    pub fn contains(self, term: Term) -> bool {
        self.bits & (1 << (term as u8)) != 0
    }

    /// Number of active terms.
    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Whether no term is active.
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Active terms in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Term> {
        ALL_TERMS.into_iter().filter(move |t| self.contains(*t))
    }

    /// Union of two sets.
    pub fn union(self, other: TermSet) -> TermSet {
        TermSet {
            bits: self.bits | other.bits,
        }
    }
}

/// Analytic definition of one tabulated term.
pub struct TermSpec<'a> {
    /// Which term this spec fills in.
    pub term: Term,
    /// Potential value as a function of true distance.
    pub value: &'a dyn Fn(f64) -> f64,
    /// Derivative of the potential with respect to true distance.
    pub derivative: &'a dyn Fn(f64) -> f64,
}

/// Result of a batch force-and-value lookup.
///
/// Indexed by `Term as usize`; inactive terms hold zero vectors.
#[derive(Debug, Clone, Copy)]
pub struct TableHit {
    /// Interpolated potential value per term.
    pub value: [F32x4; 3],
    /// Derivative of the cubic with respect to scaled distance, per term.
    pub force: [F32x4; 3],
}

/// Cubic-spline potential table shared by all kernel invocations.
///
/// Built once per simulation setup with enough range margin that the
/// configured cutoff never produces an out-of-range scaled distance; the
/// hot path does not re-check that contract beyond the index bounds check,
/// which aborts on violation.
pub struct PotentialTable {
    terms: TermSet,
    scale: f32,
    n_points: usize,
    stride: usize,
    data: Vec<f32>,
}

impl PotentialTable {
    /// Sample analytic potentials into a spline table.
    ///
    /// `scale` is the number of grid points per unit distance; grid point
    /// `n` sits at true distance `n / scale`. Derivatives are stored in
    /// table units (`V'(r) / scale`) so the kernel's conversion back to a
    /// per-unit-displacement force factor is a single multiply.
    ///
    /// Samples that are not finite (the `r = 0` singularity of every
    /// physical pair potential) are stored as zero. Those grid points are
    /// never reached by a valid neighbor list; storing zero instead of
    /// infinity keeps padded SIMD lanes, which always read grid point 0,
    /// from injecting NaN into lockstep arithmetic.
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not positive, fewer than two grid points are
    /// requested, `specs` is empty, or a term appears twice.
    pub fn tabulate(scale: f32, n_points: usize, specs: &[TermSpec<'_>]) -> PotentialTable {
        assert!(scale > 0.0 && scale.is_finite(), "table scale must be positive and finite");
        assert!(n_points >= 2, "a spline table needs at least two grid points");
        assert!(!specs.is_empty(), "at least one interaction term is required");

        let mut terms = TermSet::empty();
        for spec in specs {
            assert!(
                !terms.contains(spec.term),
                "duplicate table spec for {:?}",
                spec.term
            );
            terms = TermSet::of(&[spec.term]).union(terms);
        }

        let stride = 4 * terms.len();
        let mut data = vec![0.0f32; n_points * stride];
        let scale_f64 = f64::from(scale);

        for (slot, term) in terms.iter().enumerate() {
            // specs may arrive in any order; layout is canonical
            let spec = specs
                .iter()
                .find(|s| s.term == term)
                .expect("term present in set");

            let mut y = vec![0.0f64; n_points];
            let mut f = vec![0.0f64; n_points];
            for n in 0..n_points {
                let r = n as f64 / scale_f64;
                let yv = (spec.value)(r);
                let fv = (spec.derivative)(r) / scale_f64;
                y[n] = if yv.is_finite() { yv } else { 0.0 };
                f[n] = if fv.is_finite() { fv } else { 0.0 };
            }

            for n in 0..n_points {
                let (g, h) = if n + 1 < n_points {
                    let dy = y[n + 1] - y[n];
                    // Hermite end conditions: the cubic matches value and
                    // derivative at both ends of the interval.
                    (3.0 * dy - 2.0 * f[n] - f[n + 1], -2.0 * dy + f[n] + f[n + 1])
                } else {
                    (0.0, 0.0)
                };
                let base = n * stride + 4 * slot;
                data[base] = y[n] as f32;
                data[base + 1] = f[n] as f32;
                data[base + 2] = g as f32;
                data[base + 3] = h as f32;
            }
        }

        PotentialTable {
            terms,
            scale,
            n_points,
            stride,
            data,
        }
    }

    /// Standard tabulated-Coulomb plus Lennard-Jones table.
    ///
    /// Coulomb stores `1/r`, dispersion `-r⁻⁶`, repulsion `r⁻¹²`, matching
    /// the `c6`/`c12` weighting convention of [`crate::system::PairParams`].
    pub fn standard_coulomb_lj(scale: f32, n_points: usize) -> PotentialTable {
        PotentialTable::tabulate(
            scale,
            n_points,
            &[
                TermSpec {
                    term: Term::Coulomb,
                    value: &|r| 1.0 / r,
                    derivative: &|r| -1.0 / (r * r),
                },
                TermSpec {
                    term: Term::Dispersion,
                    value: &|r| -r.powi(-6),
                    derivative: &|r| 6.0 * r.powi(-7),
                },
                TermSpec {
                    term: Term::Repulsion,
                    value: &|r| r.powi(-12),
                    derivative: &|r| -12.0 * r.powi(-13),
                },
            ],
        )
    }

    /// Active interaction terms.
    pub fn terms(&self) -> TermSet {
        self.terms
    }

    /// Table scale factor (grid points per unit distance).
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Number of grid points.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    #[inline(always)]
    fn split_index(rt: F32x4) -> ([usize; 4], F32x4) {
        let rta = rt.to_array();
        let mut idx = [0usize; 4];
        let mut eps = [0.0f32; 4];
        for l in 0..4 {
            let n = rta[l] as usize;
            idx[l] = n;
            eps[l] = rta[l] - n as f32;
        }
        (idx, F32x4::new(eps))
    }

    #[inline(always)]
    fn fetch(&self, idx: &[usize; 4], slot: usize) -> (F32x4, F32x4, F32x4, F32x4) {
        let mut y = [0.0f32; 4];
        let mut f = [0.0f32; 4];
        let mut g = [0.0f32; 4];
        let mut h = [0.0f32; 4];
        for l in 0..4 {
            let base = idx[l] * self.stride + 4 * slot;
            y[l] = self.data[base];
            f[l] = self.data[base + 1];
            g[l] = self.data[base + 2];
            h[l] = self.data[base + 3];
        }
        (F32x4::new(y), F32x4::new(f), F32x4::new(g), F32x4::new(h))
    }

    /// Interpolate value and force for every active term at once.
    ///
    /// `rt` holds scaled distances, one per lane; padding lanes must be
    /// zero (they then read grid point 0, whose coefficients are finite,
    /// and are annihilated by the caller's zero-padded weights).
    ///
    /// For each term: `VV = Y + eps·(F + eps·G + eps²·H)` and
    /// `FF = F + 2·eps·G + 3·eps²·H`, the exact derivative of the cubic
    /// with respect to scaled distance.
    #[inline(always)]
    pub fn lookup(&self, rt: F32x4) -> TableHit {
        let (idx, eps) = Self::split_index(rt);
        let eps2 = eps * eps;
        let mut hit = TableHit {
            value: [F32x4::ZERO; 3],
            force: [F32x4::ZERO; 3],
        };
        for (slot, term) in self.terms.iter().enumerate() {
            let (y, f, g, h) = self.fetch(&idx, slot);
            let geps = g * eps;
            let heps2 = h * eps2;
            let fp = f + geps + heps2;
            hit.value[term as usize] = eps.mul_add(fp, y);
            hit.force[term as usize] = fp + geps + heps2 + heps2;
        }
        hit
    }

    /// Values-only fast path for energy-only passes.
    ///
    /// Skips the force-derivative arithmetic of [`PotentialTable::lookup`]
    /// entirely; this is a distinct path, not the full path with discarded
    /// outputs.
    #[inline(always)]
    pub fn lookup_values(&self, rt: F32x4) -> [F32x4; 3] {
        let (idx, eps) = Self::split_index(rt);
        let eps2 = eps * eps;
        let mut values = [F32x4::ZERO; 3];
        for (slot, term) in self.terms.iter().enumerate() {
            let (y, f, g, h) = self.fetch(&idx, slot);
            let fp = g.mul_add(eps, h.mul_add(eps2, f));
            values[term as usize] = eps.mul_add(fp, y);
        }
        values
    }
}
