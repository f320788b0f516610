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
//! Vector math primitives for the pair-interaction kernels
//!
//! This module provides the fixed-width register type [`F32x4`] that the
//! inner loops are written against, plus the gather/scatter helpers that
//! move 3-component coordinates between array-of-structs memory layout and
//! the struct-of-arrays layout the arithmetic wants.
//!
//! # Architecture
//!
//! - **One width**: 4 × f32 lanes, matching a 128-bit vector register
//! - **Portable semantics**: every operation has a plain-Rust definition;
//!   on x86_64 the reciprocal square root estimate maps to `_mm_rsqrt_ps`
//!   (SSE is baseline on that target, so no runtime check is needed)
//! - **Stable Rust**: `std::arch` intrinsics only, no nightly features
//!
//! # Remainder handling
//!
//! Neighbor batches whose length is not a multiple of 4 are processed with
//! padded lanes. [`F32x4::mask_tail`] zeroes the padding lanes of a squared
//! distance before it reaches a denominator, and again after the reciprocal
//! square root, so a garbage lane can never pollute a reduction. The gather
//! helpers zero-fill padded lanes for the same reason.

mod dispatch;

pub use dispatch::{
    active_simd_description, detect_cpu_features, simd_level, CpuFeatures, SimdLevel,
};

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Number of f32 lanes per vector register.
pub const LANES: usize = 4;

/// A 4-lane f32 vector register.
///
/// All operations are pure and stateless. Arithmetic that the kernels rely
/// on for accuracy (`mul_add`, `neg_mul_add`) is fused per lane.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C, align(16))]
pub struct F32x4(pub [f32; 4]);

impl F32x4 {
    /// The all-zero register.
    pub const ZERO: F32x4 = F32x4([0.0; 4]);

    /// Build a register from four lane values.
    #[inline(always)]
    pub fn new(lanes: [f32; 4]) -> Self {
        F32x4(lanes)
    }

    /// Broadcast a scalar into all four lanes.
    #[inline(always)]
    pub fn splat(v: f32) -> Self {
        F32x4([v; 4])
    }

    /// Extract the lane values.
    #[inline(always)]
    pub fn to_array(self) -> [f32; 4] {
        self.0
    }

    /// Read a single lane.
    #[inline(always)]
    pub fn lane(self, i: usize) -> f32 {
        self.0[i]
    }

    /// Fused multiply-add: `self * b + c`, one rounding per lane.
    #[inline(always)]
    pub fn mul_add(self, b: F32x4, c: F32x4) -> F32x4 {
        F32x4([
            self.0[0].mul_add(b.0[0], c.0[0]),
            self.0[1].mul_add(b.0[1], c.0[1]),
            self.0[2].mul_add(b.0[2], c.0[2]),
            self.0[3].mul_add(b.0[3], c.0[3]),
        ])
    }

    /// Fused negate-multiply-add: `c - self * b`, one rounding per lane.
    ///
    /// This is the accumulation form used when subtracting force-table
    /// contributions from a running force factor.
    #[inline(always)]
    pub fn neg_mul_add(self, b: F32x4, c: F32x4) -> F32x4 {
        F32x4([
            (-self.0[0]).mul_add(b.0[0], c.0[0]),
            (-self.0[1]).mul_add(b.0[1], c.0[1]),
            (-self.0[2]).mul_add(b.0[2], c.0[2]),
            (-self.0[3]).mul_add(b.0[3], c.0[3]),
        ])
    }

    /// Per-lane reciprocal square root estimate.
    ///
    /// On x86_64 this is the hardware `rsqrtps` approximation (relative
    /// error below 1.5 × 2⁻¹²); elsewhere it is computed in full precision.
    /// Either way one Newton-Raphson step, as performed by [`F32x4::rsqrt`],
    /// is enough to reach full working f32 precision. Lanes holding zero
    /// produce infinity and lanes holding negative values produce NaN;
    /// callers mask such lanes out after refinement.
    #[inline(always)]
    pub fn rsqrt_est(self) -> F32x4 {
        #[cfg(target_arch = "x86_64")]
        {
            // SSE is part of the x86_64 baseline, so the intrinsic is
            // always executable on this target.
            unsafe {
                let v = _mm_loadu_ps(self.0.as_ptr());
                let est = _mm_rsqrt_ps(v);
                let mut out = [0.0f32; 4];
                _mm_storeu_ps(out.as_mut_ptr(), est);
                F32x4(out)
            }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            F32x4([
                1.0 / self.0[0].sqrt(),
                1.0 / self.0[1].sqrt(),
                1.0 / self.0[2].sqrt(),
                1.0 / self.0[3].sqrt(),
            ])
        }
    }

    /// Reciprocal square root refined to full working precision.
    ///
    /// One Newton-Raphson step over [`F32x4::rsqrt_est`]:
    /// `y' = y * (1.5 - 0.5 * x * y * y)`.
    #[inline(always)]
    pub fn rsqrt(self) -> F32x4 {
        let est = self.rsqrt_est();
        let half = F32x4::splat(0.5);
        let three_half = F32x4::splat(1.5);
        let corr = (half * self * est).neg_mul_add(est, three_half);
        est * corr
    }

    /// Sum all four lanes to a scalar.
    #[inline(always)]
    pub fn horizontal_sum(self) -> f32 {
        (self.0[0] + self.0[1]) + (self.0[2] + self.0[3])
    }

    /// Zero every lane at index `active` and above.
    ///
    /// Used to neutralize padding lanes in remainder batches before they
    /// can reach a denominator or a reduction.
    #[inline(always)]
    pub fn mask_tail(self, active: usize) -> F32x4 {
        debug_assert!(active <= LANES);
        let mut out = self.0;
        for lane in out.iter_mut().skip(active) {
            *lane = 0.0;
        }
        F32x4(out)
    }
}

impl std::ops::Add for F32x4 {
    type Output = F32x4;

    #[inline(always)]
    fn add(self, rhs: F32x4) -> F32x4 {
        F32x4([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
            self.0[3] + rhs.0[3],
        ])
    }
}

impl std::ops::Sub for F32x4 {
    type Output = F32x4;

    #[inline(always)]
    fn sub(self, rhs: F32x4) -> F32x4 {
        F32x4([
            self.0[0] - rhs.0[0],
            self.0[1] - rhs.0[1],
            self.0[2] - rhs.0[2],
            self.0[3] - rhs.0[3],
        ])
    }
}

impl std::ops::Mul for F32x4 {
    type Output = F32x4;

    #[inline(always)]
    fn mul(self, rhs: F32x4) -> F32x4 {
        F32x4([
            self.0[0] * rhs.0[0],
            self.0[1] * rhs.0[1],
            self.0[2] * rhs.0[2],
            self.0[3] * rhs.0[3],
        ])
    }
}

/// Gather up to four 3-component coordinates into per-axis vectors.
///
/// Lane `l < active` reads `src[3*idx[l] .. 3*idx[l]+3]`; padding lanes are
/// zero-filled. This is the array-of-structs to struct-of-arrays transpose
/// of the inner loop, expressed as an indexed gather because neighbor
/// indices are not contiguous.
///
/// Panics if an active index is out of bounds, which is a neighbor-list
/// precondition violation.
#[inline(always)]
pub fn gather_coords(src: &[f32], idx: &[usize; 4], active: usize) -> (F32x4, F32x4, F32x4) {
    debug_assert!(active >= 1 && active <= LANES);
    let mut x = [0.0f32; 4];
    let mut y = [0.0f32; 4];
    let mut z = [0.0f32; 4];
    for l in 0..active {
        let base = 3 * idx[l];
        x[l] = src[base];
        y[l] = src[base + 1];
        z[l] = src[base + 2];
    }
    (F32x4(x), F32x4(y), F32x4(z))
}

/// Scatter-add per-axis vectors back to 3-component coordinate memory.
///
/// The struct-of-arrays to array-of-structs transpose of the inner loop.
/// Only lanes below `active` are written; the writes are read-modify-write
/// adds, never overwrites.
#[inline(always)]
pub fn scatter_add_coords(
    dst: &mut [f32],
    idx: &[usize; 4],
    active: usize,
    x: F32x4,
    y: F32x4,
    z: F32x4,
) {
    debug_assert!(active >= 1 && active <= LANES);
    for l in 0..active {
        let base = 3 * idx[l];
        dst[base] += x.0[l];
        dst[base + 1] += y.0[l];
        dst[base + 2] += z.0[l];
    }
}

/// Gather up to four scalars by index, zero-filling padding lanes.
///
/// Zero-filling is load-bearing: padded lanes of a charge or pair
/// coefficient vector multiply whatever the padded table lanes return, and
/// must annihilate it.
#[inline(always)]
pub fn gather_scalars(src: &[f32], idx: &[usize; 4], active: usize) -> F32x4 {
    debug_assert!(active >= 1 && active <= LANES);
    let mut out = [0.0f32; 4];
    for l in 0..active {
        out[l] = src[idx[l]];
    }
    F32x4(out)
}
