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
//! CPU feature detection for kernel capability reporting
//!
//! Production force-evaluation codes probe the CPU once at startup and
//! report which vector instruction family their kernels can exploit. This
//! module provides that probe, cached globally so repeated queries are free.

use std::sync::OnceLock;

/// CPU feature flags detected at runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuFeatures {
    /// CPU supports SSE2
    pub has_sse2: bool,
    /// CPU supports SSE4.1
    pub has_sse4_1: bool,
    /// CPU supports AVX (Advanced Vector Extensions)
    pub has_avx: bool,
    /// CPU supports AVX2
    pub has_avx2: bool,
    /// CPU supports FMA (Fused Multiply-Add)
    pub has_fma: bool,
    /// CPU supports AVX-512 Foundation
    pub has_avx512f: bool,
    /// CPU supports AVX-512 Double/Quad Word instructions
    pub has_avx512dq: bool,
}

/// Vector instruction family available to the kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdLevel {
    /// No vector hardware; lane arithmetic compiles to scalar code
    Scalar,
    /// 128-bit SSE vectors (x86_64 baseline)
    Sse,
    /// 256-bit AVX2 with fused multiply-add
    Avx2Fma,
    /// 512-bit AVX-512 foundation + DQ
    Avx512,
}

impl SimdLevel {
    /// Human-readable name for startup reporting
    pub fn name(self) -> &'static str {
        match self {
            SimdLevel::Scalar => "scalar",
            SimdLevel::Sse => "SSE",
            SimdLevel::Avx2Fma => "AVX2+FMA",
            SimdLevel::Avx512 => "AVX-512",
        }
    }
}

/// Global cache of detected CPU features
static CPU_FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// Detect CPU features at runtime
///
/// Uses CPUID on x86_64; other architectures report no vector features.
/// Results are cached globally to avoid repeated detection overhead.
pub fn detect_cpu_features() -> CpuFeatures {
    *CPU_FEATURES.get_or_init(detect_cpu_features_impl)
}

#[cfg(target_arch = "x86_64")]
fn detect_cpu_features_impl() -> CpuFeatures {
    use raw_cpuid::CpuId;

    let cpuid = CpuId::new();
    let mut features = CpuFeatures::default();

    if let Some(feature_info) = cpuid.get_feature_info() {
        features.has_sse2 = feature_info.has_sse2();
        features.has_sse4_1 = feature_info.has_sse41();
        features.has_avx = feature_info.has_avx();
        features.has_fma = feature_info.has_fma();
    }

    if let Some(extended_features) = cpuid.get_extended_feature_info() {
        features.has_avx2 = extended_features.has_avx2();
        features.has_avx512f = extended_features.has_avx512f();
        features.has_avx512dq = extended_features.has_avx512dq();
    }

    features
}

#[cfg(not(target_arch = "x86_64"))]
fn detect_cpu_features_impl() -> CpuFeatures {
    CpuFeatures::default()
}

/// Best vector instruction family on the current CPU
///
/// Selection priority: AVX-512 > AVX2+FMA > SSE > scalar.
pub fn simd_level() -> SimdLevel {
    let features = detect_cpu_features();
    if features.has_avx512f && features.has_avx512dq {
        SimdLevel::Avx512
    } else if features.has_avx2 && features.has_fma {
        SimdLevel::Avx2Fma
    } else if features.has_sse2 {
        SimdLevel::Sse
    } else {
        SimdLevel::Scalar
    }
}

/// One-line description of the vector capability, for startup banners.
pub fn active_simd_description() -> &'static str {
    simd_level().name()
}
