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
//! CPU feature detection
//!
//! Detects the vector units available to the lane backends so the
//! integrator can pick a batch width at startup.

use std::fmt;
use std::sync::OnceLock;

/// Vector units usable by the lane backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuFeatures {
    /// 128-bit SSE, 4 × f32 lanes
    pub sse: bool,
    /// 256-bit AVX with OS support for YMM state, 8 × f32 lanes
    pub avx: bool,
    /// Fused multiply-add; reported only, the backends never fuse
    pub fma: bool,
    /// 128-bit NEON, 4 × f32 lanes
    pub neon: bool,
}

impl CpuFeatures {
    /// No vector units at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Widest lane count these features can drive
    pub fn widest_lanes(&self) -> usize {
        match (self.avx, self.sse || self.neon) {
            (true, _) => 8,
            (false, true) => 4,
            (false, false) => 1,
        }
    }
}

impl fmt::Display for CpuFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.sse, "sse"),
            (self.avx, "avx"),
            (self.fma, "fma"),
            (self.neon, "neon"),
        ];
        let mut first = true;
        for name in names.iter().filter(|(on, _)| *on).map(|(_, name)| name) {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

static DETECTED: OnceLock<CpuFeatures> = OnceLock::new();

/// Vector units of the running CPU
///
/// Read on first use and cached for the life of the process.
pub fn detect_cpu_features() -> CpuFeatures {
    *DETECTED.get_or_init(read_cpu)
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn read_cpu() -> CpuFeatures {
    let cpuid = raw_cpuid::CpuId::new();
    let Some(info) = cpuid.get_feature_info() else {
        return CpuFeatures::none();
    };
    CpuFeatures {
        sse: info.has_sse(),
        // YMM registers are only usable once the OS has enabled XSAVE
        avx: info.has_avx() && info.has_oxsave(),
        fma: info.has_fma(),
        neon: false,
    }
}

#[cfg(target_arch = "aarch64")]
fn read_cpu() -> CpuFeatures {
    CpuFeatures {
        neon: std::arch::is_aarch64_feature_detected!("neon"),
        ..CpuFeatures::none()
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn read_cpu() -> CpuFeatures {
    CpuFeatures::none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_on_this_cpu() {
        let features = detect_cpu_features();
        if cfg!(target_arch = "x86_64") {
            // SSE is part of the x86_64 baseline
            assert!(features.sse);
            assert!(features.widest_lanes() >= 4);
        }
        assert!(!(features.neon && features.sse));
    }

    #[test]
    fn test_detection_is_cached() {
        assert_eq!(detect_cpu_features(), detect_cpu_features());
    }

    #[test]
    fn test_widest_lanes() {
        assert_eq!(CpuFeatures::none().widest_lanes(), 1);
        let quad = CpuFeatures { neon: true, ..CpuFeatures::none() };
        assert_eq!(quad.widest_lanes(), 4);
        let wide = CpuFeatures { sse: true, avx: true, ..CpuFeatures::none() };
        assert_eq!(wide.widest_lanes(), 8);
    }

    #[test]
    fn test_display() {
        assert_eq!(CpuFeatures::none().to_string(), "none");
        let f = CpuFeatures { sse: true, avx: true, ..CpuFeatures::none() };
        assert_eq!(f.to_string(), "sse avx");
    }
}
