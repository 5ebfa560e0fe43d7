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
//! Lane-batched motion backends
//!
//! The integrator gathers a lane's worth of entity fields into a
//! [`LaneBatch`], hands it to a [`LaneBackend`], and scatters the results
//! back into the store. Backends differ only in how many lanes they process
//! per instruction.
//!
//! # Backends
//!
//! - **AVX**: 8 × f32 lanes (x86_64)
//! - **SSE**: 4 × f32 lanes (x86_64)
//! - **NEON**: 4 × f32 lanes (aarch64)
//! - **Portable**: 1, 4 or 8 lanes of plain arithmetic, always available
//!
//! # Determinism
//!
//! Every backend evaluates the recurrence with the same operation order and
//! without fused multiply-add, so lane width never changes the results
//! beyond ordinary rounding. The width is a throughput knob only.
//!
//! # Safety
//!
//! Hardware backends use `target_feature` functions. [`select_backend`] only
//! returns a backend whose `is_supported()` holds on the running CPU.

mod dispatch;
mod portable;

#[cfg(target_arch = "x86_64")]
mod avx;

#[cfg(target_arch = "x86_64")]
mod sse;

#[cfg(target_arch = "aarch64")]
mod neon;

pub use dispatch::{detect_cpu_features, CpuFeatures};
pub use portable::PortableBackend;

#[cfg(target_arch = "x86_64")]
pub use avx::AvxBackend;

#[cfg(target_arch = "x86_64")]
pub use sse::SseBackend;

#[cfg(target_arch = "aarch64")]
pub use neon::NeonBackend;

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::integration::StepParams;

/// Widest batch any backend processes
pub const MAX_LANE_WIDTH: usize = 8;

/// Lane width of the AVX backend
pub const AVX_WIDTH: usize = 8;

/// Lane width of the SSE and NEON backends
pub const QUAD_WIDTH: usize = 4;

/// One lane's worth of gathered entity fields
///
/// Only the first `width()` slots of each array are meaningful to a given
/// backend. Alignment lets the 8-lane backend load each field as one
/// 256-bit vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C, align(32))]
pub struct LaneBatch {
    /// `Physics::acceleration`
    pub acceleration: [f32; MAX_LANE_WIDTH],
    /// `Velocity::speed`
    pub speed: [f32; MAX_LANE_WIDTH],
    /// `Velocity::direction.x`
    pub direction_x: [f32; MAX_LANE_WIDTH],
    /// `Velocity::direction.y`
    pub direction_y: [f32; MAX_LANE_WIDTH],
    /// `Position::pos.x`
    pub position_x: [f32; MAX_LANE_WIDTH],
    /// `Position::pos.y`
    pub position_y: [f32; MAX_LANE_WIDTH],
}

/// Backend that advances a batch of entities by one step
pub trait LaneBackend: Send + Sync {
    /// Name of this backend
    fn name(&self) -> &str;

    /// Number of lanes processed per call
    fn width(&self) -> usize;

    /// Check if this backend can run on the current CPU
    fn is_supported(&self) -> bool;

    /// Advance lanes `0..width()` of `batch`
    ///
    /// For each lane:
    ///
    /// ```text
    /// acceleration -= gravity * dt
    /// speed = max(speed + acceleration * dt, 0)
    /// position += direction * (speed * dt)
    /// ```
    ///
    /// # Safety
    ///
    /// Caller must ensure `is_supported()` returned true.
    unsafe fn advance(&self, batch: &mut LaneBatch, step: &StepParams);
}

/// Requested lane width strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaneWidth {
    /// Widest width the CPU supports
    #[default]
    Auto,
    /// One entity at a time
    Scalar,
    /// Four lanes
    Four,
    /// Eight lanes
    Eight,
}

impl LaneWidth {
    /// Fixed lane count, or `None` for `Auto`
    pub fn lanes(self) -> Option<usize> {
        match self {
            LaneWidth::Auto => None,
            LaneWidth::Scalar => Some(1),
            LaneWidth::Four => Some(QUAD_WIDTH),
            LaneWidth::Eight => Some(AVX_WIDTH),
        }
    }
}

impl FromStr for LaneWidth {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(LaneWidth::Auto),
            "1" | "scalar" => Ok(LaneWidth::Scalar),
            "4" => Ok(LaneWidth::Four),
            "8" => Ok(LaneWidth::Eight),
            other => Err(ConfigError::LaneWidth(other.to_string())),
        }
    }
}

impl fmt::Display for LaneWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneWidth::Auto => write!(f, "auto"),
            LaneWidth::Scalar => write!(f, "1"),
            LaneWidth::Four => write!(f, "4"),
            LaneWidth::Eight => write!(f, "8"),
        }
    }
}

/// Select a backend for the requested lane width
///
/// `Auto` prefers AVX > SSE/NEON > scalar. A fixed width uses the hardware
/// backend of that width when the CPU supports it and otherwise falls back
/// to a portable backend of the same width, so the batch size is honoured
/// either way.
pub fn select_backend(requested: LaneWidth) -> Box<dyn LaneBackend> {
    let features = detect_cpu_features();
    log::debug!("detected cpu features: {}", features);

    let lanes = requested.lanes().unwrap_or_else(|| features.widest_lanes());

    if let Some(backend) = hardware_backend(lanes) {
        return backend;
    }

    if requested != LaneWidth::Auto && lanes > 1 {
        log::warn!(
            "no {}-lane vector unit available, using portable lanes",
            lanes
        );
    }
    Box::new(PortableBackend::new(lanes))
}

#[cfg(target_arch = "x86_64")]
fn hardware_backend(lanes: usize) -> Option<Box<dyn LaneBackend>> {
    match lanes {
        AVX_WIDTH if AvxBackend.is_supported() => Some(Box::new(AvxBackend)),
        QUAD_WIDTH if SseBackend.is_supported() => Some(Box::new(SseBackend)),
        _ => None,
    }
}

#[cfg(target_arch = "aarch64")]
fn hardware_backend(lanes: usize) -> Option<Box<dyn LaneBackend>> {
    match lanes {
        QUAD_WIDTH if NeonBackend.is_supported() => Some(Box::new(NeonBackend)),
        _ => None,
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn hardware_backend(_lanes: usize) -> Option<Box<dyn LaneBackend>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> LaneBatch {
        let mut batch = LaneBatch::default();
        for lane in 0..MAX_LANE_WIDTH {
            let f = lane as f32;
            batch.acceleration[lane] = f - 3.5;
            batch.speed[lane] = 0.5 + f;
            batch.direction_x[lane] = (f * 0.7).cos();
            batch.direction_y[lane] = (f * 0.7).sin();
            batch.position_x[lane] = -2.0 + f;
            batch.position_y[lane] = 1.5 * f;
        }
        batch
    }

    #[test]
    fn test_backend_selection() {
        let backend = select_backend(LaneWidth::Auto);
        assert!(backend.width() >= 1);
        assert!(backend.is_supported());
    }

    #[test]
    fn test_fixed_width_is_honoured() {
        for (requested, lanes) in [
            (LaneWidth::Scalar, 1),
            (LaneWidth::Four, 4),
            (LaneWidth::Eight, 8),
        ] {
            let backend = select_backend(requested);
            assert_eq!(backend.width(), lanes, "backend {}", backend.name());
            assert!(backend.is_supported());
        }
    }

    #[test]
    fn test_auto_selection_priority() {
        let backend = select_backend(LaneWidth::Auto);

        #[cfg(target_arch = "x86_64")]
        {
            if AvxBackend.is_supported() {
                assert_eq!(backend.name(), "AVX");
                assert_eq!(backend.width(), 8);
            } else {
                assert_eq!(backend.name(), "SSE");
                assert_eq!(backend.width(), 4);
            }
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            assert!(backend.width() == 4 || backend.width() == 1);
        }
    }

    #[test]
    fn test_lane_width_parse() {
        assert_eq!("auto".parse::<LaneWidth>(), Ok(LaneWidth::Auto));
        assert_eq!("Scalar".parse::<LaneWidth>(), Ok(LaneWidth::Scalar));
        assert_eq!("1".parse::<LaneWidth>(), Ok(LaneWidth::Scalar));
        assert_eq!(" 8 ".parse::<LaneWidth>(), Ok(LaneWidth::Eight));
        assert_eq!(
            "16".parse::<LaneWidth>(),
            Err(ConfigError::LaneWidth("16".to_string()))
        );
        assert_eq!(LaneWidth::Four.to_string(), "4");
    }

    #[test]
    fn test_backends_agree_with_scalar() {
        let step = StepParams::new(0.016);
        let scalar = PortableBackend::new(1);

        let mut expected = sample_batch();
        for lane in 0..MAX_LANE_WIDTH {
            let mut single = LaneBatch::default();
            single.acceleration[0] = expected.acceleration[lane];
            single.speed[0] = expected.speed[lane];
            single.direction_x[0] = expected.direction_x[lane];
            single.direction_y[0] = expected.direction_y[lane];
            single.position_x[0] = expected.position_x[lane];
            single.position_y[0] = expected.position_y[lane];
            unsafe { scalar.advance(&mut single, &step) };
            expected.acceleration[lane] = single.acceleration[0];
            expected.speed[lane] = single.speed[0];
            expected.position_x[lane] = single.position_x[0];
            expected.position_y[lane] = single.position_y[0];
        }

        for requested in [LaneWidth::Four, LaneWidth::Eight, LaneWidth::Auto] {
            let backend = select_backend(requested);
            let mut batch = sample_batch();
            unsafe { backend.advance(&mut batch, &step) };
            for lane in 0..backend.width() {
                assert!((batch.acceleration[lane] - expected.acceleration[lane]).abs() < 1e-6);
                assert!((batch.speed[lane] - expected.speed[lane]).abs() < 1e-6);
                assert!((batch.position_x[lane] - expected.position_x[lane]).abs() < 1e-6);
                assert!((batch.position_y[lane] - expected.position_y[lane]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_batch_alignment() {
        assert_eq!(std::mem::align_of::<LaneBatch>(), 32);
    }
}
