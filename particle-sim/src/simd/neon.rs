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
//! NEON implementation for aarch64 CPUs
//!
//! Processes 4 × f32 lanes per instruction (128-bit vectors). Uses separate
//! multiply and add rather than `vmlaq`/`vfmaq` so results match the
//! portable backend.

use std::arch::aarch64::*;

use super::{LaneBackend, LaneBatch};
use crate::integration::StepParams;

/// NEON backend, 4 lanes
#[derive(Debug, Clone, Copy, Default)]
pub struct NeonBackend;

impl LaneBackend for NeonBackend {
    fn name(&self) -> &str {
        "NEON"
    }

    fn width(&self) -> usize {
        4
    }

    fn is_supported(&self) -> bool {
        std::arch::is_aarch64_feature_detected!("neon")
    }

    unsafe fn advance(&self, batch: &mut LaneBatch, step: &StepParams) {
        advance_neon(batch, step.dt, step.gravity_delta);
    }
}

#[target_feature(enable = "neon")]
unsafe fn advance_neon(batch: &mut LaneBatch, dt: f32, gravity_delta: f32) {
    let dt_vec = vdupq_n_f32(dt);
    let gravity_vec = vdupq_n_f32(gravity_delta);
    let zero = vdupq_n_f32(0.0);

    let accel = vsubq_f32(vld1q_f32(batch.acceleration.as_ptr()), gravity_vec);
    let speed = vld1q_f32(batch.speed.as_ptr());
    let speed = vmaxq_f32(vaddq_f32(speed, vmulq_f32(accel, dt_vec)), zero);

    let travel = vmulq_f32(speed, dt_vec);
    let pos_x = vaddq_f32(
        vld1q_f32(batch.position_x.as_ptr()),
        vmulq_f32(vld1q_f32(batch.direction_x.as_ptr()), travel),
    );
    let pos_y = vaddq_f32(
        vld1q_f32(batch.position_y.as_ptr()),
        vmulq_f32(vld1q_f32(batch.direction_y.as_ptr()), travel),
    );

    vst1q_f32(batch.acceleration.as_mut_ptr(), accel);
    vst1q_f32(batch.speed.as_mut_ptr(), speed);
    vst1q_f32(batch.position_x.as_mut_ptr(), pos_x);
    vst1q_f32(batch.position_y.as_mut_ptr(), pos_y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::PortableBackend;

    #[test]
    fn test_neon_matches_portable() {
        let backend = NeonBackend;
        if !backend.is_supported() {
            eprintln!("Skipping NEON test - not supported on this CPU");
            return;
        }

        let mut batch = LaneBatch::default();
        for lane in 0..4 {
            batch.acceleration[lane] = lane as f32 - 1.5;
            batch.speed[lane] = 3.0;
            batch.direction_x[lane] = 1.0;
        }
        let mut reference = batch;
        let step = StepParams::new(0.1);

        unsafe {
            backend.advance(&mut batch, &step);
            PortableBackend::new(4).advance(&mut reference, &step);
        }

        for lane in 0..4 {
            assert!((batch.speed[lane] - reference.speed[lane]).abs() < 1e-6);
            assert!((batch.position_x[lane] - reference.position_x[lane]).abs() < 1e-6);
        }
    }
}
