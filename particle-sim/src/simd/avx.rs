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
//! AVX implementation for x86_64 CPUs
//!
//! Processes 8 × f32 lanes per instruction (256-bit vectors).
//!
//! # Requirements
//!
//! - x86_64 CPU with AVX support, detected at runtime
//! - OS support for saving the upper YMM state (checked by
//!   `is_x86_feature_detected!`)

use std::arch::x86_64::*;

use super::{LaneBackend, LaneBatch};
use crate::integration::StepParams;

/// AVX backend, 8 lanes
#[derive(Debug, Clone, Copy, Default)]
pub struct AvxBackend;

impl LaneBackend for AvxBackend {
    fn name(&self) -> &str {
        "AVX"
    }

    fn width(&self) -> usize {
        8
    }

    fn is_supported(&self) -> bool {
        is_x86_feature_detected!("avx")
    }

    unsafe fn advance(&self, batch: &mut LaneBatch, step: &StepParams) {
        advance_avx(batch, step.dt, step.gravity_delta);
    }
}

#[target_feature(enable = "avx")]
unsafe fn advance_avx(batch: &mut LaneBatch, dt: f32, gravity_delta: f32) {
    let dt_vec = _mm256_set1_ps(dt);
    let gravity_vec = _mm256_set1_ps(gravity_delta);
    let zero = _mm256_setzero_ps();

    let accel = _mm256_loadu_ps(batch.acceleration.as_ptr());
    let speed = _mm256_loadu_ps(batch.speed.as_ptr());
    let dir_x = _mm256_loadu_ps(batch.direction_x.as_ptr());
    let dir_y = _mm256_loadu_ps(batch.direction_y.as_ptr());
    let pos_x = _mm256_loadu_ps(batch.position_x.as_ptr());
    let pos_y = _mm256_loadu_ps(batch.position_y.as_ptr());

    // a' = a - g * dt
    let accel = _mm256_sub_ps(accel, gravity_vec);

    // s' = max(s + a' * dt, 0)
    let speed = _mm256_max_ps(_mm256_add_ps(speed, _mm256_mul_ps(accel, dt_vec)), zero);

    // p' = p + d * (s' * dt)
    let travel = _mm256_mul_ps(speed, dt_vec);
    let pos_x = _mm256_add_ps(pos_x, _mm256_mul_ps(dir_x, travel));
    let pos_y = _mm256_add_ps(pos_y, _mm256_mul_ps(dir_y, travel));

    _mm256_storeu_ps(batch.acceleration.as_mut_ptr(), accel);
    _mm256_storeu_ps(batch.speed.as_mut_ptr(), speed);
    _mm256_storeu_ps(batch.position_x.as_mut_ptr(), pos_x);
    _mm256_storeu_ps(batch.position_y.as_mut_ptr(), pos_y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::PortableBackend;

    #[test]
    fn test_avx_detection() {
        let _supported = AvxBackend.is_supported();
    }

    #[test]
    fn test_avx_matches_portable() {
        let backend = AvxBackend;
        if !backend.is_supported() {
            eprintln!("Skipping AVX test - not supported on this CPU");
            return;
        }

        let mut batch = LaneBatch::default();
        for lane in 0..8 {
            batch.acceleration[lane] = lane as f32 - 4.0;
            batch.speed[lane] = lane as f32 * 0.25;
            batch.direction_x[lane] = if lane % 2 == 0 { 1.0 } else { 0.0 };
            batch.direction_y[lane] = if lane % 2 == 0 { 0.0 } else { -1.0 };
        }
        let mut reference = batch;
        let step = StepParams::new(0.5);

        unsafe {
            backend.advance(&mut batch, &step);
            PortableBackend::new(8).advance(&mut reference, &step);
        }

        assert_eq!(batch, reference);
        assert!(batch.speed.iter().all(|&s| s >= 0.0));
    }
}
