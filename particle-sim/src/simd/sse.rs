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
//! SSE implementation for x86_64 CPUs
//!
//! Processes 4 × f32 lanes per instruction (128-bit vectors). SSE is part
//! of the x86_64 baseline, so this backend is available on every x86_64 CPU.

use std::arch::x86_64::*;

use super::{LaneBackend, LaneBatch};
use crate::integration::StepParams;

/// SSE backend, 4 lanes
#[derive(Debug, Clone, Copy, Default)]
pub struct SseBackend;

impl LaneBackend for SseBackend {
    fn name(&self) -> &str {
        "SSE"
    }

    fn width(&self) -> usize {
        4
    }

    fn is_supported(&self) -> bool {
        is_x86_feature_detected!("sse")
    }

    unsafe fn advance(&self, batch: &mut LaneBatch, step: &StepParams) {
        advance_sse(batch, step.dt, step.gravity_delta);
    }
}

#[target_feature(enable = "sse")]
unsafe fn advance_sse(batch: &mut LaneBatch, dt: f32, gravity_delta: f32) {
    let dt_vec = _mm_set1_ps(dt);
    let gravity_vec = _mm_set1_ps(gravity_delta);
    let zero = _mm_setzero_ps();

    let accel = _mm_sub_ps(_mm_loadu_ps(batch.acceleration.as_ptr()), gravity_vec);
    let speed = _mm_loadu_ps(batch.speed.as_ptr());
    let speed = _mm_max_ps(_mm_add_ps(speed, _mm_mul_ps(accel, dt_vec)), zero);

    let travel = _mm_mul_ps(speed, dt_vec);
    let pos_x = _mm_add_ps(
        _mm_loadu_ps(batch.position_x.as_ptr()),
        _mm_mul_ps(_mm_loadu_ps(batch.direction_x.as_ptr()), travel),
    );
    let pos_y = _mm_add_ps(
        _mm_loadu_ps(batch.position_y.as_ptr()),
        _mm_mul_ps(_mm_loadu_ps(batch.direction_y.as_ptr()), travel),
    );

    _mm_storeu_ps(batch.acceleration.as_mut_ptr(), accel);
    _mm_storeu_ps(batch.speed.as_mut_ptr(), speed);
    _mm_storeu_ps(batch.position_x.as_mut_ptr(), pos_x);
    _mm_storeu_ps(batch.position_y.as_mut_ptr(), pos_y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::PortableBackend;

    #[test]
    fn test_sse_always_on_x86_64() {
        assert!(SseBackend.is_supported());
    }

    #[test]
    fn test_sse_matches_portable() {
        let mut batch = LaneBatch::default();
        for lane in 0..4 {
            batch.acceleration[lane] = 2.0 - lane as f32 * 3.0;
            batch.speed[lane] = 4.0;
            batch.direction_x[lane] = 0.6;
            batch.direction_y[lane] = 0.8;
            batch.position_x[lane] = lane as f32;
        }
        // Lanes past the width must not be written.
        batch.speed[4] = 42.0;
        let mut reference = batch;
        let step = StepParams::new(0.25);

        unsafe {
            SseBackend.advance(&mut batch, &step);
            PortableBackend::new(4).advance(&mut reference, &step);
        }

        assert_eq!(batch, reference);
        assert_eq!(batch.speed[4], 42.0);
    }
}
