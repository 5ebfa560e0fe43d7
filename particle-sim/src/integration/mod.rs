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
//! Motion integration
//!
//! Advances every entity by one frame of elapsed time. For each id the
//! update is a read-then-write chain:
//!
//! ```text
//! acceleration -= GRAVITY * dt
//! speed = max(speed + acceleration * dt, 0)
//! position += direction * (speed * dt)
//! ```
//!
//! There is no dependency between entities, so the integrator gathers
//! fixed-width lanes and hands them to a [`LaneBackend`](crate::simd::LaneBackend).
//! Entities past the last full lane go through the scalar path.
//!
//! # Timestep Guidelines
//!
//! The step is the measured frame delta, not a fixed timestep. Long stalls
//! (a debugger break, a slow terminal) produce one large step; speeds stay
//! clamped at zero but positions may jump.

mod motion;

pub use motion::{MotionIntegrator, MotionStep};

/// Downward pull applied to every entity's acceleration, in m/s²
pub const GRAVITY: f32 = 9.82;

/// Per-frame constants shared by every lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    /// Elapsed frame time in seconds
    pub dt: f32,
    /// `GRAVITY * dt`, precomputed once per frame
    pub gravity_delta: f32,
}

impl StepParams {
    /// Build the constants for a step of `dt` seconds
    pub fn new(dt: f32) -> Self {
        debug_assert!(dt >= 0.0 && dt.is_finite(), "Frame delta must be non-negative and finite");
        StepParams {
            dt,
            gravity_delta: GRAVITY * dt,
        }
    }

    /// Advance a single entity
    ///
    /// This is the reference recurrence; every lane backend must match it.
    #[inline(always)]
    pub fn advance_lane(
        &self,
        acceleration: &mut f32,
        speed: &mut f32,
        direction_x: f32,
        direction_y: f32,
        position_x: &mut f32,
        position_y: &mut f32,
    ) {
        *acceleration -= self.gravity_delta;
        *speed = (*speed + *acceleration * self.dt).max(0.0);
        let travel = *speed * self.dt;
        *position_x += direction_x * travel;
        *position_y += direction_y * travel;
    }
}
