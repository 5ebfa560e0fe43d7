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
//! Portable lane backend
//!
//! This module provides a plain-arithmetic backend that serves as:
//! - Scalar fallback (width 1) for CPUs without a vector unit
//! - Reference implementation for testing the hardware backends
//! - Fixed-width stand-in when a requested width has no hardware backend

use super::{LaneBackend, LaneBatch, MAX_LANE_WIDTH};
use crate::integration::StepParams;

/// Backend that walks its lanes one at a time
///
/// Always available on all platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortableBackend {
    width: usize,
}

impl PortableBackend {
    /// Create a portable backend with `width` lanes
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or above [`MAX_LANE_WIDTH`].
    pub fn new(width: usize) -> Self {
        assert!(
            (1..=MAX_LANE_WIDTH).contains(&width),
            "Lane width must be in 1..={}",
            MAX_LANE_WIDTH
        );
        PortableBackend { width }
    }

    /// Single-lane scalar backend
    pub fn scalar() -> Self {
        Self::new(1)
    }
}

impl LaneBackend for PortableBackend {
    fn name(&self) -> &str {
        match self.width {
            1 => "Scalar",
            _ => "Portable",
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn is_supported(&self) -> bool {
        true
    }

    unsafe fn advance(&self, batch: &mut LaneBatch, step: &StepParams) {
        for lane in 0..self.width {
            step.advance_lane(
                &mut batch.acceleration[lane],
                &mut batch.speed[lane],
                batch.direction_x[lane],
                batch.direction_y[lane],
                &mut batch.position_x[lane],
                &mut batch.position_y[lane],
            );
        }
    }
}
