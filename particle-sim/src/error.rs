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
//! Error types
//!
//! Configuration problems are caught before the first frame. Once the loop
//! is running the only recoverable failure is the display sink, and a
//! failed frame aborts the run rather than being skipped.

use thiserror::Error;

/// Invalid startup configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Entity count was zero or above [`crate::store::MAX_ENTITIES`]
    #[error("entity count {count} is outside 1..={max}")]
    EntityCount {
        /// Requested count
        count: usize,
        /// Largest supported count
        max: usize,
    },

    /// Column lengths handed to the store disagree
    #[error("column lengths differ: {positions} positions, {velocities} velocities, {physics} physics")]
    ColumnMismatch {
        /// Length of the position column
        positions: usize,
        /// Length of the velocity column
        velocities: usize,
        /// Length of the physics column
        physics: usize,
    },

    /// Run duration was zero, negative or not finite
    #[error("run duration must be positive and finite, got {0} s")]
    Duration(f32),

    /// A spawn range was empty or not finite
    #[error("invalid {name} range [{min}, {max})")]
    Range {
        /// Which range
        name: &'static str,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },

    /// Grid too small to hold a border and axes
    #[error("grid {width}x{height} is too small, each axis needs at least {min} cells")]
    Grid {
        /// World width in cells
        width: usize,
        /// World height in cells
        height: usize,
        /// Minimum per axis
        min: usize,
    },

    /// Lane width string could not be parsed
    #[error("unknown lane width '{0}', expected auto, scalar, 1, 4 or 8")]
    LaneWidth(String),
}

/// Display sink failure
#[derive(Debug, Error)]
pub enum RenderError {
    /// Terminal I/O failed
    #[error("display sink I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Sink used before `initialize` or after `shutdown`
    #[error("display sink unavailable: {0}")]
    Unavailable(&'static str),

    /// The user asked to quit; the frame was still presented
    #[error("display closed by the user")]
    Interrupted,
}

/// Top-level error for a simulation run
#[derive(Debug, Error)]
pub enum SimError {
    /// Startup configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The renderer or its sink failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Frame workers could not be started
    #[error("failed to start frame workers: {0}")]
    Workers(String),
}
