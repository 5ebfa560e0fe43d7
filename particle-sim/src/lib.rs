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
//! # Particle Sim
//!
//! A data-oriented particle simulator that integrates hundreds of thousands
//! of entities per frame and draws them as ASCII glyphs.
//!
//! ## Features
//!
//! - **Structure-of-arrays store**: positions, velocities and physics live
//!   in separate columns indexed by entity id
//! - **Lane-batched integration**: 1, 4 or 8 entities per step with SSE,
//!   AVX or NEON backends and a scalar remainder path
//! - **Double-buffered renderer**: a pre-rendered clear template, cached
//!   glyphs and border re-stamping instead of per-entity clipping
//! - **Fork/join frames**: integration and rendering run side by side on a
//!   snapshot of the previous positions
//!
//! ## Example
//!
//! ```rust
//! use particle_sim::init::{Randomizer, SpawnRanges};
//! use particle_sim::integration::MotionIntegrator;
//! use particle_sim::simd::LaneWidth;
//! use particle_sim::store::EntityStore;
//!
//! let mut store = EntityStore::new(1_000).unwrap();
//! Randomizer::new(SpawnRanges::default(), Some(42))
//!     .unwrap()
//!     .populate(&mut store);
//!
//! let integrator = MotionIntegrator::new(LaneWidth::Auto);
//! let (positions, velocities, physics) = store.columns_mut();
//! integrator.integrate(positions, velocities, physics, 1.0 / 60.0);
//!
//! assert!(store.velocities().iter().all(|v| v.speed >= 0.0));
//! ```

#![warn(missing_docs)]

/// Run configuration
pub mod config;

/// Error types
pub mod error;

/// Frame loop, clocks and statistics
pub mod frame;

/// Random initial state
pub mod init;

/// Motion integration
pub mod integration;

/// ASCII rendering and display sinks
pub mod render;

/// Lane backends and CPU feature detection
pub mod simd;

/// Entity columns
pub mod store;

pub use config::SimulationConfig;
pub use error::{ConfigError, RenderError, SimError};
pub use frame::{FrameOrchestrator, RunBudget, RunStats};
pub use store::EntityStore;
