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
//! Run configuration

use std::time::Duration;

use crate::error::ConfigError;
use crate::frame::RunBudget;
use crate::init::SpawnRanges;
use crate::render::GridConfig;
use crate::simd::LaneWidth;
use crate::store::MAX_ENTITIES;

/// Entities simulated when no count is given
pub const DEFAULT_ENTITY_COUNT: usize = 200_000;

/// Run length when no duration is given
pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(10);

/// Everything needed to set up and run a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of entities
    pub entity_count: usize,
    /// Wall-clock budget for the frame loop
    pub run_duration: Duration,
    /// Requested integrator lane width
    pub lane_width: LaneWidth,
    /// World size
    pub grid: GridConfig,
    /// Initial value ranges
    pub spawn: SpawnRanges,
    /// Seed for the initial state; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Optional cap on frames
    pub frame_limit: Option<u64>,
    /// Render into memory instead of the terminal
    pub headless: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            entity_count: DEFAULT_ENTITY_COUNT,
            run_duration: DEFAULT_RUN_DURATION,
            lane_width: LaneWidth::Auto,
            grid: GridConfig::default(),
            spawn: SpawnRanges::default(),
            seed: None,
            frame_limit: None,
            headless: false,
        }
    }
}

impl SimulationConfig {
    /// Check every setting before anything is allocated
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_count == 0 || self.entity_count > MAX_ENTITIES {
            return Err(ConfigError::EntityCount {
                count: self.entity_count,
                max: MAX_ENTITIES,
            });
        }
        if self.run_duration.is_zero() {
            return Err(ConfigError::Duration(0.0));
        }
        self.grid.validate()?;
        self.spawn.validate()?;
        Ok(())
    }

    /// Frame loop limits
    pub fn budget(&self) -> RunBudget {
        RunBudget {
            duration: self.run_duration,
            frame_limit: self.frame_limit,
        }
    }
}

/// Convert a duration in seconds, rejecting zero, negative and non-finite values
pub fn duration_from_secs(secs: f32) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::Duration(secs));
    }
    Duration::try_from_secs_f32(secs).map_err(|_| ConfigError::Duration(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.entity_count, 200_000);
        assert_eq!(config.grid.console_width(), 166);
        assert_eq!(config.budget(), RunBudget::new(Duration::from_secs(10)));
    }

    #[test]
    fn test_entity_count_bounds() {
        let mut config = SimulationConfig {
            entity_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EntityCount { count: 0, .. })
        ));

        config.entity_count = MAX_ENTITIES + 1;
        assert!(config.validate().is_err());

        config.entity_count = MAX_ENTITIES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = SimulationConfig {
            run_duration: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Duration(0.0)));
    }

    #[test]
    fn test_grid_and_spawn_checked() {
        let config = SimulationConfig {
            grid: GridConfig::new(2, 40),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Grid { .. })));

        let mut spawn = SpawnRanges::default();
        spawn.mass = (0.0, 10.0);
        let config = SimulationConfig {
            spawn,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Range { .. })));
    }

    #[test]
    fn test_duration_from_secs() {
        assert_eq!(duration_from_secs(2.5), Ok(Duration::from_millis(2500)));
        assert!(duration_from_secs(0.0).is_err());
        assert!(duration_from_secs(-1.0).is_err());
        assert!(duration_from_secs(f32::NAN).is_err());
        assert!(duration_from_secs(f32::INFINITY).is_err());
    }

    #[test]
    fn test_frame_limit_in_budget() {
        let config = SimulationConfig {
            frame_limit: Some(5),
            ..Default::default()
        };
        assert_eq!(config.budget().frame_limit, Some(5));
    }
}
