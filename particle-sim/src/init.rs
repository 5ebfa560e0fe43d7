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
//! Randomised initial state
//!
//! Fills the store once before the first frame. Each column is filled by
//! its own task with its own generator, all derived from one master seed,
//! so a seeded run is reproducible whether or not the fills run in parallel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;
use crate::store::{EntityStore, Physics, Position, Vec2, Velocity};

/// Random direction samples shorter than this are discarded and redrawn
pub const MIN_DIRECTION_MAGNITUDE: f32 = 1e-6;

/// Sampling bounds for the initial entity state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRanges {
    /// Positions are drawn from `[-extent, extent)` on both axes
    pub position_extent: f32,
    /// Speed range `[min, max)`
    pub speed: (f32, f32),
    /// Mass range `[min, max)`, must stay above zero
    pub mass: (f32, f32),
    /// Acceleration range `[min, max)`
    pub acceleration: (f32, f32),
}

impl Default for SpawnRanges {
    fn default() -> Self {
        SpawnRanges {
            position_extent: 20.0,
            speed: (0.0, 20.0),
            mass: (1.0, 100.0),
            acceleration: (-3.0, 3.0),
        }
    }
}

impl SpawnRanges {
    /// Check that every range is finite and non-empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("position", -self.position_extent, self.position_extent)?;
        check_range("speed", self.speed.0, self.speed.1)?;
        check_range("mass", self.mass.0, self.mass.1)?;
        check_range("acceleration", self.acceleration.0, self.acceleration.1)?;
        if self.speed.0 < 0.0 {
            return Err(range_error("speed", self.speed));
        }
        if self.mass.0 <= 0.0 {
            return Err(range_error("mass", self.mass));
        }
        Ok(())
    }
}

fn check_range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(range_error(name, (min, max)));
    }
    Ok(())
}

fn range_error(name: &'static str, (min, max): (f32, f32)) -> ConfigError {
    ConfigError::Range { name, min, max }
}

/// Fills an [`EntityStore`] with random state
///
/// # Examples
///
/// ```
/// use particle_sim::init::{Randomizer, SpawnRanges};
/// use particle_sim::store::EntityStore;
///
/// let mut store = EntityStore::new(100).unwrap();
/// Randomizer::new(SpawnRanges::default(), Some(7)).unwrap().populate(&mut store);
/// assert!(store.velocities().iter().all(|v| v.speed >= 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct Randomizer {
    ranges: SpawnRanges,
    seed: u64,
}

impl Randomizer {
    /// Create a randomizer; `None` seeds from OS entropy
    pub fn new(ranges: SpawnRanges, seed: Option<u64>) -> Result<Self, ConfigError> {
        ranges.validate()?;
        let seed = seed.unwrap_or_else(|| StdRng::from_entropy().gen());
        Ok(Randomizer { ranges, seed })
    }

    /// Master seed in use; pass it back to reproduce a run
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fill every column of `store`
    pub fn populate(&self, store: &mut EntityStore) {
        let mut master = StdRng::seed_from_u64(self.seed);
        let seeds: [u64; 3] = [master.gen(), master.gen(), master.gen()];
        let ranges = self.ranges;
        let (positions, velocities, physics) = store.columns_mut();

        #[cfg(feature = "parallel")]
        {
            rayon::join(
                || fill_positions(positions, &ranges, seeds[0]),
                || {
                    rayon::join(
                        || fill_velocities(velocities, &ranges, seeds[1]),
                        || fill_physics(physics, &ranges, seeds[2]),
                    )
                },
            );
        }

        #[cfg(not(feature = "parallel"))]
        {
            fill_positions(positions, &ranges, seeds[0]);
            fill_velocities(velocities, &ranges, seeds[1]);
            fill_physics(physics, &ranges, seeds[2]);
        }

        log::info!("populated {} entities (seed {})", store.len(), self.seed);
    }
}

fn fill_positions(positions: &mut [Position], ranges: &SpawnRanges, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let extent = ranges.position_extent;
    for position in positions {
        *position = Position::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent));
    }
}

fn fill_velocities(velocities: &mut [Velocity], ranges: &SpawnRanges, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for velocity in velocities {
        let speed = rng.gen_range(ranges.speed.0..ranges.speed.1);
        *velocity = Velocity::new(speed, random_direction(&mut rng));
    }
}

fn fill_physics(physics: &mut [Physics], ranges: &SpawnRanges, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for phys in physics {
        *phys = Physics::new(
            rng.gen_range(ranges.mass.0..ranges.mass.1),
            rng.gen_range(ranges.acceleration.0..ranges.acceleration.1),
        );
    }
}

/// Uniform unit direction
///
/// Draws both components from `[-1, 1]` and normalises. Samples too close
/// to zero length are rejected and redrawn.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let sample = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if let Some(direction) = unit_or_reject(sample) {
            return direction;
        }
    }
}

fn unit_or_reject(sample: Vec2) -> Option<Vec2> {
    if !sample.is_valid() || sample.magnitude() < MIN_DIRECTION_MAGNITUDE {
        return None;
    }
    sample.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranges_valid() {
        assert!(SpawnRanges::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let empty = SpawnRanges { speed: (5.0, 5.0), ..SpawnRanges::default() };
        assert!(matches!(empty.validate(), Err(ConfigError::Range { name: "speed", .. })));

        let massless = SpawnRanges { mass: (0.0, 1.0), ..SpawnRanges::default() };
        assert!(matches!(massless.validate(), Err(ConfigError::Range { name: "mass", .. })));

        let infinite = SpawnRanges { position_extent: f32::INFINITY, ..SpawnRanges::default() };
        assert!(infinite.validate().is_err());

        assert!(Randomizer::new(empty, Some(1)).is_err());
    }

    #[test]
    fn test_populate_respects_ranges() {
        let ranges = SpawnRanges::default();
        let mut store = EntityStore::new(2_000).unwrap();
        Randomizer::new(ranges, Some(42)).unwrap().populate(&mut store);

        for position in store.positions() {
            assert!(position.pos.x >= -20.0 && position.pos.x < 20.0);
            assert!(position.pos.y >= -20.0 && position.pos.y < 20.0);
        }
        for velocity in store.velocities() {
            assert!(velocity.speed >= 0.0 && velocity.speed < 20.0);
            assert!((velocity.direction.magnitude() - 1.0).abs() < 1e-5);
        }
        for phys in store.physics() {
            assert!(phys.mass >= 1.0 && phys.mass < 100.0);
            assert!(phys.acceleration >= -3.0 && phys.acceleration < 3.0);
        }
    }

    #[test]
    fn test_seeded_populate_is_reproducible() {
        let mut a = EntityStore::new(500).unwrap();
        let mut b = EntityStore::new(500).unwrap();
        Randomizer::new(SpawnRanges::default(), Some(9)).unwrap().populate(&mut a);
        Randomizer::new(SpawnRanges::default(), Some(9)).unwrap().populate(&mut b);
        assert_eq!(a, b);

        let mut c = EntityStore::new(500).unwrap();
        Randomizer::new(SpawnRanges::default(), Some(10)).unwrap().populate(&mut c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_entropy_seed_is_reported() {
        let randomizer = Randomizer::new(SpawnRanges::default(), None).unwrap();
        let replay = Randomizer::new(SpawnRanges::default(), Some(randomizer.seed())).unwrap();
        assert_eq!(randomizer.seed(), replay.seed());
    }

    #[test]
    fn test_degenerate_direction_samples_rejected() {
        assert_eq!(unit_or_reject(Vec2::zero()), None);
        assert_eq!(unit_or_reject(Vec2::new(1e-7, -1e-7)), None);
        assert_eq!(unit_or_reject(Vec2::new(f32::NAN, 0.5)), None);
        assert_eq!(unit_or_reject(Vec2::new(f32::INFINITY, 0.5)), None);

        let kept = unit_or_reject(Vec2::new(0.0, -0.25)).unwrap();
        assert_eq!(kept, Vec2::new(0.0, -1.0));

        let small = unit_or_reject(Vec2::new(MIN_DIRECTION_MAGNITUDE, 0.0)).unwrap();
        assert!((small.magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_random_direction_unit_length() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10_000 {
            let dir = random_direction(&mut rng);
            assert!((dir.magnitude() - 1.0).abs() < 1e-5);
        }
    }
}
