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
//! Fixed-capacity entity storage
//!
//! Entities have no identity beyond their index. The store keeps one
//! contiguous column per component type, index-aligned by entity id:
//!
//! ```text
//! positions:  [p0, p1, p2, p3, ...]
//! velocities: [v0, v1, v2, v3, ...]
//! physics:    [m0, m1, m2, m3, ...]
//! ```
//!
//! Per-frame work touches one attribute across every entity, so the
//! columnar layout keeps cache lines full and lets the integrator gather
//! whole lanes at a time. Capacity is fixed at construction; there is no
//! insert or remove.

mod components;

pub use components::{Physics, Position, Vec2, Velocity};

use crate::error::ConfigError;

/// Upper bound on the entity count accepted by the store
pub const MAX_ENTITIES: usize = 1 << 22;

/// Index-aligned component columns for a fixed entity population
///
/// # Examples
///
/// ```
/// use particle_sim::store::EntityStore;
///
/// let store = EntityStore::new(16).unwrap();
/// assert_eq!(store.len(), 16);
/// assert!(EntityStore::new(0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStore {
    positions: Vec<Position>,
    velocities: Vec<Velocity>,
    physics: Vec<Physics>,
}

impl EntityStore {
    /// Create a zeroed store for `count` entities
    pub fn new(count: usize) -> Result<Self, ConfigError> {
        validate_count(count)?;
        Ok(EntityStore {
            positions: vec![Position::default(); count],
            velocities: vec![Velocity::default(); count],
            physics: vec![Physics::default(); count],
        })
    }

    /// Adopt pre-filled columns
    ///
    /// All three columns must have the same, valid length.
    pub fn from_columns(
        positions: Vec<Position>,
        velocities: Vec<Velocity>,
        physics: Vec<Physics>,
    ) -> Result<Self, ConfigError> {
        if positions.len() != velocities.len() || positions.len() != physics.len() {
            return Err(ConfigError::ColumnMismatch {
                positions: positions.len(),
                velocities: velocities.len(),
                physics: physics.len(),
            });
        }
        validate_count(positions.len())?;
        Ok(EntityStore {
            positions,
            velocities,
            physics,
        })
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false; a store holds at least one entity
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position column
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Velocity column
    pub fn velocities(&self) -> &[Velocity] {
        &self.velocities
    }

    /// Physics column
    pub fn physics(&self) -> &[Physics] {
        &self.physics
    }

    /// Mutable access to all three columns at once
    ///
    /// The borrows are disjoint, so an integrator can write positions while
    /// reading velocities without going through the store again.
    pub fn columns_mut(&mut self) -> (&mut [Position], &mut [Velocity], &mut [Physics]) {
        (&mut self.positions, &mut self.velocities, &mut self.physics)
    }

    /// Overwrite every component of entity `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn set(&mut self, id: usize, position: Position, velocity: Velocity, physics: Physics) {
        self.positions[id] = position;
        self.velocities[id] = velocity;
        self.physics[id] = physics;
    }
}

fn validate_count(count: usize) -> Result<(), ConfigError> {
    if count == 0 || count > MAX_ENTITIES {
        return Err(ConfigError::EntityCount {
            count,
            max: MAX_ENTITIES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_creation() {
        let store = EntityStore::new(5).unwrap();
        assert_eq!(store.len(), 5);
        assert_eq!(store.positions().len(), 5);
        assert_eq!(store.velocities().len(), 5);
        assert_eq!(store.physics().len(), 5);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_store_rejects_bad_counts() {
        assert_eq!(
            EntityStore::new(0),
            Err(ConfigError::EntityCount { count: 0, max: MAX_ENTITIES })
        );
        assert!(EntityStore::new(MAX_ENTITIES + 1).is_err());
    }

    #[test]
    fn test_from_columns_mismatch() {
        let result = EntityStore::from_columns(
            vec![Position::origin(); 3],
            vec![Velocity::default(); 2],
            vec![Physics::default(); 3],
        );
        assert!(matches!(result, Err(ConfigError::ColumnMismatch { velocities: 2, .. })));
    }

    #[test]
    fn test_set_and_columns_mut() {
        let mut store = EntityStore::new(2).unwrap();
        store.set(
            1,
            Position::new(1.0, 2.0),
            Velocity::new(3.0, Vec2::new(1.0, 0.0)),
            Physics::new(4.0, -1.0),
        );
        assert_eq!(store.positions()[1], Position::new(1.0, 2.0));

        let (positions, velocities, physics) = store.columns_mut();
        positions[0].pos.x = 7.0;
        velocities[0].speed = 8.0;
        physics[0].mass = 9.0;
        assert_eq!(store.positions()[0].pos.x, 7.0);
        assert_eq!(store.velocities()[0].speed, 8.0);
        assert_eq!(store.physics()[0].mass, 9.0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_id_panics() {
        let mut store = EntityStore::new(1).unwrap();
        store.set(1, Position::origin(), Velocity::default(), Physics::default());
    }
}
