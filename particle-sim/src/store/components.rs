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
//! Per-entity component data
//!
//! Components are plain `Copy` records with single-precision fields. Each
//! component type lives in its own column of the [`EntityStore`](super::EntityStore),
//! so a pass that only needs speeds never pulls positions into cache.

use std::ops::{Add, AddAssign, Mul};

/// 2D vector with single-precision components
///
/// # Examples
///
/// ```
/// use particle_sim::store::Vec2;
///
/// let v = Vec2::new(3.0, 4.0);
/// assert_eq!(v.magnitude(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Vec2 {
    /// Horizontal component
    pub x: f32,
    /// Vertical component, positive is up
    pub y: f32,
}

impl Vec2 {
    /// Create a new vector
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// The zero vector
    pub const fn zero() -> Self {
        Vec2::new(0.0, 0.0)
    }

    /// Dot product
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length
    pub fn magnitude(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction
    ///
    /// Returns `None` when the magnitude is zero or not finite, since the
    /// division would produce NaN components.
    pub fn normalized(self) -> Option<Vec2> {
        let magnitude = self.magnitude();
        if magnitude > 0.0 && magnitude.is_finite() {
            Some(Vec2::new(self.x / magnitude, self.y / magnitude))
        } else {
            None
        }
    }

    /// Check if both components are finite
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, scalar: f32) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

/// World-space location of an entity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Position {
    /// Location in world units
    pub pos: Vec2,
}

impl Position {
    /// Create a position from coordinates
    pub const fn new(x: f32, y: f32) -> Self {
        Position { pos: Vec2::new(x, y) }
    }

    /// Position at the world origin
    pub const fn origin() -> Self {
        Position::new(0.0, 0.0)
    }
}

/// Speed along a unit heading
///
/// `direction` is unit length once initialised and the integrator never
/// rescales it. `speed` is kept at or above zero by the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Velocity {
    /// Scalar speed in world units per second, never negative
    pub speed: f32,
    /// Unit heading
    pub direction: Vec2,
}

impl Velocity {
    /// Create a velocity from a speed and a heading
    pub const fn new(speed: f32, direction: Vec2) -> Self {
        Velocity { speed, direction }
    }
}

/// Mass and scalar acceleration along the heading
///
/// Acceleration decays by gravity every frame and may go negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Physics {
    /// Mass in kilograms, strictly positive
    pub mass: f32,
    /// Acceleration along the velocity direction
    pub acceleration: f32,
}

impl Physics {
    /// Create physics properties
    pub const fn new(mass: f32, acceleration: f32) -> Self {
        Physics { mass, acceleration }
    }
}
