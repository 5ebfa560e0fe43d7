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
//! Direction to glyph mapping

use crate::store::{Vec2, Velocity};

/// One of the four canonical headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    /// +y
    Up,
    /// +x
    Right,
    /// -y
    Down,
    /// -x
    Left,
}

impl Heading {
    /// All headings in tie-break order
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    /// Unit vector for this heading
    pub fn vector(self) -> Vec2 {
        match self {
            Heading::Up => Vec2::new(0.0, 1.0),
            Heading::Right => Vec2::new(1.0, 0.0),
            Heading::Down => Vec2::new(0.0, -1.0),
            Heading::Left => Vec2::new(-1.0, 0.0),
        }
    }

    /// Console glyph
    pub fn glyph(self) -> u8 {
        match self {
            Heading::Up => b'^',
            Heading::Right => b'>',
            Heading::Down => b'v',
            Heading::Left => b'<',
        }
    }

    /// Closest heading by normalised dot product
    ///
    /// Ties go to the heading listed first in [`Heading::ALL`]; a zero or
    /// non-finite direction maps to `Up`.
    pub fn classify(direction: Vec2) -> Heading {
        let Some(direction) = direction.normalized() else {
            return Heading::Up;
        };

        let mut best = Heading::Up;
        let mut best_score = f32::NEG_INFINITY;
        for heading in Heading::ALL {
            let score = direction.dot(heading.vector());
            if score > best_score {
                best = heading;
                best_score = score;
            }
        }
        best
    }
}

/// Cached per-entity draw state
///
/// Computed once from the initial velocity. Directions are never rescaled
/// or rotated by the integrator, so the glyph does not need refreshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawProperties {
    /// Glyph written at the entity's cell
    pub glyph: u8,
}

impl DrawProperties {
    /// Draw properties for an entity moving with `velocity`
    pub fn from_velocity(velocity: &Velocity) -> Self {
        DrawProperties {
            glyph: Heading::classify(velocity.direction).glyph(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_directions() {
        for heading in Heading::ALL {
            assert_eq!(Heading::classify(heading.vector()), heading);
        }
    }

    #[test]
    fn test_classify_unnormalised() {
        assert_eq!(Heading::classify(Vec2::new(5.0, 0.5)), Heading::Right);
        assert_eq!(Heading::classify(Vec2::new(-0.1, -3.0)), Heading::Down);
        assert_eq!(Heading::classify(Vec2::new(-2.0, 1.0)), Heading::Left);
    }

    #[test]
    fn test_ties_prefer_earlier_heading() {
        assert_eq!(Heading::classify(Vec2::new(1.0, 1.0)), Heading::Up);
        assert_eq!(Heading::classify(Vec2::new(1.0, -1.0)), Heading::Right);
        assert_eq!(Heading::classify(Vec2::new(-1.0, -1.0)), Heading::Down);
    }

    #[test]
    fn test_zero_direction_defaults_up() {
        assert_eq!(Heading::classify(Vec2::zero()), Heading::Up);
    }

    #[test]
    fn test_draw_properties() {
        let props = DrawProperties::from_velocity(&Velocity::new(3.0, Vec2::new(-1.0, 0.0)));
        assert_eq!(props.glyph, b'<');
    }
}
