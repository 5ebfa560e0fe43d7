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
//! Lane-batched motion integrator

use super::StepParams;
use crate::simd::{select_backend, LaneBackend, LaneBatch, LaneWidth};
use crate::store::{EntityStore, Physics, Position, Velocity};

/// Unit of work that advances the live store by one frame
///
/// The frame orchestrator drives this seam on one worker while the renderer
/// runs on the other.
pub trait MotionStep: Send {
    /// Advance every entity in `store` by `dt` seconds
    fn integrate_store(&mut self, store: &mut EntityStore, dt: f32);
}

/// Integrator that processes entities in fixed-width lanes
///
/// # Examples
///
/// ```
/// use particle_sim::integration::MotionIntegrator;
/// use particle_sim::simd::LaneWidth;
/// use particle_sim::store::{Physics, Position, Vec2, Velocity};
///
/// let integrator = MotionIntegrator::new(LaneWidth::Scalar);
/// let mut positions = vec![Position::origin()];
/// let mut velocities = vec![Velocity::new(10.0, Vec2::new(0.0, 1.0))];
/// let mut physics = vec![Physics::new(50.0, 0.0)];
///
/// integrator.integrate(&mut positions, &mut velocities, &mut physics, 1.0);
/// assert!((positions[0].pos.y - 0.18).abs() < 1e-5);
/// ```
pub struct MotionIntegrator {
    backend: Box<dyn LaneBackend>,
}

impl MotionIntegrator {
    /// Create an integrator for the requested lane width
    pub fn new(lane_width: LaneWidth) -> Self {
        let backend = select_backend(lane_width);
        log::info!(
            "motion integrator using {} backend ({} lanes)",
            backend.name(),
            backend.width()
        );
        MotionIntegrator { backend }
    }

    /// Create an integrator around a specific backend
    ///
    /// # Panics
    ///
    /// Panics if the backend is not supported on this CPU.
    pub fn with_backend(backend: Box<dyn LaneBackend>) -> Self {
        assert!(
            backend.is_supported(),
            "{} backend is not supported on this CPU",
            backend.name()
        );
        MotionIntegrator { backend }
    }

    /// Name of the selected backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Lanes processed per batch
    pub fn lane_width(&self) -> usize {
        self.backend.width()
    }

    /// Advance all entities by `dt` seconds
    ///
    /// Full lanes go through the backend; the remaining
    /// `len % lane_width()` entities use the scalar path.
    ///
    /// # Panics
    ///
    /// Panics if the three columns differ in length.
    pub fn integrate(
        &self,
        positions: &mut [Position],
        velocities: &mut [Velocity],
        physics: &mut [Physics],
        dt: f32,
    ) {
        let count = positions.len();
        assert!(
            velocities.len() == count && physics.len() == count,
            "Column lengths must match"
        );

        let step = StepParams::new(dt);
        let width = self.backend.width();
        let lane_end = count - count % width;

        let mut batch = LaneBatch::default();
        for start in (0..lane_end).step_by(width) {
            let end = start + width;
            gather(
                &mut batch,
                &positions[start..end],
                &velocities[start..end],
                &physics[start..end],
            );

            // SAFETY: the backend was checked with is_supported() when the
            // integrator was built.
            unsafe { self.backend.advance(&mut batch, &step) };

            scatter(
                &batch,
                &mut positions[start..end],
                &mut velocities[start..end],
                &mut physics[start..end],
            );
        }

        // Process remainder with scalar code
        for ((position, velocity), phys) in positions[lane_end..]
            .iter_mut()
            .zip(velocities[lane_end..].iter_mut())
            .zip(physics[lane_end..].iter_mut())
        {
            step.advance_lane(
                &mut phys.acceleration,
                &mut velocity.speed,
                velocity.direction.x,
                velocity.direction.y,
                &mut position.pos.x,
                &mut position.pos.y,
            );
        }
    }
}

impl MotionStep for MotionIntegrator {
    fn integrate_store(&mut self, store: &mut EntityStore, dt: f32) {
        let (positions, velocities, physics) = store.columns_mut();
        self.integrate(positions, velocities, physics, dt);
    }
}

impl std::fmt::Debug for MotionIntegrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionIntegrator")
            .field("backend", &self.backend.name())
            .field("lanes", &self.backend.width())
            .finish()
    }
}

#[inline(always)]
fn gather(batch: &mut LaneBatch, positions: &[Position], velocities: &[Velocity], physics: &[Physics]) {
    for (lane, ((position, velocity), phys)) in positions
        .iter()
        .zip(velocities)
        .zip(physics)
        .enumerate()
    {
        batch.acceleration[lane] = phys.acceleration;
        batch.speed[lane] = velocity.speed;
        batch.direction_x[lane] = velocity.direction.x;
        batch.direction_y[lane] = velocity.direction.y;
        batch.position_x[lane] = position.pos.x;
        batch.position_y[lane] = position.pos.y;
    }
}

#[inline(always)]
fn scatter(
    batch: &LaneBatch,
    positions: &mut [Position],
    velocities: &mut [Velocity],
    physics: &mut [Physics],
) {
    for (lane, ((position, velocity), phys)) in positions
        .iter_mut()
        .zip(velocities.iter_mut())
        .zip(physics.iter_mut())
        .enumerate()
    {
        phys.acceleration = batch.acceleration[lane];
        velocity.speed = batch.speed[lane];
        position.pos.x = batch.position_x[lane];
        position.pos.y = batch.position_y[lane];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::PortableBackend;
    use crate::store::Vec2;

    fn columns(count: usize) -> (Vec<Position>, Vec<Velocity>, Vec<Physics>) {
        let positions = (0..count)
            .map(|i| Position::new(i as f32 * 0.5, -(i as f32)))
            .collect();
        let velocities = (0..count)
            .map(|i| {
                let angle = i as f32 * 0.37;
                Velocity::new(1.0 + i as f32, Vec2::new(angle.cos(), angle.sin()))
            })
            .collect();
        let physics = (0..count)
            .map(|i| Physics::new(10.0, (i % 7) as f32 - 3.0))
            .collect();
        (positions, velocities, physics)
    }

    #[test]
    fn test_single_entity_scenario() {
        let integrator = MotionIntegrator::with_backend(Box::new(PortableBackend::scalar()));
        let mut positions = vec![Position::origin()];
        let mut velocities = vec![Velocity::new(10.0, Vec2::new(0.0, 1.0))];
        let mut physics = vec![Physics::new(50.0, 0.0)];

        integrator.integrate(&mut positions, &mut velocities, &mut physics, 1.0);

        assert!((physics[0].acceleration + 9.82).abs() < 1e-5);
        assert!((velocities[0].speed - 0.18).abs() < 1e-5);
        assert_eq!(positions[0].pos.x, 0.0);
        assert!((positions[0].pos.y - 0.18).abs() < 1e-5);
        assert_eq!(physics[0].mass, 50.0);
    }

    #[test]
    fn test_remainder_uses_scalar_path() {
        // 11 entities over 4 lanes: two full lanes plus three in the tail.
        let (mut p_lanes, mut v_lanes, mut m_lanes) = columns(11);
        let (mut p_ref, mut v_ref, mut m_ref) = columns(11);

        MotionIntegrator::with_backend(Box::new(PortableBackend::new(4)))
            .integrate(&mut p_lanes, &mut v_lanes, &mut m_lanes, 0.05);
        MotionIntegrator::with_backend(Box::new(PortableBackend::scalar()))
            .integrate(&mut p_ref, &mut v_ref, &mut m_ref, 0.05);

        assert_eq!(p_lanes, p_ref);
        assert_eq!(v_lanes, v_ref);
        assert_eq!(m_lanes, m_ref);
    }

    #[test]
    fn test_fewer_entities_than_lanes() {
        let (mut positions, mut velocities, mut physics) = columns(3);
        let integrator = MotionIntegrator::with_backend(Box::new(PortableBackend::new(8)));
        integrator.integrate(&mut positions, &mut velocities, &mut physics, 0.1);
        assert!(velocities.iter().all(|v| v.speed >= 0.0));
        assert!(physics.iter().all(|p| p.acceleration < 3.0));
    }

    #[test]
    fn test_direction_untouched() {
        let (mut positions, mut velocities, mut physics) = columns(16);
        let before: Vec<Vec2> = velocities.iter().map(|v| v.direction).collect();
        MotionIntegrator::new(LaneWidth::Auto).integrate(&mut positions, &mut velocities, &mut physics, 0.2);
        let after: Vec<Vec2> = velocities.iter().map(|v| v.direction).collect();
        assert_eq!(before, after);
    }

    #[test]
    #[should_panic(expected = "Column lengths must match")]
    fn test_mismatched_columns_panic() {
        let (mut positions, mut velocities, _) = columns(4);
        let mut physics = vec![Physics::default(); 3];
        MotionIntegrator::new(LaneWidth::Scalar).integrate(&mut positions, &mut velocities, &mut physics, 0.1);
    }

    #[test]
    fn test_motion_step_on_store() {
        let mut store = EntityStore::new(1).unwrap();
        store.set(
            0,
            Position::origin(),
            Velocity::new(1.0, Vec2::new(0.0, 1.0)),
            Physics::new(50.0, -20.0),
        );
        let mut integrator = MotionIntegrator::new(LaneWidth::Auto);
        integrator.integrate_store(&mut store, 1.0);

        assert_eq!(store.velocities()[0].speed, 0.0);
        assert_eq!(store.positions()[0].pos.y, 0.0);
        assert!((store.physics()[0].acceleration + 29.82).abs() < 1e-4);
    }
}
