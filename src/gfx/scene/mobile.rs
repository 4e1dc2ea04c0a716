//! Drivable entities.
//!
//! A [`MobileEntity`] wraps an [`EntityGroup`] with position and heading
//! state. The derived transform is an orthonormal basis rebuilt by every
//! mutator, never edited directly, so it can never go stale relative
//! to the state that defines it.

use cgmath::{InnerSpace, Matrix4, Vector3};
use std::f32::consts::TAU;

use super::entity::{DrawSink, EntityGroup};
use crate::gfx::resources::RenderContext;

pub struct MobileEntity {
    group: EntityGroup,
    position: Vector3<f32>,
    /// Pitch/yaw/roll. Only yaw (`.y`) feeds the derived transform; pitch
    /// and roll are carried but inert.
    pyr: Vector3<f32>,
    direction: Vector3<f32>,
    up: Vector3<f32>,
    mob_transform: Matrix4<f32>,
}

impl MobileEntity {
    /// Takes ownership of the group, starting at the origin facing +X.
    pub fn new(group: EntityGroup) -> Self {
        let mut mob = Self {
            group,
            position: Vector3::new(0.0, 0.0, 0.0),
            pyr: Vector3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(1.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            mob_transform: cgmath::SquareMatrix::identity(),
        };
        mob.update_state(None, None, None);
        mob
    }

    /// Sets any of heading, position and up, then rebuilds the derived
    /// transform. `None` leaves a field unchanged; `up` is re-normalized.
    pub fn update_state(
        &mut self,
        pyr: Option<Vector3<f32>>,
        position: Option<Vector3<f32>>,
        up: Option<Vector3<f32>>,
    ) {
        if let Some(pyr) = pyr {
            self.pyr = pyr;
        }
        if let Some(position) = position {
            self.position = position;
        }
        if let Some(up) = up {
            self.up = up.normalize();
        }

        let yaw = self.pyr.y;
        self.direction = Vector3::new(yaw.cos(), 0.0, yaw.sin());

        let n = -self.direction;
        let u = self.up.cross(n).normalize();
        let v = n.cross(u).normalize();

        self.mob_transform = Matrix4::from_cols(
            u.extend(0.0),
            v.extend(0.0),
            n.extend(0.0),
            self.position.extend(1.0),
        );
    }

    /// Moves `distance` along the current heading (negative backs up).
    pub fn advance(&mut self, distance: f32) {
        self.position += self.direction * distance;
        self.update_state(None, None, None);
    }

    /// Adds `angle` radians to the yaw, keeping it in `[0, 2π)`.
    pub fn turn(&mut self, angle: f32) {
        self.pyr.y = (self.pyr.y + angle).rem_euclid(TAU);
        self.update_state(None, None, None);
    }

    /// Renders the group with the derived transform folded into the ambient
    /// transform.
    pub fn render(&self, ambient: Matrix4<f32>, sink: &mut dyn DrawSink) {
        self.group.render(ambient * self.mob_transform, sink);
    }

    pub fn init_meshes(&self, ctx: &RenderContext) {
        self.group.init_meshes(ctx);
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.pyr.y
    }

    pub fn group(&self) -> &EntityGroup {
        &self.group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::entity::{DrawCall, SceneNode};
    use approx::assert_relative_eq;
    use cgmath::{Matrix4, SquareMatrix, Vector4};

    fn mob() -> MobileEntity {
        MobileEntity::new(EntityGroup::from_node(SceneNode::default()))
    }

    #[test]
    fn direction_tracks_yaw_exactly() {
        let mut car = mob();
        let yaw = 1.25_f32;
        car.turn(yaw);
        assert_relative_eq!(car.direction().x, yaw.cos());
        assert_relative_eq!(car.direction().z, yaw.sin());
        assert_eq!(car.direction().y, 0.0);
    }

    #[test]
    fn turn_wraps_into_zero_to_tau() {
        let mut car = mob();
        for _ in 0..100 {
            car.turn(0.37);
        }
        assert!(car.yaw() >= 0.0 && car.yaw() < TAU);

        car.turn(-50.0);
        assert!(car.yaw() >= 0.0 && car.yaw() < TAU);
    }

    #[test]
    fn full_revolution_is_identity_on_yaw() {
        let mut car = mob();
        car.turn(0.5);
        let before = car.yaw();
        for _ in 0..8 {
            car.turn(TAU / 8.0);
        }
        assert_relative_eq!(car.yaw(), before, epsilon = 1e-4);
    }

    #[test]
    fn advance_round_trip_returns_home() {
        let mut car = mob();
        car.advance(10.0);
        car.advance(-10.0);
        assert_relative_eq!(car.position().magnitude(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn advance_moves_along_heading() {
        let mut car = mob();
        car.turn(std::f32::consts::FRAC_PI_2);
        car.advance(4.0);
        assert_relative_eq!(car.position().x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(car.position().z, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn derived_transform_places_group_at_position() {
        let mut car = mob();
        car.update_state(None, Some(Vector3::new(2.0, 0.0, -3.0)), None);

        let mut calls: Vec<DrawCall> = Vec::new();
        car.render(Matrix4::identity(), &mut calls);
        let p = calls[0].transform * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.z, -3.0);
    }

    #[test]
    fn derived_basis_stays_orthonormal() {
        let mut car = mob();
        car.turn(2.3);
        let m = {
            let mut calls: Vec<DrawCall> = Vec::new();
            car.render(Matrix4::identity(), &mut calls);
            calls[0].transform
        };
        let u = m.x.truncate();
        let v = m.y.truncate();
        let n = m.z.truncate();
        assert_relative_eq!(u.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(v.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(u.dot(v), 0.0, epsilon = 1e-5);
        assert_relative_eq!(v.dot(n), 0.0, epsilon = 1e-5);
        assert_relative_eq!(n.dot(u), 0.0, epsilon = 1e-5);
    }
}
