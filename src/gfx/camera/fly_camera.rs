//! Free viewpoint with an explicit orthonormal basis.
//!
//! The camera keeps right/up/back unit vectors (u, v, n); it looks along
//! -n. Every mutation re-normalizes, so the basis stays orthonormal no
//! matter how many slides, rotates and pitches accumulate over a session.

use cgmath::{perspective, InnerSpace, Matrix3, Matrix4, Rad, SquareMatrix, Vector3, Vector4};

use crate::error::{Error, Result};

/// wgpu clip space covers z in [0, 1] where the OpenGL-style projection
/// produced [-1, 1]; this matrix remaps between the two.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Ceiling for the ground-slide tilt compensation `1 / dot(v, up)`. A
/// camera looking near the horizon would otherwise divide by ~0 and
/// teleport.
const TILT_FACTOR_LIMIT: f32 = 16.0;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    position: Vector3<f32>,
    u: Vector3<f32>,
    v: Vector3<f32>,
    n: Vector3<f32>,
    fovy: Rad<f32>,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// A camera at the origin looking down -Z, with the demo's default view
    /// volume (45 degrees, 4:3, near 1, far 10000).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            u: Vector3::unit_x(),
            v: Vector3::unit_y(),
            n: Vector3::unit_z(),
            fovy: Rad(std::f32::consts::FRAC_PI_4),
            aspect: 4.0 / 3.0,
            near: 1.0,
            far: 10000.0,
        }
    }

    /// Points the camera at `target` from `eye`.
    ///
    /// Fails with [`Error::Precondition`] when `up` is parallel to the view
    /// direction, where the cross products collapse and no basis exists. The
    /// caller must supply a usable up vector; nothing is defaulted
    /// silently.
    pub fn orient(
        &mut self,
        eye: Vector3<f32>,
        target: Vector3<f32>,
        up: Vector3<f32>,
    ) -> Result<()> {
        let back = eye - target;
        if back.magnitude2() == 0.0 {
            return Err(Error::precondition("camera eye and target coincide"));
        }
        let n = back.normalize();
        let side = up.cross(n);
        if side.magnitude2() < 1e-12 {
            return Err(Error::precondition(
                "camera up vector is parallel to the view direction",
            ));
        }

        self.position = eye;
        self.n = n;
        self.u = side.normalize();
        self.v = n.cross(self.u).normalize();
        Ok(())
    }

    pub fn set_view_volume(&mut self, fovy: Rad<f32>, aspect: f32, near: f32, far: f32) {
        self.fovy = fovy;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Translates along the camera's own axes.
    pub fn slide(&mut self, d: Vector3<f32>) {
        self.position += d.x * self.u + d.y * self.v + d.z * self.n;
    }

    /// Ground-plane strafe: moves along the camera axes but stays at the
    /// current height, compensating the forward component for tilt so the
    /// apparent speed is the same whether the camera looks level or down.
    pub fn slide_xz(&mut self, d: Vector3<f32>) {
        let factor = self.tilt_factor();
        let mut step = d.x * self.u + d.y * self.v + d.z * self.n * factor;
        step.y = 0.0;
        self.position += step;
    }

    /// Vertical-only slide with the same tilt compensation.
    pub fn slide_y(&mut self, d: Vector3<f32>) {
        let factor = self.tilt_factor();
        let mut step = d.x * self.u + d.y * self.v * factor + d.z * self.n;
        step.x = 0.0;
        step.z = 0.0;
        self.position += step;
    }

    /// cos of the angle between `v` and world up, inverted and clamped.
    fn tilt_factor(&self) -> f32 {
        (1.0 / self.v.dot(WORLD_UP)).clamp(-TILT_FACTOR_LIMIT, TILT_FACTOR_LIMIT)
    }

    /// Rotates the whole basis around `axis` (free look yaw).
    pub fn rotate(&mut self, angle: f32, axis: Vector3<f32>) {
        let r = Matrix3::from_axis_angle(axis.normalize(), Rad(angle));
        self.u = (r * self.u).normalize();
        self.v = (r * self.v).normalize();
        self.n = (r * self.n).normalize();
    }

    /// Rotates v and n within their plane.
    ///
    /// Rejected (no-op) when the new `v` would dip to or below the horizon,
    /// so the camera can never invert; repeated calls at the limit hold the
    /// basis fixed rather than oscillating.
    pub fn pitch(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let v2 = self.v * cos + self.n * sin;
        let n2 = self.n * cos - self.v * sin;

        if v2.dot(WORLD_UP) <= 0.0 {
            return;
        }

        self.v = v2.normalize();
        self.n = n2.normalize();
        self.u = self.v.cross(self.n).normalize();
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.near, self.far)
    }

    /// World-to-view transform: the basis rotation inverted by transposing
    /// (orthonormal), times the inverse translation.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let mut rotation = Matrix4::from_cols(
            self.u.extend(0.0),
            self.v.extend(0.0),
            self.n.extend(0.0),
            Vector4::new(0.0, 0.0, 0.0, 1.0),
        );
        rotation.transpose_self();
        rotation * Matrix4::from_translation(-self.position)
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn u(&self) -> Vector3<f32> {
        self.u
    }

    pub fn v(&self) -> Vector3<f32> {
        self.v
    }

    pub fn n(&self) -> Vector3<f32> {
        self.n
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_orthonormal(camera: &Camera) {
        let (u, v, n) = (camera.u(), camera.v(), camera.n());
        assert_relative_eq!(u.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(v.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(u.dot(v), 0.0, epsilon = 1e-5);
        assert_relative_eq!(v.dot(n), 0.0, epsilon = 1e-5);
        assert_relative_eq!(n.dot(u), 0.0, epsilon = 1e-5);
    }

    fn looking_at_origin() -> Camera {
        let mut camera = Camera::new();
        camera
            .orient(
                Vector3::new(0.0, 2.0, 10.0),
                Vector3::new(0.0, 0.0, 0.0),
                WORLD_UP,
            )
            .unwrap();
        camera
    }

    #[test]
    fn orient_rejects_parallel_up() {
        let mut camera = Camera::new();
        let result = camera.orient(
            Vector3::new(0.0, 10.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            WORLD_UP, // parallel to the straight-down view direction
        );
        assert!(result.is_err());
    }

    #[test]
    fn orient_rejects_zero_view_direction() {
        let mut camera = Camera::new();
        let eye = Vector3::new(1.0, 2.0, 3.0);
        assert!(camera.orient(eye, eye, WORLD_UP).is_err());
    }

    #[test]
    fn basis_stays_orthonormal_under_rotation() {
        let mut camera = looking_at_origin();
        for i in 0..200 {
            camera.rotate(0.17 + i as f32 * 0.013, Vector3::new(0.3, 1.0, -0.2));
            assert_orthonormal(&camera);
        }
    }

    #[test]
    fn pitch_never_crosses_the_horizon() {
        let mut camera = looking_at_origin();
        for _ in 0..500 {
            camera.pitch(0.05);
            assert!(camera.v().dot(WORLD_UP) > 0.0);
            assert_orthonormal(&camera);
        }
    }

    #[test]
    fn pitch_at_the_limit_reaches_a_fixed_point() {
        let mut camera = looking_at_origin();
        for _ in 0..500 {
            camera.pitch(0.05);
        }
        let v_before = camera.v();
        camera.pitch(0.05);
        camera.pitch(0.05);
        assert_relative_eq!(camera.v().x, v_before.x, epsilon = 1e-6);
        assert_relative_eq!(camera.v().y, v_before.y, epsilon = 1e-6);
        assert_relative_eq!(camera.v().z, v_before.z, epsilon = 1e-6);
    }

    #[test]
    fn slide_moves_along_camera_axes() {
        let mut camera = looking_at_origin();
        let start = camera.position();
        camera.slide(Vector3::new(0.0, 0.0, -2.0));
        let moved = camera.position() - start;
        assert_relative_eq!(moved.dot(camera.n()), -2.0, epsilon = 1e-5);
    }

    #[test]
    fn slide_xz_keeps_height_constant() {
        let mut camera = looking_at_origin();
        camera.pitch(-0.4); // look down at the track
        let y = camera.position().y;
        camera.slide_xz(Vector3::new(0.5, 0.0, -0.5));
        assert_eq!(camera.position().y, y);
    }

    #[test]
    fn slide_xz_is_bounded_near_the_horizon() {
        let mut camera = Camera::new();
        // v almost perpendicular to world up: a hair above the guard.
        camera
            .orient(
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 100.0, -0.01),
                WORLD_UP,
            )
            .unwrap();
        let start = camera.position();
        camera.slide_xz(Vector3::new(0.0, 0.0, -0.5));
        let step = camera.position() - start;
        assert!(step.magnitude().is_finite());
        assert!(step.magnitude() <= 0.5 * TILT_FACTOR_LIMIT + 1e-3);
    }

    #[test]
    fn view_matrix_sends_eye_to_origin() {
        let camera = looking_at_origin();
        let eye = camera.position().extend(1.0);
        let at_origin = camera.view_matrix() * eye;
        assert_relative_eq!(at_origin.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(at_origin.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(at_origin.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn view_matrix_looks_down_negative_z() {
        let camera = looking_at_origin();
        // A point in front of the camera lands on the -z side of view space.
        let ahead = (camera.position() - camera.n() * 5.0).extend(1.0);
        let in_view = camera.view_matrix() * ahead;
        assert!(in_view.z < 0.0);
    }
}
