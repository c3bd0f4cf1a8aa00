// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive view state
//!
//! Camera and model rotation as plain state transitions. A GUI shell feeds it
//! input deltas and timer ticks, then reads the matrices each frame.

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

/// Rotation units per degree (angles are stored in sixteenths of a degree)
pub const ROTATION_UNITS_PER_DEGREE: f64 = 16.0;

/// Eye movement per wheel notch, in scene units
const ZOOM_STEP: f64 = 2.0;
/// Rotation per pixel of orbit drag
const ORBIT_UNITS_PER_PIXEL: i32 = 8;
/// Pixels of pan drag per scene unit
const PAN_PIXELS_PER_UNIT: f64 = 50.0;
/// Rotation per spin tick on each of the x and y axes
const SPIN_STEP: i32 = 6;

/// Frustum half-extent at the near plane
const FRUSTUM_HALF_EXTENT: f64 = 1.0;
const NEAR: f64 = 5.0;
const FAR: f64 = 1000.0;

/// Camera and model orientation
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Camera position
    pub eye: Point3<f64>,
    /// Point the camera looks at
    pub target: Point3<f64>,
    /// Model rotation about x, y, z in sixteenths of a degree
    pub rotation: [i32; 3],
    /// Whether timer ticks advance the rotation
    pub spinning: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 50.0),
            target: Point3::origin(),
            rotation: [0, 0, 0],
            spinning: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the eye along z: closer when the wheel turns away from the user
    pub fn zoom(&mut self, wheel_delta: i32) {
        if wheel_delta > 0 {
            self.eye.z -= ZOOM_STEP;
        } else {
            self.eye.z += ZOOM_STEP;
        }
    }

    /// Rotate the model by a drag of (dx, dy) pixels
    pub fn orbit(&mut self, dx: i32, dy: i32) {
        self.rotation[0] += ORBIT_UNITS_PER_PIXEL * dy;
        self.rotation[1] += ORBIT_UNITS_PER_PIXEL * dx;
    }

    /// Shift the look-at target by a drag of (dx, dy) pixels
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.target.x -= f64::from(dx) / PAN_PIXELS_PER_UNIT;
        self.target.y += f64::from(dy) / PAN_PIXELS_PER_UNIT;
    }

    /// Start or stop spinning
    pub fn toggle_spin(&mut self) {
        self.spinning = !self.spinning;
    }

    /// Advance one timer tick
    pub fn tick(&mut self) {
        if self.spinning {
            self.rotation[0] += SPIN_STEP;
            self.rotation[1] += SPIN_STEP;
        }
    }

    /// Model rotation in degrees about x, y, z
    pub fn rotation_degrees(&self) -> [f64; 3] {
        self.rotation.map(|r| f64::from(r) / ROTATION_UNITS_PER_DEGREE)
    }

    /// Model matrix: rotation about x, then y, then z
    pub fn model_matrix(&self) -> Matrix4<f64> {
        let [rx, ry, rz] = self.rotation_degrees();
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), rx.to_radians())
            * Rotation3::from_axis_angle(&Vector3::y_axis(), ry.to_radians())
            * Rotation3::from_axis_angle(&Vector3::z_axis(), rz.to_radians());
        rotation.to_homogeneous()
    }

    /// Look-at view matrix with +Y up
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.eye, &self.target, &Vector3::y())
    }

    /// Symmetric perspective frustum
    #[rustfmt::skip]
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        let (l, r, b, t) = (
            -FRUSTUM_HALF_EXTENT,
            FRUSTUM_HALF_EXTENT,
            -FRUSTUM_HALF_EXTENT,
            FRUSTUM_HALF_EXTENT,
        );
        let (n, f) = (NEAR, FAR);

        Matrix4::new(
            2.0 * n / (r - l), 0.0,               (r + l) / (r - l),  0.0,
            0.0,               2.0 * n / (t - b), (t + b) / (t - b),  0.0,
            0.0,               0.0,               -(f + n) / (f - n), -2.0 * f * n / (f - n),
            0.0,               0.0,               -1.0,               0.0,
        )
    }

    /// Projection × view × model
    pub fn mvp_matrix(&self) -> Matrix4<f64> {
        self.projection_matrix() * self.view_matrix() * self.model_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_state() {
        let view = ViewState::new();
        assert_eq!(view.eye, Point3::new(0.0, 0.0, 50.0));
        assert_eq!(view.target, Point3::origin());
        assert_eq!(view.rotation, [0, 0, 0]);
        assert!(!view.spinning);
    }

    #[test]
    fn test_zoom() {
        let mut view = ViewState::new();
        view.zoom(120);
        assert_eq!(view.eye.z, 48.0);
        view.zoom(-120);
        view.zoom(0);
        assert_eq!(view.eye.z, 52.0);
    }

    #[test]
    fn test_orbit_and_pan() {
        let mut view = ViewState::new();
        view.orbit(3, -2);
        assert_eq!(view.rotation, [-16, 24, 0]);

        view.pan(25, 100);
        assert_relative_eq!(view.target.x, -0.5);
        assert_relative_eq!(view.target.y, 2.0);
    }

    #[test]
    fn test_spin_only_when_enabled() {
        let mut view = ViewState::new();
        view.tick();
        assert_eq!(view.rotation, [0, 0, 0]);

        view.toggle_spin();
        view.tick();
        view.tick();
        assert_eq!(view.rotation, [12, 12, 0]);

        view.toggle_spin();
        view.tick();
        assert_eq!(view.rotation, [12, 12, 0]);
    }

    #[test]
    fn test_model_matrix_rotates_in_sixteenths() {
        let mut view = ViewState::new();
        // 90 degrees about y
        view.rotation = [0, 90 * 16, 0];
        let p = view.model_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let view = ViewState::new();
        let p = view.view_matrix().transform_point(&view.eye);
        assert_relative_eq!(p, Point3::origin(), epsilon = 1e-12);

        let target = view.view_matrix().transform_point(&view.target);
        assert_relative_eq!(target, Point3::new(0.0, 0.0, -50.0), epsilon = 1e-12);
    }

    #[test]
    fn test_projection_maps_near_and_far_planes() {
        let proj = ViewState::new().projection_matrix();
        let near = proj.transform_point(&Point3::new(0.0, 0.0, -5.0));
        let far = proj.transform_point(&Point3::new(0.0, 0.0, -1000.0));
        assert_relative_eq!(near.z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-9);

        let edge = proj.transform_point(&Point3::new(1.0, 0.0, -5.0));
        assert_relative_eq!(edge.x, 1.0, epsilon = 1e-12);
    }
}
