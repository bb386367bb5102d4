//! Perspective camera.

use glam::{Mat4, Quat, Vec3};

/// A perspective camera looking down its local -Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Creates a camera with the given vertical field of view in degrees.
    pub fn new(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            aspect_ratio,
            near,
            far,
        }
    }

    /// Inverse of the camera's world transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Right-handed projection into wgpu's `[0, 1]` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Places the camera at `position` with `rotation`.
    pub fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }

    /// Updates the aspect ratio. A zero height is ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 && width > 0.0 {
            self.aspect_ratio = width / height;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(75.0, 16.0 / 9.0, 0.1, 100.0)
    }
}
