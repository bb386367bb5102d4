//! Damped orbit camera controls.
//!
//! The camera sits on a sphere around a target point. Input does not move the
//! camera directly: drags and wheel notches accumulate into a pending delta,
//! and every [`OrbitControls::update`] applies a fraction of it and lets the
//! remainder decay. With a damping factor of 0.05 a flick of the mouse keeps
//! the galaxy drifting for a second or so before it settles.

use std::f32::consts::{PI, TAU};

use glam::{Mat3, Quat, Vec2, Vec3};

use crate::mouse::{DragMode, MouseState};

/// Keeps the polar angle off the exact poles where the look-at basis
/// degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Tunables for [`OrbitControls`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings {
    /// Fraction of pending motion applied per update. `0.0` disables
    /// damping and applies input immediately.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits in radians, measured from +Y.
    pub min_polar: f32,
    pub max_polar: f32,
    /// Vertical field of view, used to scale panning to the visible area.
    pub fov_y: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
            fov_y: 75.0_f32.to_radians(),
        }
    }
}

/// Where the camera is and which way it faces, for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    /// Rotation taking camera space (-Z forward, +Y up) to world space.
    pub rotation: Quat,
    pub target: Vec3,
}

/// Radius, polar angle from +Y, and azimuth around +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Mouse-driven orbit/pan/dolly controller with exponential damping.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    settings: OrbitSettings,
    target: Vec3,
    spherical: Spherical,
    /// Pending azimuth (x) and polar (y) change in radians.
    rotate_delta: Vec2,
    pan_offset: Vec3,
    /// Pending multiplicative change of the radius.
    dolly_scale: f32,
}

impl OrbitControls {
    /// Creates controls for a camera at `position` looking at `target`.
    pub fn new(position: Vec3, target: Vec3, settings: OrbitSettings) -> Self {
        let mut controls = Self {
            settings,
            target,
            spherical: Spherical::from_offset(position - target),
            rotate_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            dolly_scale: 1.0,
        };
        controls.constrain();
        controls
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Distance from camera to target.
    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Polar angle in radians, measured from +Y.
    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    /// Azimuth in radians around +Y, zero on the +Z axis.
    pub fn azimuth(&self) -> f32 {
        self.spherical.theta
    }

    /// Queues an azimuth change in radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.rotate_delta.x -= angle;
    }

    /// Queues a polar change in radians. Positive tilts the camera upward.
    pub fn rotate_up(&mut self, angle: f32) {
        self.rotate_delta.y -= angle;
    }

    /// Queues a target translation in world units.
    pub fn pan_by(&mut self, offset: Vec3) {
        self.pan_offset += offset;
    }

    /// Queues a zoom. Positive notches move the camera closer.
    pub fn dolly(&mut self, notches: f32) {
        let zoom_scale = 0.95_f32.powf(self.settings.zoom_speed);
        self.dolly_scale *= zoom_scale.powf(notches);
    }

    /// Feeds this frame's mouse state into the controller.
    ///
    /// `viewport_height` is the height the cursor deltas are measured in. A
    /// drag across the full height orbits one full turn.
    pub fn handle_mouse(&mut self, mouse: &MouseState, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let delta = mouse.delta();

        match mouse.drag_mode() {
            Some(DragMode::Rotate) if delta != Vec2::ZERO => {
                let speed = self.settings.rotate_speed;
                self.rotate_left(TAU * delta.x / height * speed);
                self.rotate_up(TAU * delta.y / height * speed);
            }
            Some(DragMode::Pan) if delta != Vec2::ZERO => {
                self.pan_screen(delta * self.settings.pan_speed, height);
            }
            _ => {}
        }

        if mouse.scroll() != 0.0 {
            self.dolly(mouse.scroll());
        }
    }

    /// Pans so the point under the cursor follows it across the screen.
    fn pan_screen(&mut self, delta: Vec2, height: f32) {
        let visible_half_height = self.spherical.radius * (self.settings.fov_y / 2.0).tan();
        let world_per_pixel = 2.0 * visible_half_height / height;

        let rotation = look_rotation(self.spherical.to_offset());
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        self.pan_by(-right * delta.x * world_per_pixel + up * delta.y * world_per_pixel);
    }

    /// Applies pending motion and returns the pose for this frame.
    pub fn update(&mut self) -> CameraPose {
        let factor = self.step_factor();

        self.spherical.theta += self.rotate_delta.x * factor;
        self.spherical.phi += self.rotate_delta.y * factor;
        self.spherical.radius *= self.dolly_scale;
        self.target += self.pan_offset * factor;
        self.constrain();

        let decay = 1.0 - factor;
        self.rotate_delta *= decay;
        self.pan_offset *= decay;
        self.dolly_scale = 1.0;

        let offset = self.spherical.to_offset();
        CameraPose {
            position: self.target + offset,
            rotation: look_rotation(offset),
            target: self.target,
        }
    }

    fn step_factor(&self) -> f32 {
        let factor = self.settings.damping_factor;
        if factor > 0.0 { factor.min(1.0) } else { 1.0 }
    }

    fn constrain(&mut self) {
        let s = &self.settings;
        let min_polar = s.min_polar.max(POLE_EPSILON);
        let max_polar = s.max_polar.min(PI - POLE_EPSILON).max(min_polar);
        self.spherical.phi = self.spherical.phi.clamp(min_polar, max_polar);
        self.spherical.theta = self.spherical.theta.rem_euclid(TAU);
        self.spherical.radius = self
            .spherical
            .radius
            .clamp(s.min_distance, s.max_distance.max(s.min_distance));
    }
}

/// Rotation of a camera placed at `offset` from its target, looking at it.
fn look_rotation(offset: Vec3) -> Quat {
    let back = offset.normalize_or_zero();
    if back == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let right = Vec3::Y.cross(back).normalize_or_zero();
    if right == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back))
}
