//! Orbit controls: rotate the camera around its target and dolly toward it.

use crate::camera::PerspectiveCamera;
use glam::Vec3;
use std::f32::consts::PI;

const MIN_POLAR: f32 = 1e-4;
const MIN_RADIUS: f32 = 1e-3;

/// User input understood by [`OrbitControls`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    /// Pointer drag in CSS pixels.
    Rotate { dx: f32, dy: f32 },
    /// Wheel steps; positive moves the camera toward the target.
    Zoom { steps: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub enabled: bool,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(1.0, 1.2)
    }
}

impl OrbitControls {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            enabled: true,
        }
    }

    /// Apply `input` to `camera`. Returns whether the camera moved.
    ///
    /// `viewport_height` is the canvas client height; a full-height drag
    /// rotates by one turn at rotate speed 1.
    pub fn apply(&self, camera: &mut PerspectiveCamera, input: ControlInput, viewport_height: u32) -> bool {
        if !self.enabled {
            return false;
        }

        let offset = camera.position - camera.target;
        let mut radius = offset.length();
        if radius < MIN_RADIUS {
            return false;
        }
        // polar angle from +Y, azimuth around +Y
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let mut azimuth = offset.x.atan2(offset.z);

        match input {
            ControlInput::Rotate { dx, dy } => {
                if viewport_height == 0 || (dx == 0.0 && dy == 0.0) {
                    return false;
                }
                let per_pixel = 2.0 * PI / viewport_height as f32 * self.rotate_speed;
                azimuth -= dx * per_pixel;
                polar = (polar - dy * per_pixel).clamp(MIN_POLAR, PI - MIN_POLAR);
            }
            ControlInput::Zoom { steps } => {
                if steps == 0.0 {
                    return false;
                }
                let scale = 0.95_f32.powf(self.zoom_speed);
                radius = (radius * scale.powf(steps)).max(MIN_RADIUS);
            }
        }

        let sin_polar = polar.sin();
        let moved = Vec3::new(
            radius * sin_polar * azimuth.sin(),
            radius * polar.cos(),
            radius * sin_polar * azimuth.cos(),
        );
        let position = camera.target + moved;
        if position.abs_diff_eq(camera.position, 1e-6) {
            return false;
        }
        camera.position = position;
        true
    }
}
