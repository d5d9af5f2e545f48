//! Perspective camera and aspect-ratio handling.

use glam::{Mat4, Vec3};

/// Initial camera position used by [`configure_camera`].
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(100.0, 100.0, 100.0);

/// Width over height, or exactly `0.0` when `height` is zero.
pub fn compute_aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        return 0.0;
    }
    width as f32 / height as f32
}

/// Build a perspective camera at the default position, looking at the origin.
pub fn configure_camera(fov_degrees: f32, near: f32, far: f32, aspect: f32) -> PerspectiveCamera {
    PerspectiveCamera::new(fov_degrees, near, far, aspect).with_position(DEFAULT_CAMERA_POSITION)
}

/// Perspective camera with a lazily recomputed projection matrix.
///
/// Changing any projection parameter marks the projection dirty; callers
/// must run [`PerspectiveCamera::update_projection_matrix`] before the next
/// frame or pick, otherwise the stale matrix distorts the image.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
    projection_dirty: bool,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, near: f32, far: f32, aspect: f32) -> Self {
        let mut camera = Self {
            fov_degrees,
            near,
            far,
            aspect,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Mat4::ZERO,
            projection_dirty: true,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set the aspect ratio; the projection becomes dirty.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_dirty = true;
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    /// Recompute the projection matrix from fov, aspect and clip planes.
    ///
    /// A non-positive aspect yields a zero matrix: nothing is drawn and no
    /// ray can be built until the canvas has a height again.
    pub fn update_projection_matrix(&mut self) {
        self.projection = if self.aspect > 0.0 && self.near > 0.0 && self.far > self.near {
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
        } else {
            Mat4::ZERO
        };
        self.projection_dirty = false;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// True when the projection is the zero matrix and cannot be inverted.
    pub fn is_degenerate(&self) -> bool {
        self.projection == Mat4::ZERO
    }
}
