//! Ray picking: pointer position → camera ray → ordered scene intersections.

use crate::camera::PerspectiveCamera;
use crate::scene::graph::{NodeKind, NodePath, PickCandidate};
use crate::scene::primitive::{Geometry, Side};
use glam::{Mat4, Vec2, Vec3};

const PARALLEL_EPSILON: f32 = 1e-8;

/// Map a pointer position in client pixels to normalized device coordinates.
///
/// x grows right and y grows up in NDC, both in [-1, 1] across the canvas.
/// Returns `None` for a zero-sized canvas.
pub fn pointer_to_ndc(client_x: f32, client_y: f32, client_width: u32, client_height: u32) -> Option<Vec2> {
    if client_width == 0 || client_height == 0 {
        return None;
    }
    Some(Vec2::new(
        (client_x / client_width as f32) * 2.0 - 1.0,
        -(client_y / client_height as f32) * 2.0 + 1.0,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A ray hit against one scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub distance: f32,
    pub point: Vec3,
    pub path: NodePath,
    pub name: String,
    /// Index of the hit line for grid and axes helpers.
    pub segment: Option<usize>,
}

/// World units within which a ray counts as touching a helper line.
pub const DEFAULT_LINE_THRESHOLD: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct Raycaster {
    pub ray: Ray,
    pub line_threshold: f32,
}

impl Raycaster {
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            line_threshold: DEFAULT_LINE_THRESHOLD,
        }
    }

    pub fn with_line_threshold(mut self, threshold: f32) -> Self {
        self.line_threshold = threshold;
        self
    }

    /// Ray from the camera position through `ndc`.
    ///
    /// `None` when the camera projection is degenerate (zero aspect).
    pub fn from_camera(ndc: Vec2, camera: &PerspectiveCamera) -> Option<Self> {
        if camera.is_degenerate() {
            return None;
        }
        let inverse = camera.view_projection().inverse();
        if !inverse.is_finite() {
            return None;
        }
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - camera.position).try_normalize()?;
        Some(Self::new(Ray {
            origin: camera.position,
            direction,
        }))
    }

    /// Test every candidate; hits come back nearest first.
    ///
    /// Surfaces yield at most one hit per node, helpers one hit per line
    /// the ray passes within `line_threshold` of.
    pub fn intersect_candidates(&self, candidates: &[PickCandidate]) -> Vec<Intersection> {
        let mut hits = Vec::new();
        for candidate in candidates {
            let segments = candidate.kind.line_segments();
            if segments.is_empty() {
                if let Some(point) = intersect_kind(&self.ray, &candidate.kind, candidate.world) {
                    hits.push(Intersection {
                        distance: point.distance(self.ray.origin),
                        point,
                        path: candidate.path.clone(),
                        name: candidate.name.clone(),
                        segment: None,
                    });
                }
                continue;
            }
            for (index, (a, b)) in segments.into_iter().enumerate() {
                let a = candidate.world.transform_point3(a);
                let b = candidate.world.transform_point3(b);
                let Some((t, point)) = closest_approach(&self.ray, a, b) else {
                    continue;
                };
                if point.distance(self.ray.at(t)) <= self.line_threshold {
                    hits.push(Intersection {
                        distance: t,
                        point,
                        path: candidate.path.clone(),
                        name: candidate.name.clone(),
                        segment: Some(index),
                    });
                }
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Closest points between `ray` and the segment `a`..`b`: the ray parameter
/// and the point on the segment. `None` for a non-finite segment.
fn closest_approach(ray: &Ray, a: Vec3, b: Vec3) -> Option<(f32, Vec3)> {
    let edge = b - a;
    let offset = ray.origin - a;
    let edge_len_sq = edge.length_squared();
    if !edge_len_sq.is_finite() {
        return None;
    }
    // direction is unit length
    let d_e = ray.direction.dot(edge);
    let d_o = ray.direction.dot(offset);
    let e_o = edge.dot(offset);

    let denom = edge_len_sq - d_e * d_e;
    let mut s = if denom > PARALLEL_EPSILON {
        ((e_o - d_o * d_e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut t = s * d_e - d_o;
    if t < 0.0 {
        t = 0.0;
        s = if edge_len_sq > PARALLEL_EPSILON {
            (e_o / edge_len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
    Some((t, a + edge * s))
}

/// World-space hit point of `ray` against a node of `kind` placed at `world`.
fn intersect_kind(ray: &Ray, kind: &NodeKind, world: Mat4) -> Option<Vec3> {
    let inverse = world.inverse();
    if !inverse.is_finite() {
        return None;
    }
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction);

    let local_t = match kind {
        NodeKind::Mesh { geometry, material } => match *geometry {
            Geometry::Plane { width, height } => {
                let t = intersect_xy_rect(origin, direction, width, height)?;
                // front face looks down +Z
                if material.side == Side::Front && direction.z >= 0.0 {
                    return None;
                }
                t
            }
            Geometry::Cuboid { .. } => {
                let (min, max) = geometry.bounds();
                let (t_near, t_far) = intersect_box(origin, direction, min, max)?;
                if t_near >= 0.0 {
                    t_near
                } else if material.side == Side::Double {
                    t_far
                } else {
                    return None;
                }
            }
        },
        NodeKind::Group | NodeKind::PointLight { .. } | NodeKind::AxesHelper { .. } | NodeKind::GridHelper { .. } => {
            return None
        }
    };

    Some(world.transform_point3(origin + direction * local_t))
}

fn intersect_xy_rect(origin: Vec3, direction: Vec3, width: f32, height: f32) -> Option<f32> {
    if direction.z.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = -origin.z / direction.z;
    if t < 0.0 {
        return None;
    }
    let p = origin + direction * t;
    (p.x.abs() <= width / 2.0 && p.y.abs() <= height / 2.0).then_some(t)
}

/// Slab test. Returns (entry, exit) parameters when the ray line meets the box
/// in front of the origin.
fn intersect_box(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<(f32, f32)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);
        if d.abs() < PARALLEL_EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let (mut t0, mut t1) = ((min[axis] - o) / d, (max[axis] - o) / d);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }
    (t_far >= 0.0).then_some((t_near, t_far))
}
