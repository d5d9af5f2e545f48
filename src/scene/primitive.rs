//! Primitive definitions for the `diorama` scene module.
//!
//! Geometry is described analytically (a plane or a cuboid) rather than as
//! triangle soup. That is all the viewer needs for wireframe drawing and
//! ray picking, and it keeps model fragments small when snapshotted.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Packed 0xRRGGBB color.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);
    pub const BLACK: Color = Color(0x000000);

    pub fn red(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub fn green(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub fn blue(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// RGBA bytes with the given alpha.
    pub fn to_rgba(self, alpha: u8) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), alpha]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:06x})", self.0)
    }
}

/// Which faces of a surface are visible (and pickable).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Front,
    Double,
}

/// Flat, unlit material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub side: Side,
    pub wireframe: bool,
}

impl Material {
    pub fn flat(color: Color) -> Self {
        Self {
            color,
            side: Side::Front,
            wireframe: false,
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    pub fn wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }
}

/// Local-space geometry of a mesh.
///
/// - `Plane` spans the local XY plane, centred on the origin, normal +Z.
/// - `Cuboid` is an axis-aligned box centred on the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Plane { width: f32, height: f32 },
    Cuboid { width: f32, height: f32, depth: f32 },
}

impl Geometry {
    /// Local-space bounds as (min, max).
    pub fn bounds(&self) -> (Vec3, Vec3) {
        match *self {
            Geometry::Plane { width, height } => {
                let half = Vec3::new(width / 2.0, height / 2.0, 0.0);
                (-half, half)
            }
            Geometry::Cuboid { width, height, depth } => {
                let half = Vec3::new(width, height, depth) / 2.0;
                (-half, half)
            }
        }
    }

    /// Local-space outline edges used by wireframe drawing.
    pub fn edges(&self) -> Vec<(Vec3, Vec3)> {
        let (min, max) = self.bounds();
        match self {
            Geometry::Plane { .. } => {
                let corners = [
                    Vec3::new(min.x, min.y, 0.0),
                    Vec3::new(max.x, min.y, 0.0),
                    Vec3::new(max.x, max.y, 0.0),
                    Vec3::new(min.x, max.y, 0.0),
                ];
                (0..4).map(|i| (corners[i], corners[(i + 1) % 4])).collect()
            }
            Geometry::Cuboid { .. } => box_edges(min, max),
        }
    }
}

/// The twelve edges of an axis-aligned box.
pub fn box_edges(min: Vec3, max: Vec3) -> Vec<(Vec3, Vec3)> {
    let corner = |i: usize| {
        Vec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    };
    let mut edges = Vec::with_capacity(12);
    for i in 0..8 {
        for bit in [1, 2, 4] {
            if i & bit == 0 {
                edges.push((corner(i), corner(i | bit)));
            }
        }
    }
    edges
}
