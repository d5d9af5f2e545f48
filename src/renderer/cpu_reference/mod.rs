//! CPU reference renderer
//!
//! Rasterizes the scene as wireframe lines into an RGBA framebuffer sized
//! `client size × pixel ratio`. It stands in for a GPU canvas in headless
//! runs and tests; surfaces are drawn as outlines only.

use crate::renderer::settings::RendererSettings;
use crate::renderer::{RenderScene, Renderer, RendererError};
use crate::scene::graph::{Node, NodeKind};
use crate::scene::primitive::{box_edges, Color};
use glam::{Mat4, Vec3, Vec4};
use image::{Rgba, RgbaImage};
use std::path::Path;

// Homogeneous w below this is treated as behind the camera.
const W_EPSILON: f32 = 1e-4;

const AXIS_COLORS: [Color; 3] = [Color(0xff0000), Color(0x00ff00), Color(0x0000ff)];

#[derive(Debug)]
pub struct CpuReferenceRenderer {
    settings: RendererSettings,
    pixel_ratio: f32,
    size: (u32, u32),
    framebuffer: RgbaImage,
    frame_count: u64,
}

impl CpuReferenceRenderer {
    pub fn new() -> Self {
        Self::with_settings(RendererSettings::default())
    }

    pub fn with_settings(settings: RendererSettings) -> Self {
        Self {
            settings,
            pixel_ratio: 1.0,
            size: (0, 0),
            framebuffer: RgbaImage::new(0, 0),
            frame_count: 0,
        }
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// The last drawn frame.
    pub fn framebuffer(&self) -> &RgbaImage {
        &self.framebuffer
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RendererError> {
        self.framebuffer.save(path)?;
        Ok(())
    }

    /// Pixels that differ from the clear color.
    pub fn painted_pixels(&self) -> usize {
        let clear = Rgba(self.settings.clear_rgba());
        self.framebuffer.pixels().filter(|p| **p != clear).count()
    }

    fn reallocate(&mut self) {
        let width = (self.size.0 as f32 * self.pixel_ratio).round() as u32;
        let height = (self.size.1 as f32 * self.pixel_ratio).round() as u32;
        if self.framebuffer.dimensions() != (width, height) {
            self.framebuffer = RgbaImage::from_pixel(width, height, Rgba(self.settings.clear_rgba()));
        }
    }

    fn draw_node(&mut self, node: &Node, world: Mat4, view_projection: Mat4) {
        let mvp = view_projection * world;
        match &node.kind {
            NodeKind::Mesh { geometry, material } => {
                for (a, b) in geometry.edges() {
                    self.draw_segment(mvp, a, b, material.color);
                }
            }
            NodeKind::GridHelper { color, .. } => {
                for (a, b) in node.kind.line_segments() {
                    self.draw_segment(mvp, a, b, *color);
                }
            }
            NodeKind::AxesHelper { .. } => {
                for ((a, b), color) in node.kind.line_segments().into_iter().zip(AXIS_COLORS) {
                    self.draw_segment(mvp, a, b, color);
                }
            }
            NodeKind::PointLight { color, .. } => {
                // small box gizmo
                for (a, b) in box_edges(Vec3::splat(-1.0), Vec3::splat(1.0)) {
                    self.draw_segment(mvp, a, b, *color);
                }
            }
            NodeKind::Group => {}
        }
    }

    fn draw_segment(&mut self, mvp: Mat4, a: Vec3, b: Vec3, color: Color) {
        let mut ca = mvp * a.extend(1.0);
        let mut cb = mvp * b.extend(1.0);
        if ca.w < W_EPSILON && cb.w < W_EPSILON {
            return;
        }
        // clip against the w = epsilon plane
        if ca.w < W_EPSILON {
            ca = clip_towards(ca, cb);
        } else if cb.w < W_EPSILON {
            cb = clip_towards(cb, ca);
        }

        let (width, height) = self.framebuffer.dimensions();
        let to_pixel = |c: Vec4| {
            let ndc = c.truncate() / c.w;
            ((ndc.x + 1.0) * 0.5 * width as f32, (1.0 - ndc.y) * 0.5 * height as f32)
        };
        let Some((p0, p1)) = clip_to_viewport(to_pixel(ca), to_pixel(cb), width, height) else {
            return;
        };
        let rgba = Rgba(color.to_rgba(255));
        plot_line(&mut self.framebuffer, p0, p1, rgba);
    }
}

impl Default for CpuReferenceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CpuReferenceRenderer {
    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = if ratio > 0.0 { ratio } else { 1.0 };
        self.reallocate();
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.reallocate();
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(&mut self, scene: &RenderScene<'_>) -> Result<(), RendererError> {
        self.frame_count += 1;
        if self.settings.auto_clear {
            let clear = Rgba(self.settings.clear_rgba());
            self.framebuffer.pixels_mut().for_each(|p| *p = clear);
        }

        let (width, height) = self.framebuffer.dimensions();
        if width == 0 || height == 0 {
            tracing::debug!(frame = self.frame_count, "empty framebuffer, nothing drawn");
            return Ok(());
        }
        if scene.camera.is_degenerate() {
            tracing::warn!(frame = self.frame_count, "degenerate camera projection, nothing drawn");
            return Ok(());
        }
        if scene.camera.is_projection_dirty() {
            tracing::warn!(frame = self.frame_count, "rendering with a stale projection matrix");
        }

        let view_projection = scene.camera.view_projection();
        let mut drawn = 0usize;
        scene.graph.traverse_world(|node, world| {
            self.draw_node(node, world, view_projection);
            drawn += 1;
        });
        for marker in scene.markers.iter() {
            marker.traverse_world(Mat4::IDENTITY, &mut |node, world| {
                self.draw_node(node, world, view_projection);
                drawn += 1;
            });
        }

        tracing::trace!(frame = self.frame_count, nodes = drawn, width, height, "frame drawn");
        Ok(())
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn name(&self) -> &'static str {
        "cpu_reference"
    }

    fn frame_image(&self) -> Option<&RgbaImage> {
        Some(&self.framebuffer)
    }
}

/// Move `behind` along the segment until it reaches w = epsilon.
fn clip_towards(behind: Vec4, front: Vec4) -> Vec4 {
    let t = (W_EPSILON - behind.w) / (front.w - behind.w);
    behind + (front - behind) * t
}

/// Liang-Barsky clip of a pixel-space segment to the framebuffer.
fn clip_to_viewport(p0: (f32, f32), p1: (f32, f32), width: u32, height: u32) -> Option<((i64, i64), (i64, i64))> {
    let (x_max, y_max) = ((width - 1) as f32, (height - 1) as f32);
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [(-dx, p0.0), (dx, x_max - p0.0), (-dy, p0.1), (dy, y_max - p0.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f32| ((p0.0 + dx * t).round() as i64, (p0.1 + dy * t).round() as i64);
    Some((at(t0), at(t1)))
}

/// Bresenham line; points outside the image are skipped.
fn plot_line(image: &mut RgbaImage, (mut x0, mut y0): (i64, i64), (x1, y1): (i64, i64), color: Rgba<u8>) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if (0..width).contains(&x0) && (0..height).contains(&y0) {
            image.put_pixel(x0 as u32, y0 as u32, color);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::configure_camera;
    use crate::markers::MarkerLayer;
    use crate::scene::graph::SceneGraph;
    use crate::scene::primitive::{Geometry, Material};

    fn sized(width: u32, height: u32) -> CpuReferenceRenderer {
        let mut r = CpuReferenceRenderer::new();
        r.set_size(width, height);
        r
    }

    #[test]
    fn framebuffer_scales_with_pixel_ratio() {
        let mut r = sized(100, 50);
        r.set_pixel_ratio(2.0);
        assert_eq!(r.framebuffer().dimensions(), (200, 100));
        assert_eq!(r.size(), (100, 50));
    }

    #[test]
    fn empty_scene_renders_clear_frame() {
        let mut r = sized(64, 48);
        let graph = SceneGraph::new("empty");
        let markers = MarkerLayer::default();
        let camera = configure_camera(60.0, 1.0, 1100.0, 64.0 / 48.0);

        r.render(&RenderScene { graph: &graph, markers: &markers, camera: &camera }).unwrap();
        assert_eq!(r.frame_count(), 1);
        assert_eq!(r.painted_pixels(), 0);
    }

    #[test]
    fn visible_mesh_paints_pixels() {
        let mut r = sized(64, 48);
        let mut graph = SceneGraph::new("one box");
        graph.add_node_to_root(Node::mesh(
            "box",
            Geometry::Cuboid { width: 40.0, height: 40.0, depth: 40.0 },
            Material::flat(Color(0x000000)),
        ));
        let markers = MarkerLayer::default();
        let camera = configure_camera(60.0, 1.0, 1100.0, 64.0 / 48.0);

        r.render(&RenderScene { graph: &graph, markers: &markers, camera: &camera }).unwrap();
        assert!(r.painted_pixels() > 0);
    }

    #[test]
    fn degenerate_camera_draws_nothing_but_counts_frame() {
        let mut r = sized(64, 48);
        let mut graph = SceneGraph::new("one box");
        graph.add_node_to_root(Node::mesh(
            "box",
            Geometry::Cuboid { width: 40.0, height: 40.0, depth: 40.0 },
            Material::flat(Color(0x000000)),
        ));
        let markers = MarkerLayer::default();
        let camera = configure_camera(60.0, 1.0, 1100.0, 0.0);

        r.render(&RenderScene { graph: &graph, markers: &markers, camera: &camera }).unwrap();
        assert_eq!(r.frame_count(), 1);
        assert_eq!(r.painted_pixels(), 0);
    }

    #[test]
    fn viewport_clipping() {
        assert_eq!(clip_to_viewport((-10.0, 5.0), (20.0, 5.0), 10, 10), Some(((0, 5), (9, 5))));
        assert_eq!(clip_to_viewport((-10.0, -5.0), (-1.0, -1.0), 10, 10), None);
    }

    #[test]
    fn png_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let r = sized(8, 8);
        r.save_png(&path).unwrap();
        assert!(path.exists());
    }
}
