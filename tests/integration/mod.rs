mod picking_markers;
mod renderer_output;
mod viewer_lifecycle;

use diorama::canvas::{Canvas, CanvasStyle};
use diorama::loader::{ModelLoader, StaticModelSource};
use diorama::scene::graph::Node;
use diorama::scene::primitive::{Color, Geometry, Material};
use diorama::{Viewer, ViewerConfig};
use std::sync::Arc;

pub const CANVAS_WIDTH: u32 = 320;
pub const CANVAS_HEIGHT: u32 = 240;

pub fn fill_canvas() -> Canvas {
    Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT).with_style(CanvasStyle::FILL)
}

/// A small crate-like model sitting on the origin.
pub fn crate_model() -> Node {
    let mut model = Node::group("crate");
    model.add_child(Node::mesh(
        "crate-body",
        Geometry::Cuboid {
            width: 40.0,
            height: 40.0,
            depth: 40.0,
        },
        Material::flat(Color(0x8b5a2b)),
    ));
    model
}

/// Viewer on the current runtime whose model loads serve `source`.
pub fn viewer_with(source: StaticModelSource) -> Viewer {
    Viewer::new(ViewerConfig::default(), ModelLoader::current(Arc::new(source)))
}
