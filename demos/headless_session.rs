//! Headless viewer session: attach, wait for the model, pick, resize and
//! write the final frame to a PNG.
//!
//! Run with `cargo run --example headless_session -- [model.bin] [out.png]`.
//! Without a model path a small built-in model is served instead.

use diorama::canvas::{Canvas, CanvasStyle};
use diorama::controls::ControlInput;
use diorama::loader::{ModelLoader, ModelSource, SnapshotModelSource, StaticModelSource};
use diorama::scene::builder::SceneCensus;
use diorama::scene::graph::Node;
use diorama::scene::primitive::{Color, Geometry, Material};
use diorama::{LoadOutcome, PointerEvent, ResizeEvent, Viewer, ViewerConfig};
use std::path::PathBuf;
use std::sync::Arc;

fn demo_model() -> Node {
    let mut model = Node::group("demo-model");
    for (i, x) in [-60.0f32, 0.0, 60.0].into_iter().enumerate() {
        model.add_child(
            Node::mesh(
                format!("block-{}", i),
                Geometry::Cuboid {
                    width: 30.0,
                    height: 30.0 + 20.0 * i as f32,
                    depth: 30.0,
                },
                Material::flat(Color(0xc04000)),
            )
            .with_position(glam::Vec3::new(x, 15.0 + 10.0 * i as f32, 0.0)),
        );
    }
    model
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    println!("🎬 Headless Viewer Session");
    println!("==========================");

    let mut args = std::env::args().skip(1);
    let model = args.next().map(PathBuf::from);
    let output = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("frame.png"));

    let mut config = ViewerConfig::default();
    let source: Arc<dyn ModelSource> = match &model {
        Some(path) => {
            config = config.with_model_path(path);
            Arc::new(SnapshotModelSource::new())
        }
        None => Arc::new(StaticModelSource::new(demo_model())),
    };

    let mut viewer = Viewer::new(config, ModelLoader::current(source));
    viewer.attach(Canvas::new(800, 600).with_style(CanvasStyle::FILL))?;
    println!("✅ Attached, {} frame(s) drawn", viewer.frame_count());

    match viewer.next_load().await? {
        Some(LoadOutcome::Merged { nodes, .. }) => println!("📦 Model merged ({} nodes)", nodes),
        Some(LoadOutcome::Failed { .. }) => println!("⚠️  Model failed to load, continuing without it"),
        None => {}
    }
    if let Some(graph) = viewer.graph() {
        println!("Scene census: {:?}", SceneCensus::of(graph));
    }

    for (x, y) in [(400.0, 300.0), (250.0, 420.0), (560.0, 380.0)] {
        let spawned = viewer.on_pointer_down(&PointerEvent::at(x, y))?;
        viewer.on_pointer_up(&PointerEvent::at(x, y));
        println!("🎯 Pick at ({}, {}) spawned {} marker(s)", x, y, spawned);
    }

    viewer.on_control_input(ControlInput::Rotate { dx: 60.0, dy: -20.0 })?;
    viewer.on_resize(ResizeEvent { width: 1024, height: 576 })?;

    viewer.save_frame(&output)?;
    println!("🖼️  Wrote {} after {} frames", output.display(), viewer.frame_count());

    viewer.detach()?;
    Ok(())
}
