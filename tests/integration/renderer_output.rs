use super::{crate_model, fill_canvas, viewer_with, CANVAS_HEIGHT, CANVAS_WIDTH};
use diorama::controls::ControlInput;
use diorama::loader::StaticModelSource;
use diorama::renderer::prelude::*;
use diorama::ViewerError;

#[tokio::test]
async fn test_frame_export_to_png() {
    println!("=== Frame Export Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();
    viewer.next_load().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    viewer.save_frame(&path).unwrap();

    let image = image::open(&path).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
    let white = image::Rgba([255, 255, 255, 255]);
    assert!(image.pixels().any(|p| *p != white), "frame is blank");

    println!("Frame export: OK");
}

#[tokio::test]
async fn test_frame_export_needs_attachment() {
    println!("=== Frame Export Detached Test ===");

    let viewer = viewer_with(StaticModelSource::new(crate_model()));
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        viewer.save_frame(dir.path().join("frame.png")),
        Err(ViewerError::NotAttached)
    ));

    println!("Frame export detached: OK");
}

#[tokio::test]
async fn test_orbit_controls_render_on_demand() {
    println!("=== Orbit Controls Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();
    let start = viewer.camera().unwrap().position;
    let frames = viewer.frame_count();

    assert!(viewer.on_control_input(ControlInput::Rotate { dx: 40.0, dy: 0.0 }).unwrap());
    assert!(viewer.on_control_input(ControlInput::Zoom { steps: 2.0 }).unwrap());

    let camera = viewer.camera().unwrap();
    assert_ne!(camera.position, start);
    assert!(camera.position.length() < start.length());
    assert_eq!(viewer.frame_count(), frames + 2);

    println!("Orbit controls: OK");
}

#[tokio::test]
async fn test_custom_renderer_parameters_reach_backend() {
    println!("=== Renderer Parameters Test ===");

    let config = diorama::ViewerConfig::default().with_renderer_parameters("clear_color=0x202020,shadow_map=basic");
    let loader = diorama::ModelLoader::current(std::sync::Arc::new(StaticModelSource::new(crate_model())));
    let mut viewer = diorama::Viewer::new(config, loader);
    viewer.attach(fill_canvas()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dark.png");
    viewer.save_frame(&path).unwrap();
    let image = image::open(&path).unwrap().to_rgba8();
    assert_eq!(*image.get_pixel(0, 0), image::Rgba([0x20, 0x20, 0x20, 255]));

    let bad = diorama::ViewerConfig::default().with_renderer_parameters("clear_alpha=7");
    let loader = diorama::ModelLoader::current(std::sync::Arc::new(StaticModelSource::new(crate_model())));
    let mut viewer = diorama::Viewer::new(bad, loader);
    assert!(matches!(
        viewer.attach(fill_canvas()),
        Err(ViewerError::Renderer(RendererError::InvalidParameters(_)))
    ));

    println!("Renderer parameters: OK");
}
