use super::{crate_model, fill_canvas, viewer_with, CANVAS_HEIGHT, CANVAS_WIDTH};
use diorama::loader::{ModelLoader, SnapshotModelSource, StaticModelSource};
use diorama::scene::builder::SceneCensus;
use diorama::{LoadOutcome, ResizeEvent, Viewer, ViewerConfig, ViewerError, ViewerEvent};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_attach_builds_scene_and_renders_once() {
    println!("=== Attach Lifecycle Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    let events = viewer.subscribe();
    viewer.attach(fill_canvas()).unwrap();

    let census = SceneCensus::of(viewer.graph().unwrap());
    assert_eq!(census.axes_helpers, 1);
    assert_eq!(census.grid_helpers, 1);
    assert_eq!(census.point_lights, 2);
    assert_eq!(census.meshes, 1);

    let camera = viewer.camera().unwrap();
    assert_eq!(camera.position, glam::Vec3::new(100.0, 100.0, 100.0));
    assert_eq!(camera.aspect(), CANVAS_WIDTH as f32 / CANVAS_HEIGHT as f32);
    assert_eq!(viewer.frame_count(), 1);

    assert_eq!(events.drain(), vec![ViewerEvent::Rendered { frame: 1 }, ViewerEvent::Attached]);

    println!("Attach lifecycle: OK");
}

#[tokio::test]
async fn test_model_merge_triggers_exactly_one_render() {
    println!("=== Model Merge Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();
    let before = viewer.graph().unwrap().len();
    let frames = viewer.frame_count();

    match viewer.next_load().await.unwrap() {
        Some(LoadOutcome::Merged { nodes, .. }) => assert_eq!(nodes, 2),
        other => panic!("Expected a merged model, got: {:?}", other),
    }

    let graph = viewer.graph().unwrap();
    assert_eq!(graph.len(), before + 2);
    assert!(graph.find_node_by_name("crate-body").is_some());
    assert_eq!(viewer.frame_count(), frames + 1);
    assert_eq!(viewer.pending_loads(), 0);

    println!("Model merge: OK");
}

#[tokio::test]
async fn test_snapshot_model_round_trip_through_viewer() {
    println!("=== Snapshot Model Test ===");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crate.bin");
    std::fs::write(&path, crate_model().to_snapshot().unwrap()).unwrap();

    let config = ViewerConfig::default().with_model_path(&path);
    let loader = ModelLoader::current(Arc::new(SnapshotModelSource::new()));
    let mut viewer = Viewer::new(config, loader);
    viewer.attach(fill_canvas()).unwrap();

    let outcome = viewer.next_load().await.unwrap();
    assert!(matches!(outcome, Some(LoadOutcome::Merged { nodes: 2, .. })));
    assert!(viewer.graph().unwrap().find_node_by_name("crate").is_some());

    println!("Snapshot model: OK");
}

#[tokio::test]
async fn test_missing_model_file_is_not_fatal() {
    println!("=== Missing Model Test ===");

    let config = ViewerConfig::default().with_model_path("does/not/exist.bin");
    let loader = ModelLoader::current(Arc::new(SnapshotModelSource::new()));
    let mut viewer = Viewer::new(config, loader);
    let events = viewer.subscribe();
    viewer.attach(fill_canvas()).unwrap();

    let outcome = viewer.next_load().await.unwrap();
    let Some(LoadOutcome::Failed { id }) = outcome else {
        panic!("Expected a failed load, got: {:?}", outcome);
    };
    assert!(events.drain().contains(&ViewerEvent::ModelFailed { load_id: id }));
    assert_eq!(viewer.frame_count(), 1);

    println!("Missing model: OK");
}

#[tokio::test]
async fn test_cancelled_load_never_merges() {
    println!("=== Cancelled Load Test ===");

    let source = StaticModelSource::new(crate_model()).with_delay(Duration::from_millis(30));
    let mut viewer = viewer_with(source);
    viewer.attach(fill_canvas()).unwrap();

    let extra = viewer.load_model("assets/model/second.bin").unwrap();
    assert_eq!(viewer.pending_loads(), 2);
    assert!(viewer.cancel_load(extra));
    assert!(!viewer.cancel_load(extra));

    // only the stock model arrives
    let outcome = viewer.next_load().await.unwrap();
    assert!(matches!(outcome, Some(LoadOutcome::Merged { .. })));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(viewer.poll_loads().unwrap().is_empty());
    assert_eq!(viewer.frame_count(), 2);

    println!("Cancelled load: OK");
}

#[tokio::test]
async fn test_detach_then_reattach() {
    println!("=== Detach And Reattach Test ===");

    let source = StaticModelSource::new(crate_model()).with_delay(Duration::from_millis(20));
    let mut viewer = viewer_with(source);
    viewer.attach(fill_canvas()).unwrap();

    let canvas = viewer.detach().unwrap();
    assert!(!viewer.is_attached());
    assert_eq!(viewer.pending_loads(), 0);
    assert!(matches!(viewer.render(), Err(ViewerError::NotAttached)));
    assert!(matches!(
        viewer.on_resize(ResizeEvent { width: 10, height: 10 }),
        Err(ViewerError::NotAttached)
    ));

    viewer.attach(canvas).unwrap();
    assert_eq!(viewer.pending_loads(), 1);
    let outcome = viewer.next_load().await.unwrap();
    assert!(matches!(outcome, Some(LoadOutcome::Merged { .. })));
    // a fresh scene: one crate, not two
    let mut crates = 0;
    viewer.graph().unwrap().traverse(|node| {
        if node.name == "crate" {
            crates += 1;
        }
    });
    assert_eq!(crates, 1);

    println!("Detach and reattach: OK");
}

#[tokio::test]
async fn test_resize_is_idempotent() {
    println!("=== Resize Idempotence Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    // default style: the canvas keeps its intrinsic size until the first resize
    viewer.attach(diorama::canvas::Canvas::new(1024, 512)).unwrap();
    assert_eq!(viewer.context().unwrap().binding.renderer().size(), (300, 150));

    let resize = ResizeEvent { width: 1024, height: 512 };
    viewer.on_resize(resize).unwrap();
    let camera = viewer.camera().unwrap().clone();
    let frames = viewer.frame_count();

    viewer.on_resize(resize).unwrap();
    let ctx = viewer.context().unwrap();
    assert_eq!(&ctx.camera, &camera);
    assert_eq!(ctx.camera.aspect(), 2.0);
    assert!(!ctx.camera.is_projection_dirty());
    assert_eq!(ctx.binding.renderer().size(), (1024, 512));
    assert_eq!(ctx.binding.canvas().style, diorama::canvas::CanvasStyle::FILL);
    assert_eq!(viewer.frame_count(), frames + 1);

    println!("Resize idempotence: OK");
}

#[tokio::test]
async fn test_zero_height_resize_gives_zero_aspect() {
    println!("=== Zero Height Resize Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();
    viewer.on_resize(ResizeEvent { width: 640, height: 0 }).unwrap();

    let camera = viewer.camera().unwrap();
    assert_eq!(camera.aspect(), 0.0);
    assert!(camera.is_degenerate());
    // picking through a degenerate camera finds nothing
    assert_eq!(viewer.on_pointer_down(&diorama::PointerEvent::at(10.0, 0.0)).unwrap(), 0);

    println!("Zero height resize: OK");
}
