use super::{crate_model, fill_canvas, viewer_with, CANVAS_HEIGHT, CANVAS_WIDTH};
use diorama::loader::StaticModelSource;
use diorama::markers::MARKER_COLOR;
use diorama::scene::graph::NodeKind;
use diorama::{KeyEvent, PointerEvent, ViewerEvent};

/// Hits of a centre click on the stock scene: ground plane, the two grid
/// lines through the origin and the three axes.
const STOCK_CENTRE_HITS: usize = 6;

fn centre() -> PointerEvent {
    PointerEvent::at(CANVAS_WIDTH as f32 / 2.0, CANVAS_HEIGHT as f32 / 2.0)
}

fn assert_snapped(position: glam::Vec3) {
    assert_eq!(position.y, 5.0, "marker height");
    assert_eq!(position.x.rem_euclid(20.0), 0.0, "x not snapped: {}", position.x);
    assert_eq!(position.z.rem_euclid(20.0), 0.0, "z not snapped: {}", position.z);
}

#[tokio::test]
async fn test_one_marker_per_intersection() {
    println!("=== One Marker Per Intersection Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();

    assert_eq!(viewer.on_pointer_down(&centre()).unwrap(), STOCK_CENTRE_HITS);

    viewer.next_load().await.unwrap();
    viewer.clear_markers().unwrap();

    // the crate body adds one more hit, and every marker gets its own frame
    let frames = viewer.frame_count();
    assert_eq!(viewer.on_pointer_down(&centre()).unwrap(), STOCK_CENTRE_HITS + 1);
    assert_eq!(viewer.frame_count(), frames + STOCK_CENTRE_HITS as u64 + 1);

    let markers = viewer.markers().unwrap();
    assert_eq!(markers.len(), STOCK_CENTRE_HITS + 1);
    for marker in markers.iter() {
        assert_snapped(marker.transform.position);
        match &marker.kind {
            NodeKind::Mesh { material, .. } => {
                assert!(material.wireframe);
                assert_eq!(material.color, MARKER_COLOR);
            }
            other => panic!("Expected a mesh marker, got: {:?}", other),
        }
    }

    println!("One marker per intersection: OK");
}

#[tokio::test]
async fn test_markers_stay_out_of_the_scene_graph() {
    println!("=== Marker Layer Separation Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();
    let nodes = viewer.graph().unwrap().len();

    viewer.on_pointer_down(&centre()).unwrap();
    viewer.on_pointer_down(&centre()).unwrap();

    // markers are not pick candidates, so the second pick hits the same things
    assert_eq!(viewer.markers().unwrap().len(), 2 * STOCK_CENTRE_HITS);
    assert_eq!(viewer.graph().unwrap().len(), nodes);

    println!("Marker layer separation: OK");
}

#[tokio::test]
async fn test_off_scene_pick_changes_nothing() {
    println!("=== Off Scene Pick Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();
    let frames = viewer.frame_count();

    // the top-left corner looks above the ground and past the helpers
    let spawned = viewer.on_pointer_down(&PointerEvent::at(0.0, 0.0)).unwrap();
    assert_eq!(spawned, 0);
    assert!(viewer.markers().unwrap().is_empty());
    assert_eq!(viewer.frame_count(), frames);

    println!("Off scene pick: OK");
}

#[tokio::test]
async fn test_pointer_up_and_key_press_do_not_mutate() {
    println!("=== Passive Handlers Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();
    viewer.on_pointer_down(&centre()).unwrap();

    let events = viewer.subscribe();
    let nodes = viewer.graph().unwrap().len();
    let markers = viewer.markers().unwrap().len();
    let camera = viewer.camera().unwrap().clone();
    let frames = viewer.frame_count();

    viewer.on_pointer_up(&centre());
    viewer.on_key_press(&KeyEvent::new("a"));
    viewer.on_key_press(&KeyEvent::new("Escape"));

    assert_eq!(viewer.graph().unwrap().len(), nodes);
    assert_eq!(viewer.markers().unwrap().len(), markers);
    assert_eq!(viewer.camera().unwrap(), &camera);
    assert_eq!(viewer.frame_count(), frames);
    assert!(events.drain().is_empty());

    println!("Passive handlers: OK");
}

#[tokio::test]
async fn test_pick_events_are_published() {
    println!("=== Pick Events Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();
    let events = viewer.subscribe();

    viewer.on_pointer_down(&centre()).unwrap();
    viewer.clear_markers().unwrap();

    let mut expected = Vec::new();
    for id in 1..=STOCK_CENTRE_HITS as u64 {
        expected.push(ViewerEvent::MarkerSpawned { id });
        expected.push(ViewerEvent::Rendered { frame: id + 1 });
    }
    expected.push(ViewerEvent::MarkersCleared { count: STOCK_CENTRE_HITS });
    expected.push(ViewerEvent::Rendered { frame: STOCK_CENTRE_HITS as u64 + 2 });
    assert_eq!(events.drain(), expected);

    println!("Pick events: OK");
}

#[tokio::test]
async fn test_marker_limit_evicts_oldest() {
    println!("=== Marker Limit Test ===");

    let config = diorama::ViewerConfig::from_parameters("marker_limit=3").unwrap();
    let loader = diorama::ModelLoader::current(std::sync::Arc::new(StaticModelSource::new(crate_model())));
    let mut viewer = diorama::Viewer::new(config, loader);
    viewer.attach(fill_canvas()).unwrap();

    viewer.on_pointer_down(&centre()).unwrap();
    viewer.on_pointer_down(&centre()).unwrap();

    let markers = viewer.markers().unwrap();
    assert_eq!(markers.len(), 3);
    assert_eq!(markers.evicted(), 2 * STOCK_CENTRE_HITS as u64 - 3);

    println!("Marker limit: OK");
}

#[tokio::test]
async fn test_grid_is_picked_on_its_lines() {
    println!("=== Grid Line Picking Test ===");

    let mut viewer = viewer_with(StaticModelSource::new(crate_model()));
    viewer.attach(fill_canvas()).unwrap();

    // the centre ray lands on the origin, where both centre grid lines cross
    assert_eq!(viewer.on_pointer_down(&centre()).unwrap(), STOCK_CENTRE_HITS);
    viewer.clear_markers().unwrap();

    // a few pixels to the right lands on the ground between grid lines
    let between = PointerEvent::at(CANVAS_WIDTH as f32 / 2.0 + 9.0, CANVAS_HEIGHT as f32 / 2.0);
    assert_eq!(viewer.on_pointer_down(&between).unwrap(), 1);

    println!("Grid line picking: OK");
}

#[tokio::test]
async fn test_line_threshold_is_configurable() {
    println!("=== Line Threshold Configuration Test ===");

    let config = diorama::ViewerConfig::from_parameters("line_threshold=6").unwrap();
    let loader = diorama::ModelLoader::current(std::sync::Arc::new(StaticModelSource::new(crate_model())));
    let mut viewer = diorama::Viewer::new(config, loader);
    viewer.attach(fill_canvas()).unwrap();

    // a wide band reaches the neighbouring grid lines from between them
    let between = PointerEvent::at(CANVAS_WIDTH as f32 / 2.0 + 9.0, CANVAS_HEIGHT as f32 / 2.0);
    assert!(viewer.on_pointer_down(&between).unwrap() > 1);

    println!("Line threshold configuration: OK");
}
