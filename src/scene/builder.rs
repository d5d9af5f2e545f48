//! Builds the stock scene: axes, ground plane, grid, lights, loaded model.

use crate::config::ViewerConfig;
use crate::loader::{LoadHandle, ModelLoader};
use crate::scene::graph::{Node, NodeKind, SceneGraph};
use crate::scene::primitive::{Color, Geometry, Material};
use glam::{Quat, Vec3};

pub const AXES_SIZE: f32 = 200.0;
pub const PLANE_WIDTH: f32 = 400.0;
pub const PLANE_HEIGHT: f32 = 200.0;
pub const PLANE_COLOR: Color = Color(0xf0ff00);
pub const GRID_SIZE: f32 = 500.0;
pub const GRID_DIVISIONS: u32 = 50;
pub const GRID_COLOR: Color = Color(0x0f0fff);
pub const LIGHT_OFFSET: f32 = 100.0;
pub const LIGHT_DISTANCE: f32 = 1000.0;

/// Static part of the scene: axes, ground plane and grid.
pub fn create_scene() -> SceneGraph {
    let mut graph = SceneGraph::new("scene");
    graph.add_node_to_root(Node::new("axes", NodeKind::AxesHelper { size: AXES_SIZE }));

    // the plane geometry lies in XY; turn it onto the ground
    let plane = Node::mesh(
        "ground",
        Geometry::Plane {
            width: PLANE_WIDTH,
            height: PLANE_HEIGHT,
        },
        Material::flat(PLANE_COLOR).double_sided(),
    )
    .with_rotation(Quat::from_rotation_x(90f32.to_radians()));
    graph.add_node_to_root(plane);

    graph.add_node_to_root(Node::new(
        "grid",
        NodeKind::GridHelper {
            size: GRID_SIZE,
            divisions: GRID_DIVISIONS,
            color: GRID_COLOR,
        },
    ));
    graph
}

/// Two white point lights, fore and aft along Z.
pub fn add_lights(graph: &mut SceneGraph) {
    for (name, z) in [("light-fore", LIGHT_OFFSET), ("light-aft", -LIGHT_OFFSET)] {
        graph.add_node_to_root(
            Node::new(
                name,
                NodeKind::PointLight {
                    color: Color::WHITE,
                    intensity: 1.0,
                    distance: LIGHT_DISTANCE,
                },
            )
            .with_position(Vec3::new(0.0, 0.0, z)),
        );
    }
}

/// Full scene build: static graph, lights, and the model load request.
///
/// The model is merged later, when the returned load completes.
pub fn build_scene(config: &ViewerConfig, loader: &ModelLoader) -> (SceneGraph, LoadHandle) {
    let mut graph = create_scene();
    add_lights(&mut graph);
    let handle = loader.load(config.model_path.clone());
    tracing::info!(
        nodes = graph.len(),
        model = %config.model_path.display(),
        source = loader.source_name(),
        "scene built, model load pending"
    );
    (graph, handle)
}

/// Per-kind node counts, used by diagnostics and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SceneCensus {
    pub groups: usize,
    pub meshes: usize,
    pub point_lights: usize,
    pub axes_helpers: usize,
    pub grid_helpers: usize,
}

impl SceneCensus {
    pub fn of(graph: &SceneGraph) -> Self {
        let mut census = Self::default();
        graph.traverse(|node| match node.kind {
            NodeKind::Group => census.groups += 1,
            NodeKind::Mesh { .. } => census.meshes += 1,
            NodeKind::PointLight { .. } => census.point_lights += 1,
            NodeKind::AxesHelper { .. } => census.axes_helpers += 1,
            NodeKind::GridHelper { .. } => census.grid_helpers += 1,
        });
        census
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_scene_contents() {
        let mut graph = create_scene();
        add_lights(&mut graph);

        let census = SceneCensus::of(&graph);
        assert_eq!(
            census,
            SceneCensus {
                groups: 1, // root
                meshes: 1,
                point_lights: 2,
                axes_helpers: 1,
                grid_helpers: 1,
            }
        );
    }

    #[test]
    fn plane_is_double_sided_and_flat_on_ground() {
        let graph = create_scene();
        let plane = graph.find_node_by_name("ground").unwrap();
        match &plane.kind {
            NodeKind::Mesh { material, .. } => {
                assert_eq!(material.side, crate::scene::primitive::Side::Double);
                assert_eq!(material.color, PLANE_COLOR);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        // local +Y (plane height axis) ends up along world Z
        let axis = plane.transform.rotation * Vec3::Y;
        assert!(axis.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn lights_are_fore_and_aft() {
        let mut graph = SceneGraph::new("t");
        add_lights(&mut graph);
        let fore = graph.find_node_by_name("light-fore").unwrap();
        let aft = graph.find_node_by_name("light-aft").unwrap();
        assert_eq!(fore.transform.position, Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(aft.transform.position, Vec3::new(0.0, 0.0, -100.0));
    }
}
