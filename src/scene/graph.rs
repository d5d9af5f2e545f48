//! Scene graph and node definitions for the `diorama` library.
//!
//! Node stores children as `Vec<Box<Node>>` to avoid recursive-size issues.
//! The main graph is append-only: nodes are added while building the scene
//! and when a model fragment finishes loading, never removed.

use std::fmt;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::primitive::{Color, Geometry, Material};

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What a node is. Only meshes and grid helpers have a surface a ray can hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Group,
    Mesh { geometry: Geometry, material: Material },
    PointLight { color: Color, intensity: f32, distance: f32 },
    AxesHelper { size: f32 },
    GridHelper { size: f32, divisions: u32, color: Color },
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Mesh { .. } => "mesh",
            NodeKind::PointLight { .. } => "point_light",
            NodeKind::AxesHelper { .. } => "axes_helper",
            NodeKind::GridHelper { .. } => "grid_helper",
        }
    }

    /// Local-space line segments of helper kinds: grid lines along X then
    /// along Z, or the X, Y and Z axes in that order. Empty for other kinds.
    pub fn line_segments(&self) -> Vec<(Vec3, Vec3)> {
        match *self {
            NodeKind::GridHelper { size, divisions, .. } => {
                let half = size / 2.0;
                let divisions = divisions.max(1);
                let step = size / divisions as f32;
                let offsets = (0..=divisions).map(|i| -half + step * i as f32);
                offsets
                    .clone()
                    .map(|z| (Vec3::new(-half, 0.0, z), Vec3::new(half, 0.0, z)))
                    .chain(offsets.map(|x| (Vec3::new(x, 0.0, -half), Vec3::new(x, 0.0, half))))
                    .collect()
            }
            NodeKind::AxesHelper { size } => vec![
                (Vec3::ZERO, Vec3::X * size),
                (Vec3::ZERO, Vec3::Y * size),
                (Vec3::ZERO, Vec3::Z * size),
            ],
            _ => Vec::new(),
        }
    }
}

/// A node in the scene graph.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub children: Vec<Box<Node>>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::IDENTITY,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(Box::new(child));
    }

    /// Pre-order traversal (immutable)
    pub fn traverse<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    /// Pre-order traversal carrying the accumulated world matrix.
    pub fn traverse_world<F: FnMut(&Node, Mat4)>(&self, parent: Mat4, f: &mut F) {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.traverse_world(world, f);
        }
    }

    /// Find first node by name (immutable).
    pub fn find_by_name(&self, target: &str) -> Option<&Node> {
        if self.name == target {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_name(target))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }

    /// Encode this subtree as a bincode snapshot.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
    }

    /// Decode a subtree previously written by [`Node::to_snapshot`].
    pub fn from_snapshot(bytes: &[u8]) -> Result<Node, bincode::error::DecodeError> {
        let (node, _read) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(node)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep debug concise: name, kind and counts
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("children_count", &self.children.len())
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(\"{}\", {}, children={})", self.name, self.kind.label(), self.children.len())
    }
}

/// Child-index path from the root to a node. The root itself is `[]`.
pub type NodePath = Vec<usize>;

/// A flattened entry of the graph as seen by the picker.
#[derive(Debug, Clone)]
pub struct PickCandidate {
    pub path: NodePath,
    pub name: String,
    pub kind: NodeKind,
    pub world: Mat4,
}

/// A scene graph root container.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub name: String,
    root: Node,
    // Flattened pre-order view of every non-root node; None once the graph changed.
    pick_cache: Option<Vec<PickCandidate>>,
    revision: u64,
}

impl SceneGraph {
    /// Create a new scene graph with a root node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: Node::group("root"),
            pick_cache: None,
            revision: 0,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append a node (and its subtree) under the root.
    pub fn add_node_to_root(&mut self, node: Node) -> NodePath {
        self.root.add_child(node);
        self.pick_cache = None;
        self.revision += 1;
        vec![self.root.children.len() - 1]
    }

    /// Traverse the scene graph, calling `f` for each node (pre-order).
    pub fn traverse<F: FnMut(&Node)>(&self, mut f: F) {
        self.root.traverse(&mut f);
    }

    /// Traverse with world matrices, root included.
    pub fn traverse_world<F: FnMut(&Node, Mat4)>(&self, mut f: F) {
        self.root.traverse_world(Mat4::IDENTITY, &mut f);
    }

    /// Find a node by name (first match, pre-order).
    pub fn find_node_by_name(&self, name: &str) -> Option<&Node> {
        self.root.find_by_name(name)
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let mut node = &self.root;
        for &index in path {
            node = &**node.children.get(index)?;
        }
        Some(node)
    }

    /// Total node count, root included.
    pub fn len(&self) -> usize {
        self.root.subtree_len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Every node below the root in pre-order, with world matrices.
    ///
    /// The list is cached and only rebuilt after the graph has been mutated.
    pub fn pick_candidates(&mut self) -> &[PickCandidate] {
        if self.pick_cache.is_none() {
            let mut candidates = Vec::with_capacity(self.len());
            collect_candidates(&self.root, Mat4::IDENTITY, &mut Vec::new(), &mut candidates);
            tracing::trace!(count = candidates.len(), "rebuilt pick candidate list");
            self.pick_cache = Some(candidates);
        }
        self.pick_cache.as_deref().unwrap_or(&[])
    }
}

fn collect_candidates(parent: &Node, parent_world: Mat4, path: &mut NodePath, out: &mut Vec<PickCandidate>) {
    for (index, child) in parent.children.iter().enumerate() {
        let world = parent_world * child.transform.matrix();
        path.push(index);
        out.push(PickCandidate {
            path: path.clone(),
            name: child.name.clone(),
            kind: child.kind.clone(),
            world,
        });
        collect_candidates(child, world, path, out);
        path.pop();
    }
}
