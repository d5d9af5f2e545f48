//! Pick markers, kept apart from the main scene graph.
//!
//! Every pick spawns one marker per intersection. Markers are held in their
//! own ordered layer so they can be cleared or capped without touching the
//! append-only scene.

use crate::scene::graph::Node;
use crate::scene::primitive::{Color, Geometry, Material};
use glam::Vec3;
use std::collections::VecDeque;

/// Stable identifier of a marker within its layer.
pub type MarkerId = u64;

pub const MARKER_COLOR: Color = Color(0x0000ff);

/// Round `value` to the nearest multiple of `snap`. A snap that is not a
/// positive finite number leaves `value` untouched.
pub fn snap_to_grid(value: f32, snap: f32) -> f32 {
    if !(snap > 0.0 && snap.is_finite()) {
        return value;
    }
    (value / snap).round() * snap
}

/// Marker placement for a hit point: x and z snapped, fixed height.
pub fn marker_position(hit: Vec3, snap: f32, height: f32) -> Vec3 {
    Vec3::new(snap_to_grid(hit.x, snap), height, snap_to_grid(hit.z, snap))
}

/// The wireframe cuboid used as a marker, sized from the snap pitch.
pub fn marker_node(id: MarkerId, position: Vec3, snap: f32) -> Node {
    Node::mesh(
        format!("marker-{}", id),
        Geometry::Cuboid {
            width: snap / 1.2,
            height: snap / 2.0,
            depth: snap / 2.0,
        },
        Material::flat(MARKER_COLOR).double_sided().wireframe(),
    )
    .with_position(position)
}

#[derive(Debug, Clone)]
pub struct MarkerLayer {
    markers: VecDeque<(MarkerId, Node)>,
    limit: Option<usize>,
    next_id: MarkerId,
    evicted: u64,
}

impl MarkerLayer {
    /// `Some(0)` is treated like `None`: the layer is unbounded.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            markers: VecDeque::new(),
            limit: limit.filter(|limit| *limit > 0),
            next_id: 1,
            evicted: 0,
        }
    }

    /// Spawn a marker for `hit`. When the layer is at its limit the oldest
    /// marker is dropped first.
    pub fn spawn(&mut self, hit: Vec3, snap: f32, height: f32) -> MarkerId {
        let id = self.next_id;
        self.next_id += 1;

        if let Some(limit) = self.limit {
            while self.markers.len() >= limit {
                self.markers.pop_front();
                self.evicted += 1;
            }
        }
        self.markers.push_back((id, marker_node(id, marker_position(hit, snap, height), snap)));
        id
    }

    pub fn remove(&mut self, id: MarkerId) -> Option<Node> {
        let index = self.markers.iter().position(|(marker_id, _)| *marker_id == id)?;
        self.markers.remove(index).map(|(_, node)| node)
    }

    /// Remove every marker; returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.markers.len();
        self.markers.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Markers dropped so far because of the limit.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Markers oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.markers.iter().map(|(_, node)| node)
    }

    pub fn get(&self, id: MarkerId) -> Option<&Node> {
        self.markers.iter().find(|(marker_id, _)| *marker_id == id).map(|(_, node)| node)
    }
}

impl Default for MarkerLayer {
    fn default() -> Self {
        Self::new(None)
    }
}
