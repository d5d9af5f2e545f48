//! diorama::scene - scene graph, primitives and the stock scene builder
//!
//! Public submodules:
//! - graph (SceneGraph, Node, Transform)
//! - primitive (Geometry, Material, Color)
//! - builder (create_scene, add_lights, build_scene)

pub mod builder;
pub mod graph;
pub mod primitive;
