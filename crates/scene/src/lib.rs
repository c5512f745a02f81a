//! Scene graph: transform nodes, pivots, meshes, and the lights that shade them.
//!
//! # Invariants
//! - Nodes are never removed; handles stay valid for the life of the scene.
//! - A child's world matrix is its parent's world matrix times its local matrix.
//! - Geometry and materials are shared by handle, so several meshes may draw
//!   the same geometry with the same material.
//! - Lights live beside the node tree and do not count as root children.

pub mod geometry;
pub mod light;
pub mod material;
pub mod scene;

pub use geometry::{Geometry, MeshData, SphereGeometry, Topology, TorusGeometry};
pub use light::DirectionalLight;
pub use material::Material;
pub use scene::{Drawable, GeometryHandle, MaterialHandle, Node, NodeId, NodeKind, Scene, SceneError};
