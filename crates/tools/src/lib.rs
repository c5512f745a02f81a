//! Developer tooling: read-only inspection of a composed scene.
//!
//! # Invariants
//! - Tools never mutate the scene.

mod inspector;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
