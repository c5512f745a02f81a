//! Scene composer and frame driver.
//!
//! Builds the demo scene once, then reacts to two host callbacks: `frame`
//! once per display refresh and `resize` whenever the viewport changes.
//!
//! # Invariants
//! - After every resize, camera aspect equals viewport width / height.
//! - The scene graph is built once and never torn down.
//! - Frame and resize run on the host's single callback thread.

mod composer;
mod models;
mod panel;

pub use composer::{Composer, ComposerError, Viewport};
pub use models::{build_models, ModelSet, RING_COUNT, RING_RADIUS};
pub use panel::{DebugPanel, PanelParam};
