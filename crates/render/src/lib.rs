//! Rendering adapter: renderer-agnostic camera, controls and output surface.
//!
//! # Invariants
//! - Surfaces never mutate the scene; they only read it and the camera.
//! - Camera aspect ratio is owned by whoever resizes the surface.
//! - Orbit controls only move the camera inside `update`.
//!
//! The `OutputSurface` trait is the seam between the frame driver and a
//! concrete backend. `HeadlessSurface` implements it without a GPU for tests
//! and tooling; the wgpu backend lives in its own crate.

mod camera;
mod controls;
mod renderer;
mod surface;

pub use camera::PerspectiveCamera;
pub use controls::{OrbitControls, Spherical};
pub use renderer::{DebugTextRenderer, Renderer};
pub use surface::{physical_extent, HeadlessSurface, OutputSurface, RenderError};
