//! wgpu output surface for orbitscene.
//!
//! Draws Phong-lit meshes and unlit helper lines with a depth buffer, then
//! paints an optional egui overlay on top.
//!
//! # Invariants
//! - Rendering never mutates the scene.
//! - Geometry is tessellated and uploaded once per handle.
//! - Swapchain size is always logical size times pixel ratio, at least 1x1.

mod gpu;
mod overlay;
mod shaders;
mod surface;

pub use gpu::SceneRenderer;
pub use overlay::{EguiOverlay, OverlayFrame};
pub use surface::WgpuSurface;
