use crate::camera::PerspectiveCamera;
use orbitscene_scene::Scene;

/// Errors reported by an output surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to allocate rendering surface: {0}")]
    SurfaceAllocation(String),
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("failed to create graphics device: {0}")]
    Device(String),
    #[error("frame submission failed: {0}")]
    Submission(String),
}

/// The drawing surface a frame driver renders into.
///
/// Sizes are in logical pixels; the backend multiplies by the pixel ratio
/// to obtain its physical resolution.
pub trait OutputSurface {
    fn set_pixel_ratio(&mut self, ratio: f64);

    fn pixel_ratio(&self) -> f64;

    fn set_size(&mut self, width: u32, height: u32);

    /// Current logical size.
    fn size(&self) -> (u32, u32);

    /// Draw `scene` as seen from `camera` and present it.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;

    /// Logical size scaled by the pixel ratio, at least 1x1.
    fn physical_size(&self) -> (u32, u32) {
        physical_extent(self.size(), self.pixel_ratio())
    }
}

/// Scale a logical size by `ratio`, rounding to whole pixels, at least 1x1.
pub fn physical_extent((width, height): (u32, u32), ratio: f64) -> (u32, u32) {
    (
        ((width as f64 * ratio).round() as u32).max(1),
        ((height as f64 * ratio).round() as u32).max(1),
    )
}

/// Surface that draws nothing and records what it was asked to do.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    pixel_ratio: f64,
    frames: u64,
    last_draw_count: usize,
    fail_frames: bool,
    size_changes: u64,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(300, 150)
    }
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            frames: 0,
            last_draw_count: 0,
            fail_frames: false,
            size_changes: 0,
        }
    }

    /// Number of frames successfully submitted.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Meshes and line sets drawn in the last frame.
    pub fn last_draw_count(&self) -> usize {
        self.last_draw_count
    }

    /// Number of `set_size` calls received.
    pub fn size_changes(&self) -> u64 {
        self.size_changes
    }

    /// Make subsequent `render` calls fail, as a lost device would.
    pub fn set_fail_frames(&mut self, fail: bool) {
        self.fail_frames = fail;
    }
}

impl OutputSurface for HeadlessSurface {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.size_changes += 1;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&mut self, scene: &Scene, _camera: &PerspectiveCamera) -> Result<(), RenderError> {
        if self.fail_frames {
            return Err(RenderError::Submission("headless surface set to fail".into()));
        }
        self.last_draw_count = scene.drawables().len();
        self.frames += 1;
        tracing::trace!(frame = self.frames, draws = self.last_draw_count, "headless frame");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitscene_scene::{Geometry, Material};

    #[test]
    fn headless_records_size_and_ratio() {
        let mut s = HeadlessSurface::default();
        s.set_pixel_ratio(2.0);
        s.set_size(400, 300);
        assert_eq!(s.size(), (400, 300));
        assert_eq!(s.physical_size(), (800, 600));
    }

    #[test]
    fn physical_extent_rounds_logical_size() {
        assert_eq!(physical_extent((1280, 720), 2.0), (2560, 1440));
        assert_eq!(physical_extent((333, 100), 1.5), (500, 150));
        assert_eq!(physical_extent((0, 10), 1.0), (1, 10));
    }

    #[test]
    fn physical_size_never_zero() {
        let mut s = HeadlessSurface::new(0, 0);
        s.set_pixel_ratio(1.5);
        assert_eq!(s.physical_size(), (1, 1));
    }

    #[test]
    fn headless_counts_frames_and_draws() {
        let mut scene = Scene::new();
        let g = scene.add_geometry(Geometry::plane(1.0, 1.0));
        let m = scene.add_material(Material::phong());
        let mesh = scene.create_mesh(g, m).unwrap();
        scene.add(mesh).unwrap();

        let camera = PerspectiveCamera::default();
        let mut s = HeadlessSurface::default();
        s.render(&scene, &camera).unwrap();
        s.render(&scene, &camera).unwrap();
        assert_eq!(s.frames(), 2);
        assert_eq!(s.last_draw_count(), 1);
    }

    #[test]
    fn headless_can_fail() {
        let mut s = HeadlessSurface::default();
        s.set_fail_frames(true);
        let err = s
            .render(&Scene::new(), &PerspectiveCamera::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::Submission(_)));
        assert_eq!(s.frames(), 0);
    }
}
