use crate::models::{build_models, ModelSet};
use crate::panel::DebugPanel;
use glam::Vec3;
use orbitscene_common::Color;
use orbitscene_input::ControlEvent;
use orbitscene_render::{OrbitControls, OutputSurface, PerspectiveCamera, RenderError};
use orbitscene_scene::{DirectionalLight, Scene, SceneError};

/// Dimensions of the host container the scene is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }
}

/// Errors that abort composer construction.
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("host container element is missing")]
    MissingContainer,
    #[error("rendering surface unavailable: {0}")]
    Surface(#[from] RenderError),
    #[error("scene construction failed: {0}")]
    Scene(#[from] SceneError),
}

/// Owns the scene, camera, controls and output surface for the life of the
/// process, and drives them from host callbacks.
pub struct Composer<S> {
    surface: S,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    models: ModelSet,
    debug_panel: DebugPanel,
    frame_count: u64,
    elapsed_seconds: f64,
}

impl<S: OutputSurface> Composer<S> {
    /// Build the surface, camera, light, controls and models, then size
    /// everything to the container.
    ///
    /// `make_surface` is called once with the container's viewport. A missing
    /// container or a surface that cannot be allocated is fatal.
    pub fn initialize<F>(container: Option<Viewport>, make_surface: F) -> Result<Self, ComposerError>
    where
        F: FnOnce(&Viewport) -> Result<S, RenderError>,
    {
        let viewport = container.ok_or(ComposerError::MissingContainer)?;
        let width = viewport.width.max(1);
        let height = viewport.height.max(1);

        let mut surface = make_surface(&viewport)?;
        surface.set_pixel_ratio(viewport.pixel_ratio);
        tracing::debug!(pixel_ratio = viewport.pixel_ratio, "surface allocated");

        let mut scene = Scene::new();

        let mut camera = PerspectiveCamera::new(75.0, width as f32 / height as f32, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 2.0, 5.0);

        scene.add_light(
            DirectionalLight::new(Color::from_hex(0xffffff), 1.0)
                .with_position(Vec3::new(-1.0, 2.0, 4.0)),
        );

        let controls = OrbitControls::new(&mut camera, width, height);
        let models = build_models(&mut scene)?;
        let debug_panel = DebugPanel::new();

        let mut composer = Self {
            surface,
            scene,
            camera,
            controls,
            models,
            debug_panel,
            frame_count: 0,
            elapsed_seconds: 0.0,
        };
        composer.resize(viewport.width, viewport.height);

        tracing::info!(
            width,
            height,
            nodes = composer.scene.node_count(),
            "scene composed"
        );
        Ok(composer)
    }

    /// Match camera aspect and surface size to the viewport. Zero dimensions
    /// are treated as 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        self.camera.aspect = width as f32 / height as f32;
        self.camera.update_projection_matrix();
        self.surface.set_size(width, height);
        self.controls.set_element_size(width, height);
        tracing::debug!(width, height, aspect = self.camera.aspect, "resized");
    }

    /// Advance the controls and draw one frame. `timestamp_ms` is the host's
    /// frame clock in milliseconds.
    pub fn frame(&mut self, timestamp_ms: f64) -> Result<(), RenderError> {
        self.elapsed_seconds = timestamp_ms * 0.001;
        self.controls.update(&mut self.camera);
        self.surface.render(&self.scene, &self.camera)?;
        self.frame_count += 1;
        Ok(())
    }

    /// Forward pointer input to the orbit controls.
    pub fn handle_input(&mut self, event: ControlEvent) {
        self.controls.handle_event(event, &self.camera);
    }

    /// Update the pixel ratio when the display's scale factor changes.
    /// The logical size is unchanged.
    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.surface.set_pixel_ratio(ratio);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn debug_panel(&self) -> &DebugPanel {
        &self.debug_panel
    }

    pub fn debug_panel_mut(&mut self) -> &mut DebugPanel {
        &mut self.debug_panel
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Host clock at the most recent frame, in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitscene_input::PointerButton;
    use orbitscene_render::HeadlessSurface;

    fn headless(width: u32, height: u32) -> Composer<HeadlessSurface> {
        Composer::initialize(Some(Viewport::new(width, height)), |v| {
            Ok(HeadlessSurface::new(v.width, v.height))
        })
        .unwrap()
    }

    #[test]
    fn initialize_sets_up_camera() {
        let c = headless(800, 600);
        let cam = c.camera();
        assert_eq!(cam.fov_degrees, 75.0);
        assert_eq!(cam.near, 0.1);
        assert_eq!(cam.far, 100.0);
        assert_eq!(cam.target, Vec3::ZERO);
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 2.0, 5.0), 1e-4));
    }

    #[test]
    fn initialize_adds_one_white_light() {
        let c = headless(800, 600);
        let lights = c.scene().lights();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].color, Color::WHITE);
        assert_eq!(lights[0].intensity, 1.0);
        assert_eq!(lights[0].position, Vec3::new(-1.0, 2.0, 4.0));
    }

    #[test]
    fn missing_container_is_fatal() {
        let result = Composer::initialize(None, |v: &Viewport| {
            Ok(HeadlessSurface::new(v.width, v.height))
        });
        assert!(matches!(result, Err(ComposerError::MissingContainer)));
    }

    #[test]
    fn surface_failure_is_fatal() {
        let result: Result<Composer<HeadlessSurface>, _> =
            Composer::initialize(Some(Viewport::new(10, 10)), |_| {
                Err(RenderError::SurfaceAllocation("no context".into()))
            });
        assert!(matches!(
            result,
            Err(ComposerError::Surface(RenderError::SurfaceAllocation(_)))
        ));
    }

    #[test]
    fn initialize_sizes_surface_once_after_pixel_ratio() {
        let c = Composer::initialize(
            Some(Viewport::new(1280, 720).with_pixel_ratio(2.0)),
            |v| {
                let mut s = HeadlessSurface::new(v.width, v.height);
                s.set_pixel_ratio(v.pixel_ratio);
                Ok(s)
            },
        )
        .unwrap();
        assert_eq!(c.surface().size_changes(), 1);
        assert_eq!(c.surface().size(), (1280, 720));
        assert_eq!(c.surface().physical_size(), (2560, 1440));
    }

    #[test]
    fn pixel_ratio_is_forwarded() {
        let c = Composer::initialize(
            Some(Viewport::new(640, 480).with_pixel_ratio(2.0)),
            |v| Ok(HeadlessSurface::new(v.width, v.height)),
        )
        .unwrap();
        assert_eq!(c.surface().pixel_ratio(), 2.0);
        assert_eq!(c.surface().physical_size(), (1280, 960));
    }

    #[test]
    fn resize_clamps_zero_height() {
        let mut c = headless(800, 600);
        c.resize(300, 0);
        assert_eq!(c.camera().aspect, 300.0);
        assert_eq!(c.surface().size(), (300, 1));
    }

    #[test]
    fn frame_converts_timestamp_and_submits() {
        let mut c = headless(800, 600);
        c.frame(1500.0).unwrap();
        c.frame(1516.0).unwrap();
        assert_eq!(c.frame_count(), 2);
        assert!((c.elapsed_seconds() - 1.516).abs() < 1e-9);
        assert_eq!(c.surface().frames(), 2);
        assert_eq!(c.surface().last_draw_count(), 12);
    }

    #[test]
    fn frame_propagates_surface_errors() {
        let mut c = headless(800, 600);
        c.surface_mut().set_fail_frames(true);
        assert!(c.frame(0.0).is_err());
        assert_eq!(c.frame_count(), 0);
    }

    #[test]
    fn input_moves_camera_on_next_frame() {
        let mut c = headless(800, 600);
        let before = c.camera().position;
        c.handle_input(ControlEvent::down(PointerButton::Primary, 0.0, 0.0));
        c.handle_input(ControlEvent::moved(100.0, 0.0));
        assert_eq!(c.camera().position, before);
        c.frame(16.0).unwrap();
        assert_ne!(c.camera().position, before);
    }

    #[test]
    fn set_pixel_ratio_keeps_logical_size() {
        let mut c = headless(800, 600);
        let sized = c.surface().size_changes();
        c.set_pixel_ratio(1.5);
        assert_eq!(c.surface().size_changes(), sized);
        assert_eq!(c.surface().size(), (800, 600));
        assert_eq!(c.surface().physical_size(), (1200, 900));
    }
}
