use crate::gpu::SceneRenderer;
use crate::overlay::{EguiOverlay, OverlayFrame};
use orbitscene_render::{physical_extent, OutputSurface, PerspectiveCamera, RenderError};
use orbitscene_scene::Scene;

/// Window-backed output surface.
///
/// Owns the wgpu device and swapchain. Sizes passed through
/// [`OutputSurface::set_size`] are logical; the swapchain is configured at
/// the physical size.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: SceneRenderer,
    overlay: EguiOverlay,
    pending_overlay: Option<OverlayFrame>,
    logical_size: (u32, u32),
    pixel_ratio: f64,
    backend: wgpu::Backend,
}

impl WgpuSurface {
    /// Create a device for `target` sized `width` x `height` logical pixels
    /// at `pixel_ratio` physical pixels each.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        pixel_ratio: f64,
    ) -> Result<Self, RenderError> {
        let logical_size = (width.max(1), height.max(1));
        let pixel_ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        let (physical_width, physical_height) = physical_extent(logical_size, pixel_ratio);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::SurfaceAllocation(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("orbitscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::Device(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::SurfaceAllocation("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: physical_width,
            height: physical_height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = SceneRenderer::new(&device, format, config.width, config.height);
        let overlay = EguiOverlay::new(&device, format);
        let backend = adapter.get_info().backend;
        tracing::info!(backend = backend.to_str(), ?format, "GPU initialized");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            overlay,
            pending_overlay: None,
            logical_size,
            pixel_ratio,
            backend,
        })
    }

    /// Paint `frame` over the scene on the next [`OutputSurface::render`].
    pub fn queue_overlay(&mut self, frame: OverlayFrame) {
        self.pending_overlay = Some(frame);
    }

    pub fn backend(&self) -> wgpu::Backend {
        self.backend
    }

    fn reconfigure(&mut self) {
        let (width, height) = self.physical_size();
        if (width, height) == (self.config.width, self.config.height) {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
        tracing::debug!(width, height, "swapchain reconfigured");
    }
}

impl OutputSurface for WgpuSurface {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = if ratio > 0.0 { ratio } else { 1.0 };
        self.reconfigure();
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.logical_size = (width.max(1), height.max(1));
        self.reconfigure();
    }

    fn size(&self) -> (u32, u32) {
        self.logical_size
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(RenderError::Submission(e.to_string())),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        self.renderer
            .render(&self.device, &self.queue, &mut encoder, &view, scene, camera);

        if let Some(frame) = self.pending_overlay.take() {
            self.overlay.paint(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                [self.config.width, self.config.height],
                frame,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
