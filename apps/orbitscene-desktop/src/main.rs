use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use orbitscene_composer::{Composer, Viewport};
use orbitscene_input::{ControlEvent, PointerButton};
use orbitscene_render::RenderError;
use orbitscene_render_wgpu::{OverlayFrame, WgpuSurface};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixels per wheel "line", matching what browsers report for one notch.
const LINE_HEIGHT: f32 = 100.0;

#[derive(Parser)]
#[command(name = "orbitscene-desktop", about = "Orbit around a small lit scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Enable inertial damping on the orbit controls
    #[arg(long)]
    damping: bool,
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

fn wheel_delta_y(delta: MouseScrollDelta) -> f32 {
    // winit reports scrolling up as positive; the controls expect DOM sign.
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(p) => -p.y as f32,
    }
}

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    composer: Option<Composer<WgpuSurface>>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    cursor: PhysicalPosition<f64>,
    start: Instant,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            composer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            cursor: PhysicalPosition::new(0.0, 0.0),
            start: Instant::now(),
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, |w| w.scale_factor())
    }

    fn logical_cursor(&self) -> (f32, f32) {
        let scale = self.scale_factor();
        (
            (self.cursor.x / scale) as f32,
            (self.cursor.y / scale) as f32,
        )
    }

    fn send(&mut self, event: ControlEvent) {
        if let Some(composer) = &mut self.composer {
            composer.handle_input(event);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(egui_winit), Some(composer)) =
            (&self.window, &mut self.egui_winit, &mut self.composer)
        else {
            return;
        };

        let raw_input = egui_winit.take_egui_input(window);
        let mut full_output = self.egui_ctx.run(raw_input, |ctx| {
            composer.debug_panel_mut().show(ctx);
        });
        let platform_output = std::mem::take(&mut full_output.platform_output);
        egui_winit.handle_platform_output(window, platform_output);
        let overlay = OverlayFrame::from_output(&self.egui_ctx, full_output);
        composer.surface_mut().queue_overlay(overlay);

        let timestamp_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        match composer.frame(timestamp_ms) {
            Ok(()) => window.request_redraw(),
            Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("frame failed")),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("orbitscene")
            .with_inner_size(LogicalSize::new(self.cli.width, self.cli.height));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Some(Arc::new(window)),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                None
            }
        };

        let container = window.as_ref().map(|w| {
            let scale = w.scale_factor();
            let logical: LogicalSize<u32> = w.inner_size().to_logical(scale);
            Viewport::new(logical.width, logical.height).with_pixel_ratio(scale)
        });

        let result = Composer::initialize(container, |viewport| match &window {
            Some(w) => WgpuSurface::new(
                w.clone(),
                viewport.width,
                viewport.height,
                viewport.pixel_ratio,
            ),
            None => Err(RenderError::SurfaceAllocation("no window".into())),
        });

        let mut composer = match result {
            Ok(composer) => composer,
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("initialize failed"));
                return;
            }
        };
        composer.controls_mut().enable_damping = self.cli.damping;

        let Some(window) = window else {
            return;
        };
        self.egui_winit = Some(egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        ));
        tracing::info!(
            backend = composer.surface().backend().to_str(),
            damping = self.cli.damping,
            "window ready"
        );
        self.composer = Some(composer);
        self.start = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(egui_winit)) = (&self.window, &mut self.egui_winit) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let scale = self.scale_factor();
                let logical: LogicalSize<u32> = size.to_logical(scale);
                if let Some(composer) = &mut self.composer {
                    composer.resize(logical.width, logical.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(composer) = &mut self.composer {
                    composer.set_pixel_ratio(scale_factor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                let (x, y) = self.logical_cursor();
                self.send(ControlEvent::moved(x, y));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = pointer_button(button) else {
                    return;
                };
                let event = match state {
                    ElementState::Pressed => {
                        let (x, y) = self.logical_cursor();
                        ControlEvent::down(button, x, y)
                    }
                    ElementState::Released => ControlEvent::PointerUp { button },
                };
                self.send(event);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.send(ControlEvent::Wheel {
                    delta_y: wheel_delta_y(delta),
                });
            }
            WindowEvent::Focused(false) | WindowEvent::CursorLeft { .. } => {
                self.send(ControlEvent::Cancel);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::F1),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if let Some(composer) = &mut self.composer {
                    composer.debug_panel_mut().toggle();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("orbitscene-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(cli);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
