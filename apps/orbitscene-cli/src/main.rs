use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orbitscene_composer::{Composer, Viewport};
use orbitscene_render::{DebugTextRenderer, HeadlessSurface, OutputSurface, Renderer};
use orbitscene_tools::{NodeInfo, SceneInspector, SceneSummary};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser)]
#[command(name = "orbitscene-cli", about = "Headless tools for the orbitscene demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the fixed camera and light setup
    Info,
    /// Compose the scene and print its node tree
    Inspect {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Print only the node with this name
        #[arg(long)]
        node: Option<String>,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
    },
    /// Drive frames against a headless surface
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
        /// Resize halfway through, e.g. 400x400
        #[arg(long, value_parser = parse_size)]
        resize: Option<(u32, u32)>,
    },
}

#[derive(Serialize)]
struct InspectReport {
    summary: SceneSummary,
    nodes: Vec<NodeInfo>,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn compose(width: u32, height: u32) -> Result<Composer<HeadlessSurface>> {
    Composer::initialize(Some(Viewport::new(width, height)), |v| {
        Ok(HeadlessSurface::new(v.width, v.height))
    })
    .context("composing scene")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let composer = compose(800, 600)?;
            let camera = composer.camera();
            println!("orbitscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "camera: fov={} near={} far={} position=({}, {}, {})",
                camera.fov_degrees,
                camera.near,
                camera.far,
                camera.position.x,
                camera.position.y,
                camera.position.z
            );
            for light in composer.scene().lights() {
                println!(
                    "light: directional intensity={} position=({}, {}, {})",
                    light.intensity, light.position.x, light.position.y, light.position.z
                );
            }
            println!("{}", SceneInspector::summary(composer.scene()));
        }
        Commands::Inspect {
            json,
            node,
            width,
            height,
        } => {
            let composer = compose(width, height)?;
            let scene = composer.scene();
            if let Some(name) = node {
                let info = SceneInspector::inspect_named(scene, &name)
                    .with_context(|| format!("no node named `{name}`"))?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    println!("{info}");
                }
            } else if json {
                let report = InspectReport {
                    summary: SceneInspector::summary(scene),
                    nodes: SceneInspector::list_nodes(scene),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", DebugTextRenderer.render(scene, composer.camera()));
                println!();
                for node in SceneInspector::list_nodes(scene) {
                    println!("{node}");
                }
            }
        }
        Commands::Simulate {
            frames,
            width,
            height,
            resize,
        } => {
            let mut composer = compose(width, height)?;
            let mut t = 0.0;
            for i in 0..frames {
                if i == frames / 2 {
                    if let Some((w, h)) = resize {
                        composer.resize(w, h);
                    }
                }
                composer
                    .frame(t)
                    .with_context(|| format!("frame {i} failed"))?;
                t += FRAME_MS;
            }
            let surface = composer.surface();
            let (w, h) = surface.size();
            println!(
                "frames={} elapsed={:.3}s size={}x{} aspect={:.4} draws_per_frame={}",
                composer.frame_count(),
                composer.elapsed_seconds(),
                w,
                h,
                composer.camera().aspect,
                surface.last_draw_count()
            );
        }
    }

    Ok(())
}
