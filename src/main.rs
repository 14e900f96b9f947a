// graphmesh viewer main.rs

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use graphmesh::config::{StrategyKind, ViewerConfig};
use graphmesh::controller::{ControlFlow as Flow, Controller};
use graphmesh::demo;
use graphmesh::diagnostics::SystemDiagnostics;
use graphmesh::graph::Shading;
use graphmesh::renderer::Renderer;

#[derive(Parser, Debug)]
#[command(name = "graphmesh", version, about = "Procedural surface mesh viewer")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lattice cells per side for the graphs
    #[arg(short, long)]
    resolution: Option<u32>,

    /// Show a single graph built with this strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Show a single graph with this shading
    #[arg(long, value_enum)]
    shading: Option<Shading>,

    /// Log filter, e.g. "debug" or "graphmesh=trace"
    #[arg(long)]
    log: Option<String>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path).context("failed to load viewer config")?,
            None => ViewerConfig::default(),
        };

        if let Some(resolution) = self.resolution {
            config.graph.resolution = resolution;
        }
        // picking either one means the user wants that graph, not the grid of four
        if let Some(strategy) = self.strategy {
            config.graph.strategy = strategy;
            config.graph.compare = false;
        }
        if let Some(shading) = self.shading {
            config.graph.shading = shading;
            config.graph.compare = false;
        }
        Ok(config)
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    let config = cli.load_config()?;
    SystemDiagnostics::log_startup_info();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(config.window.title.as_str())
        .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
        .build(&event_loop)?;

    let mut renderer = pollster::block_on(Renderer::new(&window, config.window.vsync))
        .context("failed to initialise renderer")?;
    let mut scene = Some(demo::build_scene(&mut renderer.uploader(), &config)?);
    let mut controller = Controller::new();

    event_loop.run(move |event, target| match event {
        Event::WindowEvent { event, window_id } if window_id == renderer.window.id() => {
            match controller.process_events(&event) {
                Flow::Exit => {
                    target.exit();
                    return;
                }
                Flow::Redraw => renderer.window.request_redraw(),
                Flow::Ignored => {}
            }

            match event {
                WindowEvent::CloseRequested => target.exit(),
                WindowEvent::Resized(size) => renderer.resize(size.width, size.height),
                WindowEvent::RedrawRequested => {
                    if let Some(scene) = &scene {
                        if let Err(e) = renderer.render(scene, &controller) {
                            error!(error = %e, "render failed");
                            target.exit();
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => renderer.window.request_redraw(),
        Event::LoopExiting => {
            if let Some(scene) = scene.take() {
                info!(models = scene.len(), "releasing scene");
                scene.destroy();
            }
        }
        _ => {}
    })?;

    Ok(())
}
