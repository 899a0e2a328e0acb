use anyhow::Context as _;
use clap::{Parser, Subcommand};
use haunted_assets::{HouseTextures, TextureStore};
use haunted_render::{
    CancelToken, DebugTextRenderer, FrameLoop, ManualScheduler, OrbitControls, PerspectiveCamera,
    Viewport,
};
use haunted_scene::{ScatterParams, Scene, SceneConfig, build_haunted_house, scatter};
use haunted_tools::SceneInspector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "haunted-cli", about = "CLI tool for the haunted house scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the default scene config as YAML
    Config,
    /// Scatter graves and print their placements
    Graves {
        /// Number of graves
        #[arg(short, long)]
        count: Option<usize>,
        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Build the full scene and print it with the text renderer
    Scene {
        /// RNG seed for the grave scatter
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Directory containing textures/, overrides the config
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Frames to run before printing
        #[arg(short, long, default_value = "1")]
        frames: u64,
    },
    /// Show how a window size maps to camera aspect and drawing buffer
    Viewport {
        #[arg(long, default_value = "1280")]
        width: u32,
        #[arg(long, default_value = "720")]
        height: u32,
        /// Device pixel ratio reported by the window system
        #[arg(long, default_value = "1.0")]
        dpr: f64,
    },
}

#[derive(Serialize)]
struct GraveRecord {
    index: usize,
    angle: f32,
    radius: f32,
    position: [f32; 3],
    rotation_y: f32,
    rotation_z: f32,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("haunted-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", haunted_assets::crate_info());
            println!("render: {}", haunted_render::crate_info());
            println!(
                "graves: {} in ring {}..{}",
                config.graves.count,
                config.graves.inner_radius,
                config.graves.inner_radius + config.graves.ring_width
            );
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Graves { count, seed, json } => {
            let count = count.unwrap_or(config.graves.count);
            let params = ScatterParams::from(&config.graves);
            let placements = scatter(count, &params, &mut StdRng::seed_from_u64(seed));
            let records: Vec<GraveRecord> = placements
                .iter()
                .enumerate()
                .map(|(index, p)| GraveRecord {
                    index,
                    angle: p.angle,
                    radius: p.radius,
                    position: p.position.to_array(),
                    rotation_y: p.rotation_y,
                    rotation_z: p.rotation_z,
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("Graves: seed={seed}, count={count}");
                for r in &records {
                    println!(
                        "  #{:<3} r={:.2} pos=({:.2}, {:.2}, {:.2}) rotY={:+.3} rotZ={:+.3}",
                        r.index,
                        r.radius,
                        r.position[0],
                        r.position[1],
                        r.position[2],
                        r.rotation_y,
                        r.rotation_z
                    );
                }
            }
        }
        Commands::Scene {
            seed,
            assets,
            frames,
        } => {
            let mut config = config;
            if let Some(assets) = assets {
                config.assets_root = assets;
            }
            let mut store = TextureStore::new();
            let textures = HouseTextures::load(&mut store, &config.assets_root)?;
            let mut scene = Scene::new();
            build_haunted_house(
                &mut scene,
                &textures,
                &config,
                &mut StdRng::seed_from_u64(seed),
            )?;
            if store.placeholder_count() > 0 {
                tracing::warn!(
                    "{} of {} textures are placeholders",
                    store.placeholder_count(),
                    store.len()
                );
            }

            let viewport = Viewport::new(1280, 720, 1.0);
            let mut camera =
                PerspectiveCamera::from_config(&config.camera, viewport.size().aspect());
            let mut controls = OrbitControls::new(config.camera.damping_factor);
            let mut renderer = DebugTextRenderer::new();
            let mut frame_loop = FrameLoop::new(ManualScheduler::new(), CancelToken::new());
            frame_loop.start();

            let mut output = None;
            for _ in 0..frames.max(1) {
                if !frame_loop.scheduler_mut().take_pending() {
                    break;
                }
                output = frame_loop.step(&mut controls, &mut camera, &mut renderer, &scene);
            }
            if let Some(text) = output {
                print!("{text}");
            }
            println!("{}", SceneInspector::summary(&scene));
        }
        Commands::Viewport { width, height, dpr } => {
            let mut camera = PerspectiveCamera::from_config(&config.camera, 1.0);
            let mut viewport = Viewport::new(1, 1, 1.0);
            let outcome = viewport.resize(width, height, dpr, &mut camera);
            let (bw, bh) = outcome.size.drawing_buffer();
            println!(
                "Viewport: {}x{} dpr={} (effective {})",
                outcome.size.width, outcome.size.height, dpr, outcome.size.pixel_ratio
            );
            println!("Camera aspect: {:.4}", camera.aspect);
            println!("Drawing buffer: {bw}x{bh}");
        }
    }

    Ok(())
}
