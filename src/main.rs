//! # pathtracer-cli
//!
//! A terminal front end for `pathtracer_core`'s non-blocking render
//! session: picks a scene (built-in preset or a TOML file), starts a
//! session, polls progress to a bar, then displays the final RGBA8
//! readback in the terminal.

mod renderer;

use anyhow::{Context, Result};
use clap::Parser;
use pathtracer_core::presets::ScenePreset;
use pathtracer_core::session::Session;
use pathtracer_core::CameraConfig;
use rand_core::SeedableRng;
use renderer::{display, OutputMode, Rgba8Image};
use std::time::{Duration, Instant};

/// pathtracer-cli: render scenes with a CPU/GPU path-tracing core
#[derive(Parser, Debug)]
#[command(
    name = "pathtracer-cli",
    version,
    about = "Renders a scene with the pathtracer-core session API and displays it in the terminal",
    after_help = "EXAMPLES:\n  \
                  pathtracer-cli --scene showcase --mode halfblock\n  \
                  pathtracer-cli --scene-file scene.toml --spp 64 --gpu\n  \
                  pathtracer-cli --scene stress --threads 8"
)]
struct Cli {
    /// Built-in scene preset to render (ignored if --scene-file is given)
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Showcase)]
    scene: ScenePreset,

    /// Load the scene from a TOML file instead of a built-in preset
    #[arg(long)]
    scene_file: Option<std::path::PathBuf>,

    /// Output image width in pixels (overrides the scene's own value)
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Output image height in pixels (overrides the scene's own value)
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Samples per pixel (overrides the scene's own value)
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum ray bounce depth (overrides the scene's own value)
    #[arg(long)]
    bounces: Option<u32>,

    /// Worker thread count for the CPU back end
    #[arg(short, long, default_value_t = 4)]
    threads: u32,

    /// PRNG base seed (determines the render deterministically)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Prefer the GPU compute back end, falling back to CPU if unavailable
    #[arg(long)]
    gpu: bool,

    /// Terminal output encoding mode
    #[arg(short, long, value_enum, default_value_t = OutputMode::HalfBlock)]
    mode: OutputMode,
}

fn load_scene(cli: &Cli) -> Result<(String, CameraConfig, Vec<pathtracer_core::Primitive>)> {
    if let Some(path) = &cli.scene_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file {}", path.display()))?;
        let (camera, primitives) = pathtracer_core::scene::load_toml(&text)
            .with_context(|| format!("failed to parse scene file {}", path.display()))?;
        Ok((path.display().to_string(), camera, primitives))
    } else {
        let mut seeder = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(cli.seed);
        let desc = cli.scene.build(&mut seeder);
        Ok((desc.name.to_string(), desc.camera_config, desc.primitives))
    }
}

fn print_header(scene_name: &str, config: &CameraConfig, backend: &str) {
    eprintln!();
    eprintln!("  pathtracer-cli");
    eprintln!("  Scene:      {scene_name}");
    eprintln!("  Resolution: {}x{}", config.image_width, config.image_height);
    eprintln!("  Samples:    {} spp", config.samples_per_pixel);
    eprintln!("  Bounces:    {}", config.max_depth);
    eprintln!("  Back end:   {backend}");
    eprintln!();
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (scene_name, mut config, primitives) = load_scene(&cli)?;
    if let Some(w) = cli.width {
        config.image_width = w;
    }
    if let Some(h) = cli.height {
        config.image_height = h;
    }
    if let Some(spp) = cli.spp {
        config.samples_per_pixel = spp;
    }
    if let Some(bounces) = cli.bounces {
        config.max_depth = bounces;
    }

    print_header(&scene_name, &config, if cli.gpu { "GPU (CPU fallback)" } else { "CPU" });

    let t0 = Instant::now();
    let mut session = Session::start(&config, primitives, cli.threads, cli.gpu, cli.seed)
        .context("failed to start render session")?;

    loop {
        let progress = session.progress();
        eprint!("\r  Rendering: {:5.1}%", progress * 100.0);
        if progress >= 1.0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    eprintln!();

    let mut pixels = vec![0u8; (config.image_width * config.image_height * 4) as usize];
    session.readback(&mut pixels);
    session.finish();

    let elapsed = t0.elapsed();
    let total_rays =
        config.image_width as u64 * config.image_height as u64 * config.samples_per_pixel as u64;
    eprintln!(
        "  Time: {:.2}s | {:.2}M samples | {:.2} Msamples/s",
        elapsed.as_secs_f64(),
        total_rays as f64 / 1e6,
        total_rays as f64 / elapsed.as_secs_f64() / 1e6
    );
    eprintln!();

    let image = Rgba8Image::new(config.image_width, config.image_height, &pixels);
    display(&image, cli.mode);
    Ok(())
}
