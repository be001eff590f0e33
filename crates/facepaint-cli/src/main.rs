use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facepaint_core::filters::lookup;
use facepaint_core::{
    render_frame, Canvas, Filter, FilterId, FrameTime, LandmarkProvider, LandmarkSet,
    ReplayProvider, StaticProvider,
};
use facepaint_hw::{Camera, FacingMode, StillSource, V4lSource, VideoSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod config;
mod console;
mod engine;
mod session;

use config::Config;
use console::{ConsoleCommand, HELP};
use engine::{spawn_engine, EngineError, EngineHandle, EngineOptions};
use session::Session;

#[derive(Parser)]
#[command(name = "facepaint", about = "Live face filters for V4L2 webcams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List filter identifiers
    Filters {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render one filter onto a still image
    Render {
        /// Input image
        #[arg(short, long)]
        image: PathBuf,
        /// Landmark JSON (defaults to a frontal template face)
        #[arg(short, long)]
        landmarks: Option<PathBuf>,
        /// Filter identifier, e.g. "crown"
        #[arg(short, long)]
        filter: String,
        /// Output PNG
        #[arg(short, long)]
        out: PathBuf,
        /// Animation time in milliseconds
        #[arg(long, default_value_t = 0.0)]
        time_ms: f64,
        /// Seed for randomised filters
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a live session; commands are read from stdin
    Live {
        /// Initial filter (defaults to the configured one)
        #[arg(short, long)]
        filter: Option<String>,
        /// Which camera to start with
        #[arg(long, default_value_t = FacingMode::User)]
        facing: FacingMode,
        /// Landmark recording to replay (JSON or JSON lines)
        #[arg(short, long)]
        landmarks: Option<PathBuf>,
        /// Write the filtered canvas here about once a second
        #[arg(long)]
        preview: Option<PathBuf>,
        /// Use a still image instead of a camera
        #[arg(long)]
        still: Option<PathBuf>,
    },
    /// List V4L2 capture devices
    Devices,
    /// Run camera diagnostics
    Test {
        /// Which camera to open
        #[arg(long, default_value_t = FacingMode::User)]
        facing: FacingMode,
        /// Frames to grab
        #[arg(long, default_value_t = 5)]
        frames: usize,
    },
}

#[derive(Serialize)]
struct FilterListing {
    id: &'static str,
    label: &'static str,
    animated: bool,
    random: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Filters { json } => list_filters(json)?,
        Commands::Render {
            image,
            landmarks,
            filter,
            out,
            time_ms,
            seed,
        } => {
            let config = Config::load()?;
            let frame = image::open(&image)
                .with_context(|| format!("failed to open {}", image.display()))?
                .to_rgba8();
            let landmarks = match landmarks {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    LandmarkSet::from_json(&text)?
                }
                None => Some(LandmarkSet::neutral()),
            };

            let mut canvas = Canvas::new(frame.width(), frame.height())?;
            let mut rng = StdRng::seed_from_u64(seed.or(config.seed).unwrap_or(0));
            let filter = FilterId::new(filter);
            let outcome = render_frame(
                &mut canvas,
                &frame,
                landmarks.as_ref(),
                &filter,
                FrameTime::from_millis(time_ms),
                &mut rng,
            )?;
            canvas
                .snapshot()
                .save(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;

            match (outcome.face_present, outcome.drawn) {
                (false, _) => println!("No face in landmarks; wrote unfiltered {}", out.display()),
                (true, None) => println!("No filter applied; wrote {}", out.display()),
                (true, Some(drawn)) => println!("Applied {}; wrote {}", drawn.label(), out.display()),
            }
        }
        Commands::Live {
            filter,
            facing,
            landmarks,
            preview,
            still,
        } => {
            let config = Config::load()?;
            let source: Box<dyn VideoSource> = match still {
                Some(path) => Box::new(StillSource::open(&path)?),
                None => Box::new(V4lSource::new(
                    &config.user_device,
                    &config.environment_device,
                    config.width,
                    config.height,
                )),
            };
            let provider: Box<dyn LandmarkProvider> = match landmarks {
                Some(path) => Box::new(ReplayProvider::from_path(&path)?),
                None => Box::new(StaticProvider::default()),
            };

            let mut session = Session::new(
                source,
                Canvas::new(config.width, config.height)?,
                facing,
                config.seed,
            );
            session.set_filter(filter.map(FilterId::new).unwrap_or_else(|| config.default_filter.clone()));

            let handle = spawn_engine(
                session,
                provider,
                EngineOptions {
                    frame_interval: config.frame_interval(),
                    photo_dir: config.photo_dir.clone(),
                    preview,
                },
            )?;
            tracing::info!("facepaint live session ready");
            run_console(&handle).await?;
        }
        Commands::Devices => {
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("No V4L2 capture devices found");
            }
            for device in devices {
                println!("{}  {} ({}, {})", device.path, device.name, device.driver, device.bus);
            }
        }
        Commands::Test { facing, frames } => {
            let config = Config::load()?;
            let mut source = V4lSource::new(
                &config.user_device,
                &config.environment_device,
                config.width,
                config.height,
            );
            println!("Opening {facing} camera at {}...", source.device_for(facing));
            source.start(facing)?;
            for _ in 0..frames {
                let frame = source.next_frame()?;
                println!(
                    "frame {}: {}x{}, mean brightness {:.1}",
                    frame.sequence,
                    frame.width(),
                    frame.height(),
                    frame.avg_brightness()
                );
            }
            source.stop();
        }
    }

    Ok(())
}

fn list_filters(json: bool) -> Result<()> {
    let listing: Vec<FilterListing> = Filter::ALL
        .iter()
        .map(|filter| FilterListing {
            id: filter.id(),
            label: filter.label(),
            animated: filter.is_animated(),
            random: filter.uses_randomness(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    for entry in &listing {
        println!("{:<16} {}", entry.id, entry.label);
    }
    Ok(())
}

/// Read stdin commands until `quit`, end of input, or Ctrl-C.
async fn run_console(handle: &EngineHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(err) = execute(handle, command).await {
                            eprintln!("error: {err}");
                            if matches!(err.downcast_ref::<EngineError>(), Some(EngineError::ChannelClosed)) {
                                break;
                            }
                        }
                    }
                    Err(err) => eprintln!("{err}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    let status = handle.shutdown().await?;
    println!(
        "Session ended: {} frames rendered, {} photos",
        status.frames_rendered, status.photos
    );
    Ok(())
}

async fn execute(handle: &EngineHandle, command: ConsoleCommand) -> Result<()> {
    match command {
        ConsoleCommand::Start => {
            let status = handle.start().await?;
            println!("Camera: {} ({:?})", status.facing, status.state);
        }
        ConsoleCommand::Filter(id) => {
            if !id.is_none() && lookup(&id).is_none() {
                println!("Unknown filter {id}; showing unfiltered video");
            }
            handle.set_filter(id).await?;
        }
        ConsoleCommand::Capture => {
            let photo = handle.capture().await?;
            println!(
                "Captured {} ({}x{}, {})",
                photo.file_name, photo.width, photo.height, photo.filter
            );
        }
        ConsoleCommand::Save(index) => {
            let path = handle.save(index).await?;
            println!("Saved {}", path.display());
        }
        ConsoleCommand::Toggle => {
            let facing = handle.toggle_camera().await?;
            println!("Camera: {facing}");
        }
        ConsoleCommand::Pause => handle.pause().await?,
        ConsoleCommand::Resume => handle.resume().await?,
        ConsoleCommand::Status => {
            let status = handle.status().await?;
            println!("{}", serde_json::to_string(&status)?);
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}
