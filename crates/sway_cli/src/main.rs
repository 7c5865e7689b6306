//! Sway CLI
//!
//! Plays the built-in animation scenes headlessly and prints sampled
//! sprite state, one line per sprite every few ticks.

mod config;
mod scenes;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use sway_animation::TweenManager;
use tracing_subscriber::EnvFilter;

use crate::config::{SwayConfig, CONFIG_FILE};
use crate::scenes::{Scene, SpriteLine, Stage};

/// Seconds played for scenes that never finish, unless configured
const ENDLESS_SECONDS: f32 = 4.0;

#[derive(Parser)]
#[command(name = "sway")]
#[command(about = "Play tween and timeline scenes headlessly")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scene and print sampled sprite state
    Play {
        /// Scene name (see `sway scenes`)
        scene: String,

        /// Config file (defaults to ./sway.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Ticks per second
        #[arg(long)]
        fps: Option<u32>,

        /// Seconds to play
        #[arg(long)]
        seconds: Option<f32>,

        /// Time multiplier
        #[arg(long)]
        speed: Option<f32>,

        /// Play backward to the start afterwards
        #[arg(long)]
        rewind: bool,
    },

    /// List the built-in scenes
    Scenes,

    /// Write a default sway.toml
    Init {
        /// Target path
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            scene,
            config,
            fps,
            seconds,
            speed,
            rewind,
        } => {
            let mut config = SwayConfig::load(config.as_deref())?;
            if let Some(fps) = fps {
                config.playback.fps = fps;
            }
            if let Some(speed) = speed {
                config.playback.speed = speed;
            }
            if seconds.is_some() {
                config.playback.seconds = seconds;
            }
            config.playback.rewind |= rewind;
            cmd_play(&scene, &config)
        }
        Commands::Scenes => {
            for scene in scenes::SCENES {
                println!("{:<10} {}", scene.name, scene.about);
            }
            Ok(())
        }
        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

fn cmd_play(name: &str, config: &SwayConfig) -> Result<()> {
    let scene: &Scene = scenes::find(name)
        .with_context(|| format!("Unknown scene `{name}`. Run `sway scenes` to list them."))?;
    let playback = &config.playback;
    if playback.fps == 0 {
        anyhow::bail!("fps must be at least 1");
    }

    let registry = scenes::registry();
    let (stage, mut animation) = scene
        .build(&registry)
        .with_context(|| format!("Failed to build scene `{name}`"))?;

    let seconds = playback
        .seconds
        .or(animation.full_duration())
        .unwrap_or(ENDLESS_SECONDS);
    let ticks = (seconds * playback.fps as f32).ceil() as u32;
    let dt = playback.speed / playback.fps as f32;

    // Kept after finishing so it can be rewound
    animation.set_auto_remove(false);
    let mut manager = TweenManager::new();
    let id = manager.add(animation);

    tracing::info!(
        scene = name,
        seconds,
        ticks,
        tweens = manager.running_tweens(),
        timelines = manager.running_timelines(),
        "playing"
    );

    let mut clock = 0.0_f32;
    print_frame(&stage, clock, config);
    run(&mut manager, &stage, &mut clock, ticks, dt, config);

    if playback.rewind {
        tracing::info!(scene = name, "rewinding");
        run(&mut manager, &stage, &mut clock, ticks, -dt, config);
    }

    if manager.get(id).is_some_and(|a| a.is_finished()) {
        tracing::info!(scene = name, "finished");
    }
    Ok(())
}

fn run(
    manager: &mut TweenManager,
    stage: &Stage,
    clock: &mut f32,
    ticks: u32,
    dt: f32,
    config: &SwayConfig,
) {
    let every = config.output.every.max(1);
    for tick in 1..=ticks {
        manager.update(dt);
        *clock += dt;
        if tick % every == 0 || tick == ticks {
            print_frame(stage, *clock, config);
        }
    }
}

fn print_frame(stage: &Stage, clock: f32, config: &SwayConfig) {
    let precision = config.output.precision;
    for (name, sprite) in stage.sprites() {
        let sprite = sprite.borrow();
        println!(
            "t={clock:>8.precision$} {name:<8} {}",
            SpriteLine {
                sprite: &sprite,
                precision,
            }
        );
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let content = SwayConfig::default().to_toml()?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote default config");
    Ok(())
}
