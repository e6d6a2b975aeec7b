//! Monster Kong
//!
//! Headless runner: builds a level, drives the player with a scripted input
//! sequence, then replays the recorded inputs to confirm the run is
//! reproducible.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use monster_kong::{
    game::{
        events::GameEventData,
        replay_level,
        textures::TextureRegistry,
    },
    GameConfig, InputRecording, InputSnapshot, LevelDescription, PlayMode, World,
    TICK_DURATION, TICK_RATE, VERSION,
};

const DEMO_LEVEL: &str = include_str!("../assets/levels/demo.json");

/// Deterministic platformer simulation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level document (defaults to the built-in demo level)
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// World configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Texture manifest JSON, layered over the built-in textures
    #[arg(long)]
    textures: Option<PathBuf>,

    /// Frames to simulate
    #[arg(short, long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    ticks: u32,

    /// Run in edit mode (fires are draggable, level can be exported)
    #[arg(long)]
    edit: bool,

    /// Write the level as placed at the end of the run (edit mode only)
    #[arg(long, requires = "edit")]
    export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("Monster Kong v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_str(&read(path)?)
            .with_context(|| format!("parsing config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if args.edit {
        config = config.with_mode(PlayMode::Edit);
    }

    let textures = match &args.textures {
        Some(path) => TextureRegistry::from_json_str(&read(path)?)
            .with_context(|| format!("parsing texture manifest {}", path.display()))?,
        None => TextureRegistry::builtin(),
    };

    let level_json = match &args.level {
        Some(path) => read(path)?,
        None => DEMO_LEVEL.to_string(),
    };
    let desc = LevelDescription::from_json_str(&level_json).context("loading level")?;

    run(&desc, &textures, config, &args)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Idle, run right, jump, run back left, hop, rest. Repeats every 4 seconds.
fn scripted_input(t: u32) -> InputSnapshot {
    match t % 240 {
        0..=29 => InputSnapshot::new(),
        30..=119 => InputSnapshot::right_only(),
        120 => InputSnapshot::up_only(),
        121..=179 => InputSnapshot::left_only(),
        180..=185 => InputSnapshot::from_keys(false, true, false, true),
        _ => InputSnapshot::new(),
    }
}

fn run(
    desc: &LevelDescription,
    textures: &TextureRegistry,
    config: GameConfig,
    args: &Args,
) -> Result<()> {
    info!("=== Building Level ===");
    let mut world = World::new(desc, textures, config.clone()).context("building level")?;
    info!(
        "{} platforms, {} fires, mode {:?}",
        world.platforms().count(),
        world.hazards().count(),
        config.mode
    );

    let mut recording = InputRecording::new();
    let mut total_events = 0;

    info!("Running {} ticks...", args.ticks);
    for t in 0..args.ticks {
        let input = scripted_input(t);
        recording.record(t, input);

        let result = world.update(input, TICK_DURATION);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::HazardTouched { hazard, position } => {
                    warn!("Tick {}: player burned by fire {} at {}", event.tick, hazard, position);
                }
                GameEventData::GoalReached { position } => {
                    info!("Tick {}: goal reached at {}", event.tick, position);
                }
                _ => {}
            }
        }

        if t > 0 && t % 120 == 0 {
            let state = world.player_state();
            info!(
                "Tick {}: {:?} facing {:?}, grounded {}",
                world.tick(),
                state.animation,
                state.facing,
                state.grounded
            );
        }
    }
    recording.finalize(args.ticks - 1);

    info!("=== Run Results ===");
    let hash = world.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Total events: {}", total_events);
    if let Some(player) = world.player() {
        let (x, y) = player.position.to_floats();
        info!("Player at ({:.2}, {:.2})", x, y);
    }

    if let Some(path) = &args.export {
        let exported = world.export_level().to_json_string()?;
        fs::write(path, exported).with_context(|| format!("writing {}", path.display()))?;
        info!("Level exported to {}", path.display());
    }

    info!("=== Verifying Replay ===");
    let bytes = recording.to_bytes()?;
    info!(
        "Recording: {} changes, {} bytes, hash {}",
        recording.delta_count(),
        bytes.len(),
        hex::encode(recording.hash())
    );

    let decoded = InputRecording::from_bytes(&bytes)?;
    let (replayed, _) = replay_level(desc, textures, config, &decoded)?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("replay diverged from the live run");
    }
    info!("Replay verified: hashes match");
    Ok(())
}
