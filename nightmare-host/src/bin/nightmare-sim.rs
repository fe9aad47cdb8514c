//! Headless director run: a scripted player in a corruptible world for a
//! fixed stretch of simulated time, followed by a JSON summary on stdout.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use nightmare_core::HorrorSession;
use nightmare_core::NightmareConfig;
use nightmare_core::metrics::TimingPercentiles;
use nightmare_core::session::SessionSnapshot;
use nightmare_core::world::PlayerState;
use nightmare_host::components::PlayerComponent;
use nightmare_host::config::DifficultyProfile;
use nightmare_host::hooks::DirectorHooks;
use nightmare_host::script::{ScriptedPlayer, spawn_point};
use nightmare_host::systems::{FRAME_BUDGET_MS, FrameDriver};
use nightmare_host::world::CorruptionWorld;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run the horror director against a scripted player.
#[derive(Debug, Parser)]
#[command(name = "nightmare-sim", version, about)]
struct Args {
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 300.0)]
    seconds: f64,

    /// Frames per simulated second.
    #[arg(long, default_value_t = 10)]
    fps: u32,

    /// RNG seed for the director and the scripted player.
    #[arg(long)]
    seed: Option<u64>,

    /// Difficulty profile applied on top of the configuration.
    #[arg(long, value_enum, default_value_t = DifficultyProfile::Standard)]
    difficulty: DifficultyProfile,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// World size in tiles (square).
    #[arg(long, default_value_t = 256)]
    world_size: usize,

    /// Pretty-print the JSON summary.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct WorldSummary {
    creatures: usize,
    census: BTreeMap<String, usize>,
    corrupted_tiles: usize,
    mean_corruption: f32,
}

#[derive(Debug, Serialize)]
struct PlayerSummary {
    position: (f32, f32),
    sanity: f32,
    health: f32,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    difficulty: DifficultyProfile,
    seed: Option<u64>,
    simulated_seconds: f64,
    frames: u64,
    scares_fired: usize,
    hook_events_dropped: u64,
    frame_timing: TimingPercentiles,
    frame_budget_ms: f64,
    player: PlayerSummary,
    world: WorldSummary,
    session: SessionSnapshot,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        bail!("--seconds must be a positive number");
    }
    if args.fps == 0 {
        bail!("--fps must be at least 1");
    }

    let mut config = match &args.config {
        Some(path) => NightmareConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => NightmareConfig::default(),
    };
    args.difficulty.apply(&mut config);
    if args.seed.is_some() {
        config.general.seed = args.seed;
    }
    config.validate().context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let summary = run(&args, config);
    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .context("serializing summary")?;
    println!("{json}");
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn run(args: &Args, config: NightmareConfig) -> RunSummary {
    let seed = config.general.seed;
    let mut session = HorrorSession::new(config);
    let mut world = CorruptionWorld::new(args.world_size, args.world_size);
    let mut player = PlayerComponent::new(spawn_point(&world));
    let mut script = ScriptedPlayer::new(
        seed.unwrap_or_else(rand::random),
        DirectorHooks::new(session.sender()),
    );
    let driver = FrameDriver::new(FRAME_BUDGET_MS);

    let dt = Duration::from_secs(1) / args.fps;
    let frames = (args.seconds * f64::from(args.fps)).ceil() as u64;
    info!(
        difficulty = %args.difficulty,
        frames,
        fps = args.fps,
        "Starting headless run ({})",
        args.difficulty.description()
    );

    let mut scares_fired = 0;
    for _ in 0..frames {
        script.step(&mut player, &world, session.now());
        let report = driver.run_frame(&mut session, dt, &mut player, &mut world);
        if let Some(event) = report.tick.fired {
            scares_fired += 1;
            info!(kind = %event.kind, intensity = event.intensity, "Scare");
        }
    }

    let timing = driver.timing();
    info!(summary = %timing.summary(driver.budget_ms()), "Frame timing");

    RunSummary {
        difficulty: args.difficulty,
        seed,
        simulated_seconds: args.seconds,
        frames,
        scares_fired,
        hook_events_dropped: script.hooks().dropped(),
        frame_timing: timing,
        frame_budget_ms: driver.budget_ms(),
        player: PlayerSummary {
            position: (player.position.x, player.position.y),
            sanity: player.sanity(),
            health: player.health(),
        },
        world: WorldSummary {
            creatures: world.creatures().len(),
            census: world
                .creature_census()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            corrupted_tiles: world.corrupted_tiles(),
            mean_corruption: world.mean_corruption(),
        },
        session: session.snapshot(),
    }
}
