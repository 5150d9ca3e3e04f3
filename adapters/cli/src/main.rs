#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs scripted heist playthroughs and exports
//! their difficulty traces.

mod simulation;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use heist_dda_core::PlaythroughScoped;
use heist_dda_session::{query, Session, SessionConfig};
use heist_dda_system_difficulty::DifficultyConfig;
use heist_dda_system_reset::GameResetService;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use simulation::Script;

#[derive(Debug, Parser)]
#[command(name = "heist-dda", version)]
#[command(about = "Dynamic difficulty adjustment for the heist simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run seeded scripted playthroughs and export their difficulty traces
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// Seed of the scripted gameplay
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Simulated seconds per playthrough
    #[arg(long, default_value_t = 300)]
    duration: u64,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Guards patrolling the level
    #[arg(long, default_value_t = 4)]
    guards: u32,

    /// Stealable paintings placed in the level
    #[arg(long, default_value_t = 3)]
    paintings: u32,

    /// TOML file with `[difficulty]` and `[log]` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Application data directory; logs are written next to it
    #[arg(long, default_value = "Heist_Data")]
    data_dir: PathBuf,

    /// Number of playthroughs, each followed by a return to the menu
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    playthroughs: u32,
}

/// Entry point for the heist difficulty command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate(&args),
    }
}

fn simulate(args: &SimulateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut session = Session::new(&config);
    let mut level = simulation::heist_level(args.paintings);
    let mut service = GameResetService::new(config.log.sink(&args.data_dir));
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let script = Script {
        duration: Duration::from_secs(args.duration),
        tick: Duration::from_millis(args.tick_ms),
        guards: args.guards,
    };

    println!(
        "heist-dda: seed {}, {} playthrough(s), starting difficulty {}, logs in {}",
        args.seed,
        args.playthroughs,
        query::difficulty(&session).get(),
        service.sink().folder().display()
    );

    for _ in 0..args.playthroughs {
        let report = simulation::run_playthrough(&mut session, &mut level, &script, &mut rng);
        println!("{report}");

        let mut collaborators: [&mut dyn PlaythroughScoped; 1] = [&mut level];
        service.reset_persistent_systems(&mut session, &mut collaborators);
        service.reset_goap_systems();

        match service.last_export() {
            Some(record) => println!(
                "  exported {} samples to {}",
                record.samples, record.location
            ),
            None => println!("  difficulty trace was not exported"),
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut config: SessionConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;

    if let Err(error) = config.difficulty.validate() {
        log::warn!(
            "invalid difficulty config in {} ({error}); using defaults",
            path.display()
        );
        config.difficulty = DifficultyConfig::default();
    }
    Ok(config)
}
