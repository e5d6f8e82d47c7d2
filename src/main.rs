//! gridcrawl headless runner.
//!
//! Loads the configuration and a level, then alternates player and enemy
//! turns, logging everything the grid manager does:
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --turns 8 --level levels/crypt.json
//! ```
//!
//! Each player turn steps every player one cell along its look direction
//! before the detection pass runs. The run stops early once a scene trigger
//! pauses the current scene.

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};

use gridcrawl::components::levellayout::LevelLayoutData;
use gridcrawl::game::{GameRuntime, demo_level};
use gridcrawl::resources::gameconfig::GameConfig;

/// Turn-based grid interaction runtime
#[derive(Parser)]
#[command(version, about = "Runs a gridcrawl level headless and logs every interaction.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// JSON level layout. The built-in demo level is used when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,

    /// Number of player/enemy turn pairs to simulate.
    #[arg(long, default_value_t = 6)]
    turns: u32,

    /// Seconds of simulation time per tick. Defaults to `[simulation] turn_delta`.
    #[arg(long)]
    dt: Option<f32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(cli.config.clone());
    if let Err(e) = config.load_from_file() {
        warn!("using default configuration: {}", e);
    }
    if let Some(dt) = cli.dt {
        config.turn_delta = dt;
    }

    let level = match &cli.level {
        Some(path) => LevelLayoutData::load_from_file(path),
        None => demo_level(),
    };
    let level = match level {
        Ok(level) => level,
        Err(e) => {
            error!("cannot load level: {}", e);
            std::process::exit(1);
        }
    };

    let mut runtime = GameRuntime::with_audio(config);
    if let Err(e) = runtime.load_level(&level) {
        error!("cannot spawn level: {}", e);
        runtime.shutdown();
        std::process::exit(1);
    }
    match runtime.animate_players() {
        Ok(count) => info!("animating {} players", count),
        Err(e) => warn!("players stay static: {}", e),
    }
    info!("{:?}", runtime.grid());

    for turn in 1..=cli.turns {
        info!("--- turn {} ---", turn);
        let delivered = runtime.player_turn() + runtime.enemy_turn();
        info!("turn {}: {} events delivered", turn, delivered);

        if runtime.scene().is_paused() {
            info!("scene '{}' reached, stopping", runtime.scene().current());
            break;
        }
    }

    for message in runtime.messages().entries() {
        info!("log: {}", message);
    }
    runtime.shutdown();
}
