//! Wargame CLI - Command-line interface
//!
//! Commands:
//! - play: Play one game (human or computer on either side)
//! - serve-broker: Run the move relay for games across processes

mod broker_cmd;
mod human;
mod output;
mod play;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wargame")]
#[command(about = "Two-team grid wargame with a minimax/alpha-beta computer player")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play::PlayArgs),
    /// Start the broker relay server
    ServeBroker(broker_cmd::ServeBrokerArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with the game narration
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
        Commands::ServeBroker(args) => broker_cmd::run(args),
    }
}
