//! Serve-broker command - run the move relay for cross-process games
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: start_relay()
//! - Level 3: (delegated to wargame-broker crate)

use anyhow::Result;
use clap::Args;

use wargame_broker::{run_server, RelayConfig};

#[derive(Args)]
pub struct ServeBrokerArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8001")]
    pub port: u16,
}

/// Run serve-broker command (blocks until the process is stopped)
pub fn run(args: ServeBrokerArgs) -> Result<()> {
    let config = RelayConfig { port: args.port };
    tracing::info!("Starting broker relay on port {}", config.port);
    start_relay(config)
}

fn start_relay(config: RelayConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server(config))
}
