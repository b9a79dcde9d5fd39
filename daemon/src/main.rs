mod config;
mod connection;
mod handlers;
mod protocol;
mod state;

use std::sync::Arc;

use clap::Parser;
use cronscope_core::CronService;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Args;
use state::DaemonState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments
    let args = Args::parse();
    let cron_config = args.cron_config();
    info!(
        shell = %cron_config.shell.display(),
        crontab = %cron_config.crontab_bin,
        docker = %cron_config.docker_bin,
        timeout = ?cron_config.command_timeout,
        empty_tables = ?cron_config.empty_tables,
        "Cron service configured"
    );

    // Create shared state
    let state = Arc::new(DaemonState::new(CronService::new(&cron_config)));

    // Bind TCP listener
    let listener = TcpListener::bind(&args.listen).await?;
    info!("Listening on {}", args.listen);

    // Accept loop
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let state = state.clone();
                tokio::spawn(async move {
                    connection::handle_client(stream, state).await;
                });
            }
            Err(e) => {
                error!("Accept error: {e}");
            }
        }
    }
}
