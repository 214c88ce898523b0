use std::net::{Ipv4Addr, SocketAddr};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use clustersh::agent::Agent;
use clustersh::config::AgentConfig;
use clustersh::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "clustersh")]
#[command(version)]
#[command(about = "Node agent for a distributed cluster shell")]
struct Args {
    /// Coordinator address for the session connection
    #[arg(long, default_value = "127.0.0.1:12038")]
    coordinator: SocketAddr,

    /// Port the request listener binds for dispatched commands.
    /// Must match the coordinator's dial port; identical on all agents.
    #[arg(long, default_value = "12345")]
    listen_port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    change_to_home_dir();

    let config = AgentConfig::new(
        args.coordinator,
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.listen_port)),
    );

    tracing::info!(
        coordinator = %config.coordinator_addr,
        listen = %config.listen_addr,
        "starting agent"
    );

    let shutdown = install_shutdown_handler();
    if let Err(e) = Agent::new(config).run(shutdown).await {
        tracing::error!(error = %e, "agent terminated");
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}

/// Start in the invoking user's home directory, so the first `cd`-relative
/// commands behave like a fresh login shell. Failure is not fatal.
fn change_to_home_dir() {
    match std::env::var("HOME") {
        Ok(home) => {
            if let Err(e) = std::env::set_current_dir(&home) {
                tracing::warn!(home, error = %e, "could not change to home directory");
            }
        }
        Err(_) => tracing::warn!("HOME not set, keeping current directory"),
    }
}
