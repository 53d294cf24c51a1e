//! Server entry point: parses CLI flags, loads configuration, wires up
//! logging, binds the listener and drives the accept loop until SIGINT.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use flexi_logger::{Duplicate, Logger};
use irc_server::config::Config;
use irc_server::connection::handle_connection;
use irc_server::cooldown::spawn_sweeper;
use irc_server::server_state::ServerState;
use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

#[derive(Debug, Parser)]
#[command(name = "irc_server", about = "A small, concurrent IRC server")]
struct Args {
    /// Path to a TOML configuration file. Runs with compiled-in defaults
    /// when omitted or unreadable.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured bind address.
    #[arg(long)]
    bind_address: Option<String>,

    /// Overrides the configured port.
    #[arg(long)]
    port: Option<u16>,
}

fn load_config(args: &Args) -> Config {
    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("failed to load config from {}: {err}, using defaults", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    if let Some(bind_address) = &args.bind_address {
        config.network.bind_address = bind_address.clone();
    }
    if let Some(port) = args.port {
        config.network.port = port;
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Logger::try_with_str("info")
        .and_then(|logger| {
            logger
                .log_to_stderr()
                .duplicate_to_stderr(Duplicate::All)
                .start()
        })
        .ok();

    let args = Args::parse();
    let config = load_config(&args);
    let limits = config.limits.clone();
    let bind_address = config.network.bind_address.clone();
    let port = config.network.port;

    let state = ServerState::new(config);

    let sweeper = spawn_sweeper(
        state.disconnects_handle(),
        Duration::from_secs(limits.sweeper_interval_secs),
        Duration::from_secs(limits.disconnect_retention_secs),
    );

    let listener = TcpListener::bind((bind_address.as_str(), port)).await?;
    info!("listening on [{bind_address}]:{port}");

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let mut sigint = Box::pin(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            biased;
            _ = &mut sigint => {
                info!("shutdown signal received");
                break;
            }
            accepted = listener.accept() => {
                let (socket, addr) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        error!("accept failed: {err}");
                        continue;
                    }
                };

                let cooldown = Duration::from_secs(limits.reconnect_cooldown_secs);
                if state.disconnects().is_on_cooldown(addr.ip(), cooldown) {
                    info!("refusing {addr}: reconnect cooldown in effect");
                    drop(socket);
                    continue;
                }

                if state.client_count() >= state.config().network.max_connections {
                    warn!("refusing {addr}: at max connections");
                    drop(socket);
                    continue;
                }

                let conn_state = state.clone();
                let conn_shutdown = shutdown_tx.subscribe();
                tokio::spawn(async move {
                    handle_connection(socket, addr, conn_state, conn_shutdown).await;
                });
            }
        }
    }

    let _ = shutdown_tx.send(());
    sweeper.abort();
    // Gives connection tasks a moment to flush the shutdown notice before the
    // process exits out from under their sockets.
    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(())
}
