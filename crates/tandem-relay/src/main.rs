//! tandem-relay: WebSocket lobby and sync barrier for two-player sessions.
//!
//! A host creates a session and gets a four-digit code, a guest joins with
//! that code, and from then on the relay releases a `sync_complete` to both
//! whenever both have reported their task done.

mod code;
mod connection;
mod coordinator;
mod handler;
mod protocol;
mod reaper;
mod registry;
mod server;
mod session;

use std::path::PathBuf;

use clap::Parser;
use tandem_common::TandemError;
use tandem_config::{ConfigOverrides, RelayConfig};

use crate::session::SessionStore;

#[derive(Parser)]
#[command(name = "tandem-relay", about = "Two-player lobby and sync relay")]
struct Args {
    /// TOML config file. Defaults to the platform config dir when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Dead-peer sweep period in milliseconds.
    #[arg(long)]
    heartbeat_interval_ms: Option<u64>,

    /// Idle time in milliseconds after which a session is reaped.
    #[arg(long)]
    stale_session_ms: Option<u64>,

    /// Reaper sweep period in milliseconds.
    #[arg(long)]
    reaper_interval_ms: Option<u64>,

    /// Write a commented default config file and exit.
    #[arg(long)]
    init_config: bool,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_address: self.bind.clone(),
            port: self.port,
            heartbeat_interval_ms: self.heartbeat_interval_ms,
            stale_session_ms: self.stale_session_ms,
            reaper_interval_ms: self.reaper_interval_ms,
        }
    }
}

#[tokio::main]
async fn main() -> tandem_common::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tandem_relay=info".into()),
        )
        .init();

    let args = Args::parse();

    if args.init_config {
        let path = match args.config.clone() {
            Some(path) => path,
            None => tandem_config::default_config_path()?,
        };
        tandem_config::create_default_config(&path)?;
        return Ok(());
    }

    let config: RelayConfig = tandem_config::load_config(args.config.as_deref(), &args.overrides())?;

    if args.print_config {
        println!("{}", tandem_config::config_to_json(&config));
        return Ok(());
    }

    let addr = config.listen_addr();
    let listener = server::bind(&addr).await?;

    tracing::info!(
        heartbeat_ms = config.heartbeat_interval_ms,
        stale_ms = config.stale_session_ms,
        "tandem-relay listening on {}",
        addr
    );

    tokio::select! {
        _ = server::serve(listener, config, SessionStore::new()) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                return Err(TandemError::Other(format!("failed to listen for ctrl-c: {e}")));
            }
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
