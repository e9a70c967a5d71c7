mod config;
mod constants;
mod core_cli;
mod core_fs;
mod core_ftpcommand;
mod core_network;
mod core_reply;
mod helpers;
mod server;
mod session;
#[cfg(test)]
mod test_session;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use crate::config::Config;
use crate::constants::{SCRATCH_PREFIX, SEED_MESSAGE, SEED_MESSAGE_NAME, SEED_SUBDIR};
use crate::core_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }
    if let Some(root) = args.root {
        config.server.root_dir = Some(root);
    }
    let config = Arc::new(config);

    match config.server.root_dir.clone() {
        Some(dir) => {
            let root = dir
                .canonicalize()
                .with_context(|| format!("Failed to resolve root directory: {}", dir.display()))?;
            tokio::select! {
                result = server::run(Arc::clone(&config), root) => result,
                _ = shutdown_signal() => {
                    info!("Shutdown signal received");
                    Ok(())
                }
            }
        }
        None => {
            let scratch = tempfile::Builder::new()
                .prefix(SCRATCH_PREFIX)
                .tempdir()
                .context("Failed to create scratch root")?;
            seed_root(scratch.path()).context("Failed to seed scratch root")?;
            let root = scratch
                .path()
                .canonicalize()
                .context("Failed to resolve scratch root")?;
            info!("Seeded scratch root at {}", root.display());

            let result = tokio::select! {
                result = server::run(Arc::clone(&config), root) => result,
                _ = shutdown_signal() => {
                    info!("Shutdown signal received, removing scratch root");
                    Ok(())
                }
            };
            scratch.close().context("Failed to remove scratch root")?;
            result
        }
    }
}

/// Seeds the scratch root with a sample file and a nested directory holding
/// a copy of this server's own main source, so a fresh server has something
/// to show.
fn seed_root(root: &Path) -> std::io::Result<()> {
    fs::write(root.join(SEED_MESSAGE_NAME), SEED_MESSAGE)?;
    fs::create_dir(root.join(SEED_SUBDIR))?;
    fs::write(
        root.join(SEED_SUBDIR).join("main.rs"),
        include_str!("main.rs"),
    )?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(err) => {
            log::error!("Failed to install SIGTERM handler: {}", err);
            ctrl_c.await.ok();
        }
    }
}
