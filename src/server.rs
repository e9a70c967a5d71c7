use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::core_network::network;

/// Binds the control port and serves clients until shutdown.
pub async fn run(config: Arc<Config>, root: PathBuf) -> Result<()> {
    let advertise_ip = match &config.server.pasv_address {
        Some(addr) => Some(
            addr.parse::<IpAddr>()
                .with_context(|| format!("Invalid pasv_address: {}", addr))?,
        ),
        None => None,
    };

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind control address: {}", config.server.listen_addr))?;
    info!("Listening on {}", listener.local_addr()?);
    info!("Virtual root: {}", root.display());

    network::start_server(listener, Arc::new(root), advertise_ip).await
}
