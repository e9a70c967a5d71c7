use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use tokio::net::TcpListener;

use crate::session;

/// Accept loop: every control connection gets its own session task, and the
/// dispatch loops of all sessions run concurrently. Accept errors are logged
/// and the loop continues.
pub async fn start_server(
    listener: TcpListener,
    root: Arc<PathBuf>,
    advertise_ip: Option<IpAddr>,
) -> Result<()> {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                error!("Failed to accept connection: {}", err);
                continue;
            }
        };
        info!("New connection from {}", addr);

        let root = Arc::clone(&root);
        tokio::spawn(async move {
            if let Err(err) = session::handle_connection(socket, root, advertise_ip).await {
                error!("Session error for {}: {:?}", addr, err);
            }
            info!("Connection closed for {}", addr);
        });
    }
}
