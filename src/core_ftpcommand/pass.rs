use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;

use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Accepts any password without verification.
pub async fn handle_pass_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let username = { session.lock().await.username.clone() };
    info!(
        "Accepted login for {}",
        username.as_deref().unwrap_or("anonymous")
    );
    send_reply(writer, &Reply::logged_in()).await
}
