use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;

use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Accepts any representation type flag. Transfers are byte-exact whatever
/// the flag says, so the acknowledgement is all there is to it.
pub async fn handle_type_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !arg.is_empty() {
        let mut session = session.lock().await;
        session.transfer_type = arg.to_ascii_uppercase();
        debug!("Transfer type set to {}", session.transfer_type);
    }
    send_reply(writer, &Reply::type_now_binary()).await
}
