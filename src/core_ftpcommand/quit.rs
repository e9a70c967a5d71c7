use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Says goodbye; the dispatch loop closes the control connection after this
/// reply is written.
pub async fn handle_quit_command(
    writer: &ControlWriter,
    _session: &Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_reply(writer, &Reply::closing_control_connection()).await
}
