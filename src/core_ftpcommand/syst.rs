use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

pub async fn handle_syst_command(
    writer: &ControlWriter,
    _session: &Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_reply(writer, &Reply::system_type()).await
}
