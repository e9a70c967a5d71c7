use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Reports the working directory relative to the virtual root; the root
/// itself is `/`.
pub async fn handle_pwd_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let display = {
        let session = session.lock().await;
        sandbox::display_path(&session.root, &session.cwd)
    };
    send_reply(writer, &Reply::working_directory(&display)).await
}
