use std::sync::Arc;

use log::error;
use tokio::sync::Mutex;

use crate::core_fs::adapter::{self, FsError};
use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Reports the byte length of a regular file. Directories and other
/// non-regular entries are refused rather than reporting an inode size.
pub async fn handle_size_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return send_reply(writer, &Reply::action_failed("SIZE")).await;
    }

    let resolved = {
        let session = session.lock().await;
        sandbox::resolve(&session.root, &session.cwd, &arg)
    };

    match adapter::file_size(&resolved.path).await {
        Ok(size) => send_reply(writer, &Reply::file_status(size)).await,
        Err(FsError::NotAFile) => send_reply(writer, &Reply::size_regular_files_only()).await,
        Err(FsError::NotFound) => send_reply(writer, &Reply::action_failed("SIZE")).await,
        Err(err) => {
            error!("SIZE failed for {:?}: {}", resolved.path, err);
            send_reply(writer, &Reply::action_failed("SIZE")).await
        }
    }
}
