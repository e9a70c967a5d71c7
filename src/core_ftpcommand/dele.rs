use std::sync::Arc;

use log::{error, info};
use tokio::sync::Mutex;

use crate::core_fs::adapter::{self, FsError};
use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Deletes a regular file. Directories are refused; that is RMD's job.
pub async fn handle_dele_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return send_reply(writer, &Reply::action_failed("DELE")).await;
    }

    let resolved = {
        let session = session.lock().await;
        sandbox::resolve(&session.root, &session.cwd, &arg)
    };
    let display = sandbox::clean_reference(&arg);

    match adapter::remove_file(&resolved.path).await {
        Ok(()) => {
            info!("Deleted file {:?}", resolved.path);
            send_reply(writer, &Reply::deleted(&display)).await
        }
        Err(FsError::NotFound) => send_reply(writer, &Reply::no_such_file(&display)).await,
        Err(FsError::NotAFile) => send_reply(writer, &Reply::delete_regular_files_only()).await,
        Err(err) => {
            error!("DELE failed for {:?}: {}", resolved.path, err);
            send_reply(writer, &Reply::action_failed("DELE")).await
        }
    }
}
