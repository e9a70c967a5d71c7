use std::sync::Arc;

use log::{error, info};
use tokio::sync::Mutex;

use crate::core_fs::adapter::{self, FsError};
use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Deletes a directory tree recursively. Strict FTP wants an empty
/// directory here; the recursive behavior is deliberate and kept for
/// compatibility with clients that rely on it.
pub async fn handle_rmd_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return send_reply(writer, &Reply::action_failed("RMD")).await;
    }

    let resolved = {
        let session = session.lock().await;
        sandbox::resolve(&session.root, &session.cwd, &arg)
    };
    let display = sandbox::clean_reference(&arg);

    match adapter::remove_dir_all(&resolved.path).await {
        Ok(()) => {
            info!("Removed directory tree {:?}", resolved.path);
            send_reply(writer, &Reply::deleted(&display)).await
        }
        Err(FsError::NotFound) => send_reply(writer, &Reply::no_such_file(&display)).await,
        Err(FsError::NotADirectory) => send_reply(writer, &Reply::not_a_directory(&display)).await,
        Err(err) => {
            error!("RMD failed for {:?}: {}", resolved.path, err);
            send_reply(writer, &Reply::action_failed("RMD")).await
        }
    }
}
