use std::sync::Arc;

use log::{error, info};
use tokio::sync::Mutex;

use crate::core_fs::adapter::{self, FsError};
use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Creates a directory. The parent must already exist; an existing target is
/// refused.
pub async fn handle_mkd_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return send_reply(writer, &Reply::action_failed("MKD")).await;
    }

    let resolved = {
        let session = session.lock().await;
        sandbox::resolve(&session.root, &session.cwd, &arg)
    };
    let display = sandbox::clean_reference(&arg);

    match adapter::make_dir(&resolved.path).await {
        Ok(()) => {
            info!("Created directory {:?}", resolved.path);
            send_reply(writer, &Reply::created(&display)).await
        }
        Err(FsError::AlreadyExists) => send_reply(writer, &Reply::directory_exists()).await,
        Err(FsError::NotFound) => send_reply(writer, &Reply::no_such_file(&display)).await,
        Err(FsError::NotADirectory) => send_reply(writer, &Reply::not_a_directory(&display)).await,
        Err(err) => {
            error!("MKD failed for {:?}: {}", resolved.path, err);
            send_reply(writer, &Reply::action_failed("MKD")).await
        }
    }
}
