use std::sync::Arc;

use log::{error, info};
use tokio::sync::Mutex;

use crate::core_fs::adapter::{self, FsError};
use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Changes the working directory. A reference that tries to traverse above
/// the virtual root silently clamps the working directory to the root and
/// still succeeds.
pub async fn handle_cwd_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        return send_reply(writer, &Reply::action_failed("CWD")).await;
    }

    let resolved = {
        let session = session.lock().await;
        sandbox::resolve(&session.root, &session.cwd, &arg)
    };

    if resolved.escaped {
        info!("CWD escape attempt clamped to root: {}", arg);
        let mut session = session.lock().await;
        let root = session.root.as_ref().clone();
        session.cwd = root;
        drop(session);
        return send_reply(writer, &Reply::current_directory_is("/")).await;
    }

    let display = sandbox::clean_reference(&arg);
    match adapter::stat(&resolved.path).await {
        Ok(meta) if meta.is_dir() => {
            let mut session = session.lock().await;
            session.cwd = resolved.path;
            let shown = sandbox::display_path(&session.root, &session.cwd);
            drop(session);
            send_reply(writer, &Reply::current_directory_is(&shown)).await
        }
        Ok(_) => send_reply(writer, &Reply::not_a_directory(&display)).await,
        Err(FsError::NotFound) => send_reply(writer, &Reply::no_such_file(&display)).await,
        Err(err) => {
            error!("CWD failed to stat {:?}: {}", resolved.path, err);
            send_reply(writer, &Reply::action_failed("CWD")).await
        }
    }
}
