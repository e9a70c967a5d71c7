use std::sync::Arc;

use log::{error, warn};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::core_fs::adapter::{self, FsError};
use crate::core_fs::listing;
use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Streams bare entry names over the data channel, one per line. An empty
/// directory still opens and closes the data channel.
pub async fn handle_nlst_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let (resolved, listener) = {
        let mut session = session.lock().await;
        let resolved = sandbox::resolve(&session.root, &session.cwd, &arg);
        (resolved, session.pasv.take())
    };
    let Some(listener) = listener else {
        warn!("NLST with no pending passive listener");
        return send_reply(writer, &Reply::action_failed("NLST")).await;
    };

    let display = sandbox::clean_reference(&arg);
    let entries = match adapter::read_dir_sorted(&resolved.path).await {
        Ok(entries) => entries,
        Err(FsError::NotFound) => {
            drop(listener);
            return send_reply(writer, &Reply::no_such_file(&display)).await;
        }
        Err(FsError::NotADirectory) => {
            drop(listener);
            return send_reply(writer, &Reply::not_a_directory(&display)).await;
        }
        Err(err) => {
            error!("NLST failed to read {:?}: {}", resolved.path, err);
            drop(listener);
            return send_reply(writer, &Reply::action_not_taken()).await;
        }
    };

    let mut payload = String::new();
    for entry in &entries {
        payload.push_str(&listing::format_name(&entry.name));
    }

    let mut data = match listener.accept().await {
        Ok(stream) => stream,
        Err(err) => {
            error!("NLST failed to accept data connection: {}", err);
            return send_reply(writer, &Reply::action_failed("NLST")).await;
        }
    };
    send_reply(writer, &Reply::accepted_data_connection()).await?;

    if let Err(err) = data.write_all(payload.as_bytes()).await {
        error!("NLST failed to stream names: {}", err);
        drop(data);
        return send_reply(writer, &Reply::action_not_taken()).await;
    }
    data.shutdown().await.ok();
    drop(data);

    send_reply(writer, &Reply::closing_data_connection()).await
}
