use std::sync::Arc;

use log::{error, warn};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::core_fs::adapter::{self, DirEntry, FsError};
use crate::core_fs::listing;
use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Streams an `ls -l`-style listing over the data channel. With no argument
/// the working directory is listed; a file argument lists that single entry.
///
/// The path is validated before the data connection is touched: on refusal
/// the pending listener is dropped unconsumed and no 150 is emitted.
pub async fn handle_list_command(
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
        warn!("LIST with no pending passive listener");
        return send_reply(writer, &Reply::action_failed("LIST")).await;
    };

    let display = sandbox::clean_reference(&arg);
    let target = match adapter::stat(&resolved.path).await {
        Ok(meta) => meta,
        Err(FsError::NotFound) => {
            drop(listener);
            return send_reply(writer, &Reply::no_such_file(&display)).await;
        }
        Err(err) => {
            error!("LIST failed to stat {:?}: {}", resolved.path, err);
            drop(listener);
            return send_reply(writer, &Reply::action_failed("LIST")).await;
        }
    };

    let mut payload = String::new();
    if target.is_dir() {
        let entries = match adapter::read_dir_sorted(&resolved.path).await {
            Ok(entries) => entries,
            Err(err) => {
                error!("LIST failed to read {:?}: {}", resolved.path, err);
                drop(listener);
                return send_reply(writer, &Reply::action_not_taken()).await;
            }
        };
        for entry in &entries {
            payload.push_str(&listing::format_entry(entry));
        }
    } else {
        let name = resolved
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| display.clone());
        payload.push_str(&listing::format_entry(&DirEntry {
            name,
            metadata: target,
        }));
    }

    let mut data = match listener.accept().await {
        Ok(stream) => stream,
        Err(err) => {
            error!("LIST failed to accept data connection: {}", err);
            return send_reply(writer, &Reply::action_failed("LIST")).await;
        }
    };
    send_reply(writer, &Reply::accepted_data_connection()).await?;

    if let Err(err) = data.write_all(payload.as_bytes()).await {
        error!("LIST failed to stream listing: {}", err);
        drop(data);
        return send_reply(writer, &Reply::action_not_taken()).await;
    }
    data.shutdown().await.ok();
    drop(data);

    send_reply(writer, &Reply::closing_data_connection()).await
}
