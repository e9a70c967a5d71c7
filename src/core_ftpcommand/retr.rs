use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::constants::TRANSFER_BUFFER_SIZE;
use crate::core_fs::adapter::{self, FsError};
use crate::core_fs::sandbox;
use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Streams a regular file's contents over the data channel.
///
/// The file is opened before the data connection is accepted: a refused
/// retrieval (missing path, directory) answers on the control channel only,
/// with no 150 and no accept, and the pending listener is dropped.
pub async fn handle_retr_command(
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
        warn!("RETR with no pending passive listener");
        return send_reply(writer, &Reply::action_failed("RETR")).await;
    };

    if arg.is_empty() {
        drop(listener);
        return send_reply(writer, &Reply::action_failed("RETR")).await;
    }

    let display = sandbox::clean_reference(&arg);
    let mut file = match adapter::open_file(&resolved.path).await {
        Ok(file) => file,
        Err(FsError::NotFound) => {
            drop(listener);
            return send_reply(writer, &Reply::no_such_file(&display)).await;
        }
        Err(FsError::NotAFile) => {
            drop(listener);
            return send_reply(writer, &Reply::retrieve_regular_files_only()).await;
        }
        Err(err) => {
            error!("RETR failed to open {:?}: {}", resolved.path, err);
            drop(listener);
            return send_reply(writer, &Reply::action_failed("RETR")).await;
        }
    };

    let mut data = match listener.accept().await {
        Ok(stream) => stream,
        Err(err) => {
            error!("RETR failed to accept data connection: {}", err);
            return send_reply(writer, &Reply::action_failed("RETR")).await;
        }
    };
    send_reply(writer, &Reply::accepted_data_connection()).await?;
    info!("Sending file {:?}", resolved.path);

    let mut buffer = vec![0u8; TRANSFER_BUFFER_SIZE];
    loop {
        let n = match file.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                error!("RETR failed reading {:?}: {}", resolved.path, err);
                drop(data);
                return send_reply(writer, &Reply::action_not_taken()).await;
            }
        };
        if let Err(err) = data.write_all(&buffer[..n]).await {
            error!("RETR failed writing data channel: {}", err);
            drop(data);
            return send_reply(writer, &Reply::action_not_taken()).await;
        }
    }
    data.shutdown().await.ok();
    drop(data);

    send_reply(writer, &Reply::transfer_complete()).await
}
