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

/// Receives bytes from the data channel and writes them to a file inside the
/// sandbox. The target is created (or truncated) before the data connection
/// is accepted, so a refused store never touches the data channel.
pub async fn handle_stor_command(
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
        warn!("STOR with no pending passive listener");
        return send_reply(writer, &Reply::action_failed("STOR")).await;
    };

    if arg.is_empty() {
        drop(listener);
        return send_reply(writer, &Reply::action_failed("STOR")).await;
    }

    let display = sandbox::clean_reference(&arg);
    let mut file = match adapter::create_file(&resolved.path).await {
        Ok(file) => file,
        Err(FsError::NotFound) => {
            drop(listener);
            return send_reply(writer, &Reply::no_such_file(&display)).await;
        }
        Err(err) => {
            error!("STOR failed to create {:?}: {}", resolved.path, err);
            drop(listener);
            return send_reply(writer, &Reply::action_not_taken()).await;
        }
    };

    let mut data = match listener.accept().await {
        Ok(stream) => stream,
        Err(err) => {
            error!("STOR failed to accept data connection: {}", err);
            return send_reply(writer, &Reply::action_failed("STOR")).await;
        }
    };
    send_reply(writer, &Reply::accepted_data_connection()).await?;

    let mut buffer = vec![0u8; TRANSFER_BUFFER_SIZE];
    loop {
        let n = match data.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                error!("STOR failed reading data channel: {}", err);
                drop(data);
                return send_reply(writer, &Reply::action_not_taken()).await;
            }
        };
        if let Err(err) = file.write_all(&buffer[..n]).await {
            error!("STOR failed writing {:?}: {}", resolved.path, err);
            drop(data);
            return send_reply(writer, &Reply::action_not_taken()).await;
        }
    }
    if let Err(err) = file.flush().await {
        error!("STOR failed flushing {:?}: {}", resolved.path, err);
        drop(data);
        return send_reply(writer, &Reply::action_not_taken()).await;
    }
    drop(data);
    info!("Stored file {:?}", resolved.path);

    send_reply(writer, &Reply::transfer_complete()).await
}
