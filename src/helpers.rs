use tokio::io::AsyncWriteExt;

use crate::core_reply::Reply;
use crate::session::ControlWriter;

/// Writes one reply line to the control channel.
pub async fn send_reply(writer: &ControlWriter, reply: &Reply) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.write_all(reply.as_line().as_bytes()).await
}
