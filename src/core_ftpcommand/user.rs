use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;

use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// Acknowledges the username. Authentication is permissive: any name is
/// accepted, the dialogue is a formality.
pub async fn handle_user_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    info!("USER {}", arg);
    {
        let mut session = session.lock().await;
        session.username = (!arg.is_empty()).then(|| arg.clone());
    }
    send_reply(writer, &Reply::need_password(&arg)).await
}
