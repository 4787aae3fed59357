use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the USER FTP command.
///
/// Stores the username and asks for the password. A new USER always starts a
/// fresh login, even on a session that was already authenticated.
pub async fn handle_user_command(
    writer: ControlWriter,
    _server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    username: String,
) -> Result<(), std::io::Error> {
    let username = username.trim();
    if username.is_empty() {
        return send_reply(&writer, 501, "Syntax error in parameters or arguments.").await;
    }

    info!("Received USER command with username: {}", username);
    {
        let mut session = session.lock().await;
        session.ctx.user = Some(username.to_string());
        session.logged_in = false;
    }

    send_reply(&writer, 331, "User name okay, need password.").await
}
