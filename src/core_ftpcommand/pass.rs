use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PASS FTP command by asking the driver to authenticate the
/// username given with USER.
pub async fn handle_pass_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    password: String,
) -> Result<(), std::io::Error> {
    if password.is_empty() {
        return send_reply(&writer, 501, "Syntax error in parameters or arguments.").await;
    }

    let ctx = session.lock().await.ctx.clone();
    let username = match &ctx.user {
        Some(username) => username.clone(),
        None => return send_reply(&writer, 503, "Bad sequence of commands.").await,
    };

    let accepted = match server.driver.auth_user(&ctx, &username, &password).await {
        Ok(accepted) => accepted,
        Err(e) => {
            warn!("Authentication of {} failed: {}", username, e);
            false
        }
    };

    let mut session = session.lock().await;
    if accepted {
        session.logged_in = true;
        drop(session);
        info!("User {} logged in from {}", username, ctx.peer_addr);
        send_reply(&writer, 230, "User logged in, proceed.").await
    } else {
        session.ctx.user = None;
        drop(session);
        warn!("Login refused for {} from {}", username, ctx.peer_addr);
        send_reply(&writer, 530, "Not logged in.").await
    }
}
