use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the REIN FTP command: logs the user out and resets the working
/// directory, keeping the control connection open.
pub async fn handle_rein_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    {
        let mut session = session.lock().await;
        info!("Reinitializing session for {}", session.ctx.peer_addr);
        session.reinitialize(&server.settings.public_directory);
    }
    send_reply(&writer, 200, "Command okay.").await
}
