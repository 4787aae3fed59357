use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SYST (System) FTP command.
///
/// Always answers with the UNIX system type so clients parse `ls -l` style listings.
pub async fn handle_syst_command(
    writer: ControlWriter,
    _server: Arc<ServerContext>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    info!("Responding to SYST command with system type.");
    send_reply(&writer, 215, "UNIX Type: L8").await
}
