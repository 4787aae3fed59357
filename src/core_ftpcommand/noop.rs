use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_noop_command(
    writer: ControlWriter,
    _server: Arc<ServerContext>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_reply(&writer, 200, "Command okay.").await
}
