use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_pwd_command(
    writer: ControlWriter,
    _server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let cwd = session.lock().await.ctx.cwd.clone();
    let response = format!("\"{}\" is the current directory.", cwd);
    send_reply(&writer, 257, &response).await
}
