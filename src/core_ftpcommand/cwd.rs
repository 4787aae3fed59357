use crate::core_ftpcommand::error::TransferError;
use crate::core_ftpcommand::utils::{authorize_path, report_failure};
use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_cwd_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    match change_directory(&server, &session, &arg).await {
        Ok(dir) => {
            info!("Directory changed to {}", dir);
            send_reply(&writer, 250, "Requested file action okay, completed.").await
        }
        Err(e) => report_failure(&writer, "CWD", &e).await,
    }
}

async fn change_directory(
    server: &ServerContext,
    session: &Arc<Mutex<Session>>,
    arg: &str,
) -> Result<String, TransferError> {
    let dir = authorize_path(server, session, arg).await?;
    let metadata = tokio::fs::metadata(&dir)
        .await
        .map_err(|e| TransferError::unavailable(&dir, e))?;
    if !metadata.is_dir() {
        return Err(TransferError::unavailable(&dir, "not a directory"));
    }
    session.lock().await.ctx.cwd = dir.clone();
    Ok(dir)
}
