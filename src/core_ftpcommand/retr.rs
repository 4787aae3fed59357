use crate::core_ftpcommand::error::TransferError;
use crate::core_ftpcommand::utils::{authorize_path, spawn_transfer};
use crate::core_network::data_connection::open_data_connection;
use crate::core_network::ControlWriter;
use crate::server::ServerContext;
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Handles the RETR (Retrieve) FTP command.
///
/// The file is streamed to the client from a separate task; the control
/// connection keeps accepting commands meanwhile.
pub async fn handle_retr_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let transfer = {
        let writer = Arc::clone(&writer);
        let session = Arc::clone(&session);
        async move { retrieve(&writer, &server, &session, &arg).await }
    };
    spawn_transfer("RETR", writer, &session, transfer).await;
    Ok(())
}

async fn retrieve(
    writer: &ControlWriter,
    server: &ServerContext,
    session: &Arc<Mutex<Session>>,
    arg: &str,
) -> Result<(), TransferError> {
    let path = authorize_path(server, session, arg).await?;

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| TransferError::unavailable(&path, e))?;
    if !metadata.is_file() {
        return Err(TransferError::NotAFile(path));
    }
    let mut file = File::open(&path)
        .await
        .map_err(|e| TransferError::unavailable(&path, e))?;

    let mut data = open_data_connection(writer, session).await?;
    let sent = tokio::io::copy(&mut file, &mut data).await?;
    data.shutdown().await?;

    info!("Sent {} ({} bytes)", path, sent);
    Ok(())
}
