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

/// Handles the STOR (Store File) FTP command.
///
/// The destination is created or truncated before the data connection is
/// opened. Bytes already written stay on disk if the upload breaks off.
pub async fn handle_stor_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let transfer = {
        let writer = Arc::clone(&writer);
        let session = Arc::clone(&session);
        async move { store(&writer, &server, &session, &arg).await }
    };
    spawn_transfer("STOR", writer, &session, transfer).await;
    Ok(())
}

async fn store(
    writer: &ControlWriter,
    server: &ServerContext,
    session: &Arc<Mutex<Session>>,
    arg: &str,
) -> Result<(), TransferError> {
    let path = authorize_path(server, session, arg).await?;

    let mut file = File::create(&path)
        .await
        .map_err(|e| TransferError::unavailable(&path, e))?;

    let mut data = open_data_connection(writer, session).await?;
    let received = tokio::io::copy(&mut data, &mut file).await?;
    file.flush().await?;

    info!("Stored {} ({} bytes)", path, received);
    Ok(())
}
