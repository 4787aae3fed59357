use crate::core_ftpcommand::error::TransferError;
use crate::core_ftpcommand::utils::{authorize_path, report_failure};
use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::info;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SIZE FTP command.
///
/// A regular file reports its length, a directory the total size of the
/// files below it.
pub async fn handle_size_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    match size(&server, &session, &arg).await {
        Ok(bytes) => send_reply(&writer, 213, &bytes.to_string()).await,
        Err(e) => report_failure(&writer, "SIZE", &e).await,
    }
}

async fn size(
    server: &ServerContext,
    session: &Arc<Mutex<Session>>,
    arg: &str,
) -> Result<u64, TransferError> {
    let path = authorize_path(server, session, arg).await?;
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| TransferError::unavailable(&path, e))?;

    let bytes = if metadata.is_dir() {
        let dir = path.clone();
        tokio::task::spawn_blocking(move || disk_usage(Path::new(&dir)))
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??
    } else {
        metadata.len()
    };

    info!("Size of {} is {}", path, bytes);
    Ok(bytes)
}

/// Sum of the sizes of every regular file under `dir`. Symlinks are not followed.
fn disk_usage(dir: &Path) -> Result<u64, std::io::Error> {
    let mut total = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            total += disk_usage(&entry.path())?;
        } else if file_type.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}
