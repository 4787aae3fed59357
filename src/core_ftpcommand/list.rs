use crate::core_ftpcommand::error::TransferError;
use crate::core_ftpcommand::utils::{authorize_path, spawn_transfer};
use crate::core_network::data_connection::open_data_connection;
use crate::core_network::ControlWriter;
use crate::server::ServerContext;
use crate::session::Session;
use log::info;
use std::io;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Handles the LIST FTP command. The listing is produced by `ls -l` and sent
/// over the data connection with CRLF line endings.
pub async fn handle_list_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let transfer = {
        let writer = Arc::clone(&writer);
        let session = Arc::clone(&session);
        async move { list(&writer, &server, &session, &arg).await }
    };
    spawn_transfer("LIST", writer, &session, transfer).await;
    Ok(())
}

async fn list(
    writer: &ControlWriter,
    server: &ServerContext,
    session: &Arc<Mutex<Session>>,
    arg: &str,
) -> Result<(), TransferError> {
    let path = authorize_path(server, session, strip_list_options(arg)).await?;
    let listing = directory_listing(&path).await?;

    let mut data = open_data_connection(writer, session).await?;
    data.write_all(listing.as_bytes()).await?;
    data.shutdown().await?;

    info!("Listed {}", path);
    Ok(())
}

async fn directory_listing(path: &str) -> Result<String, TransferError> {
    let output = Command::new("ls").arg("-l").arg(path).output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TransferError::Local(io::Error::new(
            io::ErrorKind::Other,
            format!("ls exited with {}: {}", output.status, stderr.trim()),
        )));
    }
    Ok(to_crlf(&String::from_utf8_lossy(&output.stdout)))
}

/// Drops the leading `ls` style options (`-la`) many clients send with LIST.
fn strip_list_options(arg: &str) -> &str {
    let mut rest = arg.trim_start();
    while rest.starts_with('-') {
        rest = match rest.split_once(char::is_whitespace) {
            Some((_, tail)) => tail.trim_start(),
            None => "",
        };
    }
    rest
}

fn to_crlf(text: &str) -> String {
    text.lines().map(|line| format!("{}\r\n", line)).collect()
}
