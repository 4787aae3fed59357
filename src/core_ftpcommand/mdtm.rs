use crate::core_ftpcommand::error::TransferError;
use crate::core_ftpcommand::utils::{authorize_path, report_failure};
use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use chrono::{DateTime, Utc};
use filetime::FileTime;
use log::info;
use std::io::{self, ErrorKind};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the MDTM FTP command: last modification time as `YYYYMMDDHHMMSS` (UTC).
pub async fn handle_mdtm_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    match modification_time(&server, &session, &arg).await {
        Ok(timestamp) => send_reply(&writer, 213, &timestamp).await,
        Err(e) => report_failure(&writer, "MDTM", &e).await,
    }
}

async fn modification_time(
    server: &ServerContext,
    session: &Arc<Mutex<Session>>,
    arg: &str,
) -> Result<String, TransferError> {
    let path = authorize_path(server, session, arg).await?;
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| TransferError::unavailable(&path, e))?;

    let modified = FileTime::from_last_modification_time(&metadata);
    let timestamp = format_mdtm(modified.unix_seconds()).ok_or_else(|| {
        io::Error::new(ErrorKind::InvalidData, "modification time out of range")
    })?;

    info!("Modification time of {} is {}", path, timestamp);
    Ok(timestamp)
}

fn format_mdtm(unix_seconds: i64) -> Option<String> {
    let datetime: DateTime<Utc> = DateTime::from_timestamp(unix_seconds, 0)?;
    Some(datetime.format("%Y%m%d%H%M%S").to_string())
}
