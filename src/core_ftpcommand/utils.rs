use crate::core_ftpcommand::error::TransferError;
use crate::core_network::ControlWriter;
use crate::helpers::{resolve_path, send_reply};
use crate::server::ServerContext;
use crate::session::Session;
use log::{info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Resolves `arg` against the session's working directory and checks the
/// result against the access rules.
pub async fn authorize_path(
    server: &ServerContext,
    session: &Arc<Mutex<Session>>,
    arg: &str,
) -> Result<String, TransferError> {
    let (path, user) = {
        let session = session.lock().await;
        (resolve_path(&session.ctx.cwd, arg), session.ctx.user.clone())
    };
    if !server.access.is_allowed(&path, user.as_deref()) {
        return Err(TransferError::AccessDenied(path));
    }
    Ok(path)
}

/// Sends the reply matching a failed command.
pub async fn report_failure(
    writer: &ControlWriter,
    command: &str,
    err: &TransferError,
) -> Result<(), std::io::Error> {
    warn!("{} failed: {}", command, err);
    let (code, message) = err.reply();
    send_reply(writer, code, message).await
}

/// Runs a data transfer in its own task so the control loop keeps reading
/// commands. The session counts the transfer as in flight until the task
/// ends, whatever the outcome; success is answered with 226.
pub async fn spawn_transfer<F>(
    command: &'static str,
    writer: ControlWriter,
    session: &Arc<Mutex<Session>>,
    transfer: F,
) where
    F: Future<Output = Result<(), TransferError>> + Send + 'static,
{
    let guard = session.lock().await.transfers().start();

    tokio::spawn(async move {
        let _guard = guard;
        let sent = match transfer.await {
            Ok(()) => {
                info!("{} completed", command);
                send_reply(
                    &writer,
                    226,
                    "Closing data connection. Requested file action successful.",
                )
                .await
            }
            Err(e) => report_failure(&writer, command, &e).await,
        };
        if let Err(e) = sent {
            warn!("Failed to send {} reply: {}", command, e);
        }
    });
}
