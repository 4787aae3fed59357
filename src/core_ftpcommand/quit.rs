use crate::constants::POLL_INTERVAL;
use crate::core_ftpcommand::handlers::{dispatch, CommandHandlers};
use crate::core_network::network::{read_command_line, ControlReader};
use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::{Session, TransferTracker};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Handles the QUIT FTP command.
///
/// Only marks the session as closing; the connection loop then hands over to
/// [`drain_and_close`], which sends the 221 once running transfers are done.
pub async fn handle_quit_command(
    _writer: ControlWriter,
    _server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    session.closing = true;
    info!(
        "Received QUIT from {}, {} transfer(s) in flight",
        session.ctx.peer_addr,
        session.transfers().in_flight()
    );
    Ok(())
}

/// Waits for the session's transfers to finish, then says goodbye.
///
/// Lines arriving in the meantime are still dispatched so the client gets a
/// 421 for each of them. If the client goes away the drain carries on
/// regardless and the driver's `bye` hook still runs.
pub async fn drain_and_close(
    reader: &mut ControlReader,
    writer: &ControlWriter,
    server: &Arc<ServerContext>,
    session: &Arc<Mutex<Session>>,
    handlers: &CommandHandlers,
) -> Result<(), std::io::Error> {
    let (tracker, peer) = {
        let session = session.lock().await;
        (session.transfers(), session.ctx.peer_addr)
    };

    let drained = wait_until_idle(tracker);
    tokio::pin!(drained);
    let mut reading = true;
    let mut idle = false;

    while reading {
        tokio::select! {
            _ = &mut drained => {
                idle = true;
                break;
            }
            line = read_command_line(reader) => match line {
                Ok(Some(line)) => {
                    if let Err(e) = dispatch(handlers, writer, server, session, &line).await {
                        warn!("Control channel to {} failed while draining: {}", peer, e);
                        reading = false;
                    }
                }
                Ok(None) => {
                    debug!("Client {} hung up while draining", peer);
                    reading = false;
                }
                Err(e) => {
                    warn!("Read error from {} while draining: {}", peer, e);
                    reading = false;
                }
            },
        }
    }
    if !idle {
        drained.await;
    }

    let ctx = session.lock().await.ctx.clone();
    if let Err(e) = server.driver.bye(&ctx).await {
        warn!("Driver bye hook failed for {}: {}", peer, e);
    }

    send_reply(
        writer,
        221,
        "Service closing control connection. Logged out if appropriate.",
    )
    .await?;
    writer.lock().await.shutdown().await?;
    info!("Session with {} closed after QUIT", peer);
    Ok(())
}

async fn wait_until_idle(tracker: TransferTracker) {
    while !tracker.is_idle() {
        debug!("Waiting for {} transfer(s) to finish", tracker.in_flight());
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
