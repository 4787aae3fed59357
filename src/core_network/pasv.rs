use crate::core_network::data_connection::{DataMode, PassiveListener};
use crate::core_network::ip::{encode_pasv_address, pasv_reply_ip};
use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PASV command.
///
/// Binds a listener on a pooled port the first time, then (re)arms a
/// background accept so the control loop keeps running while the client
/// connects.
pub async fn handle_pasv_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let (port, peer, local) = {
        let mut session = session.lock().await;

        let mut listener = match std::mem::replace(&mut session.data_mode, DataMode::Undetermined) {
            DataMode::Passive(listener) => listener,
            previous => match PassiveListener::bind(&server.port_pool).await {
                Some(listener) => listener,
                None => {
                    session.data_mode = previous;
                    drop(session);
                    warn!("No passive port could be bound");
                    return send_reply(&writer, 425, "Can't open data connection.").await;
                }
            },
        };
        listener.start_accept();
        let port = listener.port();
        session.data_mode = DataMode::Passive(listener);

        (port, session.ctx.peer_addr, session.local_addr)
    };

    let ip = pasv_reply_ip(peer.ip(), local.ip(), server.settings.public_ip);
    debug!("PASV for {} on {}:{}", peer, ip, port);
    let reply = format!("Entering Passive Mode {}.", encode_pasv_address(ip, port));
    send_reply(&writer, 227, &reply).await
}
