use crate::core_network::data_connection::{close_passive, DataMode};
use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::{info, warn};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Parses `h1,h2,h3,h4,p1,p2` into `h1.h2.h3.h4:(p1*256+p2)`.
pub fn parse_port_argument(arg: &str) -> Option<SocketAddrV4> {
    let fields: Vec<u8> = arg
        .split(',')
        .map(|field| field.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    if fields.len() != 6 {
        return None;
    }
    let ip = Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]);
    let port = u16::from(fields[4]) * 256 + u16::from(fields[5]);
    Some(SocketAddrV4::new(ip, port))
}

/// Handles the PORT (active mode) command.
///
/// Leaving passive mode closes the listener and returns its port to the pool.
/// The client is only dialled when a transfer needs the data connection.
pub async fn handle_port_command(
    writer: ControlWriter,
    server: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let addr = match parse_port_argument(&arg) {
        Some(addr) => addr,
        None => {
            warn!("Malformed PORT argument: {:?}", arg);
            return send_reply(&writer, 501, "Syntax error in parameters or arguments.").await;
        }
    };

    {
        let mut session = session.lock().await;
        close_passive(&mut session.data_mode, &server.port_pool).await;
        session.data_mode = DataMode::Active(SocketAddr::V4(addr));
    }

    info!("Active mode data address set to {}", addr);
    send_reply(&writer, 200, "Command okay.").await
}
