use crate::core_ftpcommand::handlers::{dispatch, initialize_command_handlers, CommandHandlers};
use crate::core_ftpcommand::quit::drain_and_close;
use crate::core_network::data_connection::close_passive;
use crate::core_network::{ControlStream, ControlWriter};
use crate::core_tls::TlsConnection;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use anyhow::Result;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, ReadHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

pub type ControlReader = BufReader<ReadHalf<ControlStream>>;

pub async fn accept_loop(
    listener: TcpListener,
    server: Arc<ServerContext>,
    tls: TlsConnection,
) -> Result<()> {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!("New connection from {}", addr);

        let server = Arc::clone(&server);
        let tls = tls.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_socket(socket, addr, server, tls).await {
                warn!("Connection error for {}: {}", addr, e);
            }
            info!("Connection closed for {}", addr);
        });
    }
}

async fn serve_socket(
    socket: TcpStream,
    peer: SocketAddr,
    server: Arc<ServerContext>,
    tls: TlsConnection,
) -> Result<()> {
    let local = socket.local_addr()?;
    let stream: ControlStream = if tls.is_enabled() {
        Box::new(tls.accept_tls(socket).await?)
    } else {
        Box::new(socket)
    };
    handle_connection(stream, peer, local, server).await?;
    Ok(())
}

/// Runs one control connection from the greeting to the close.
pub async fn handle_connection(
    stream: ControlStream,
    peer: SocketAddr,
    local: SocketAddr,
    server: Arc<ServerContext>,
) -> Result<(), std::io::Error> {
    let (reader, writer) = tokio::io::split(stream);
    let writer: ControlWriter = Arc::new(Mutex::new(writer));
    let mut reader = BufReader::new(reader);

    let session = Arc::new(Mutex::new(Session::new(
        &server.settings.public_directory,
        peer,
        local,
    )));

    let ctx = session.lock().await.ctx.clone();
    match server.driver.welcome(&ctx).await {
        Ok(message) => send_reply(&writer, 220, &message).await?,
        Err(e) => {
            warn!("Driver refused connection from {}: {}", peer, e);
            return send_reply(&writer, 500, "Syntax error, command unrecognized.").await;
        }
    }

    let handlers = initialize_command_handlers();
    let result = command_loop(&mut reader, &writer, &server, &session, &handlers).await;

    close_passive(&mut session.lock().await.data_mode, &server.port_pool).await;
    result
}

async fn command_loop(
    reader: &mut ControlReader,
    writer: &ControlWriter,
    server: &Arc<ServerContext>,
    session: &Arc<Mutex<Session>>,
    handlers: &CommandHandlers,
) -> Result<(), std::io::Error> {
    let peer = session.lock().await.ctx.peer_addr;

    loop {
        let line = match read_command_line(reader).await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Client {} disconnected", peer);
                return Ok(());
            }
            Err(e) => {
                warn!("Terminating connection with {}: {}", peer, e);
                return Ok(());
            }
        };

        if dispatch(handlers, writer, server, session, &line).await? {
            return drain_and_close(reader, writer, server, session, handlers).await;
        }
    }
}

/// Reads one control line; `None` on end of stream. Invalid UTF-8 is
/// replaced rather than treated as an error.
pub async fn read_command_line(
    reader: &mut ControlReader,
) -> Result<Option<String>, std::io::Error> {
    let mut buffer = Vec::new();
    let n = reader.read_until(b'\n', &mut buffer).await?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
}
