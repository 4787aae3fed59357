use crate::constants::{PASV_ACCEPT_TIMEOUT, POLL_INTERVAL};
use crate::core_ftpcommand::error::TransferError;
use crate::core_network::port_pool::PortPool;
use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::session::Session;
use log::{debug, info, trace, warn};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

/// How the next data connection of a session gets established.
#[derive(Debug)]
pub enum DataMode {
    /// Neither PASV nor PORT seen yet.
    Undetermined,
    /// Dial the address given by PORT.
    Active(SocketAddr),
    /// Wait for the client on our listener.
    Passive(PassiveListener),
}

/// One background accept on a passive listener, handed to the transfer that
/// needs the data connection.
#[derive(Debug)]
pub struct PendingAccept {
    stream: oneshot::Receiver<io::Result<TcpStream>>,
    task: AbortHandle,
}

/// A listener bound on a port checked out of the [`PortPool`].
#[derive(Debug)]
pub struct PassiveListener {
    port: u16,
    listener: Arc<TcpListener>,
    pending: Option<PendingAccept>,
    /// Accept tasks spawned on `listener`. Each holds a reference to it, so
    /// the socket only closes once all of them are gone.
    tasks: Vec<JoinHandle<()>>,
}

impl PassiveListener {
    /// Binds on the first free port of the pool that accepts a listener.
    ///
    /// Ports that fail to bind go back to the pool. Gives up after trying as
    /// many ports as the pool holds.
    pub async fn bind(pool: &PortPool) -> Option<Self> {
        for _ in 0..pool.capacity() {
            let port = pool.allocate().await?;
            match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
                Ok(listener) => {
                    debug!("Passive listener bound on port {}", port);
                    return Some(Self {
                        port,
                        listener: Arc::new(listener),
                        pending: None,
                        tasks: Vec::new(),
                    });
                }
                Err(e) => {
                    warn!("Failed to bind passive port {}: {}", port, e);
                    pool.release(port).await;
                }
            }
        }
        None
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Starts accepting the next inbound data connection in the background,
    /// unless an accept is already outstanding.
    pub fn start_accept(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.spawn_accept());
        }
    }

    fn take_accept(&mut self) -> PendingAccept {
        match self.pending.take() {
            Some(pending) => pending,
            None => self.spawn_accept(),
        }
    }

    fn spawn_accept(&mut self) -> PendingAccept {
        self.tasks.retain(|task| !task.is_finished());

        let listener = Arc::clone(&self.listener);
        let (sender, stream) = oneshot::channel();
        let task = tokio::spawn(async move {
            let accepted = listener.accept().await.map(|(stream, addr)| {
                debug!("Accepted data connection from {}", addr);
                stream
            });
            let _ = sender.send(accepted);
        });

        let pending = PendingAccept {
            stream,
            task: task.abort_handle(),
        };
        self.tasks.push(task);
        pending
    }

    /// Stops every accept, closes the listener and hands the port back.
    ///
    /// A transfer still waiting on this listener gets a data connection error.
    pub async fn close(mut self, pool: &PortPool) {
        self.pending = None;
        for task in self.tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
        let port = self.port;
        drop(self.listener);
        pool.release(port).await;
        debug!("Passive listener on port {} closed", port);
    }
}

/// The half-open data connection a transfer takes out of the session.
#[derive(Debug)]
pub enum DataSource {
    Passive(PendingAccept),
    Active(SocketAddr),
}

impl DataMode {
    pub fn is_passive(&self) -> bool {
        matches!(self, DataMode::Passive(_))
    }

    pub fn data_source(&mut self) -> Option<DataSource> {
        match self {
            DataMode::Undetermined => None,
            DataMode::Active(addr) => Some(DataSource::Active(*addr)),
            DataMode::Passive(listener) => Some(DataSource::Passive(listener.take_accept())),
        }
    }
}

/// Leaves passive mode, if the session is in it, returning its port to the pool.
pub async fn close_passive(data_mode: &mut DataMode, pool: &PortPool) {
    if data_mode.is_passive() {
        if let DataMode::Passive(listener) = std::mem::replace(data_mode, DataMode::Undetermined) {
            listener.close(pool).await;
        }
    }
}

/// Opens the data connection for one transfer and announces it on the
/// control channel (125 when passive, 150 when active).
pub async fn open_data_connection(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
) -> Result<TcpStream, TransferError> {
    let source = session.lock().await.data_mode.data_source();

    match source {
        None => Err(TransferError::DataConnection(
            "no PORT or PASV issued".to_string(),
        )),
        Some(DataSource::Passive(pending)) => {
            let stream = wait_for_accept(pending).await?;
            send_reply(writer, 125, "Data connection already open. Transfer starting.").await?;
            Ok(stream)
        }
        Some(DataSource::Active(addr)) => {
            let stream = TcpStream::connect(addr).await.map_err(|e| {
                TransferError::DataConnection(format!("failed to connect to {}: {}", addr, e))
            })?;
            info!("Active data connection established with {}", addr);
            send_reply(writer, 150, "File status okay; about to open data connection.").await?;
            Ok(stream)
        }
    }
}

async fn wait_for_accept(pending: PendingAccept) -> Result<TcpStream, TransferError> {
    let PendingAccept { mut stream, task } = pending;
    let deadline = Instant::now() + PASV_ACCEPT_TIMEOUT;
    loop {
        match stream.try_recv() {
            Ok(Ok(stream)) => return Ok(stream),
            Ok(Err(e)) => return Err(TransferError::DataConnection(e.to_string())),
            Err(TryRecvError::Closed) => {
                return Err(TransferError::DataConnection(
                    "passive listener closed".to_string(),
                ))
            }
            Err(TryRecvError::Empty) => {}
        }
        if Instant::now() >= deadline {
            task.abort();
            return Err(TransferError::DataConnection(
                "client did not connect before timeout".to_string(),
            ));
        }
        trace!("Waiting for passive data connection");
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
