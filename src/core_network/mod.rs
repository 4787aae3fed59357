pub mod data_connection;
pub mod ip;
pub mod network;
pub mod pasv;
pub mod port;
pub mod port_pool;

use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, WriteHalf};
use tokio::sync::Mutex;

/// Anything a control connection can run over: plain TCP or TLS.
pub trait ControlIo: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ControlIo for T {}

pub type ControlStream = Box<dyn ControlIo>;

/// Write side of the control connection, shared by the command loop and the
/// transfer tasks of the same session.
pub type ControlWriter = Arc<Mutex<WriteHalf<ControlStream>>>;
