use crate::core_tls::error::TlsError;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::{rustls, server::TlsStream, TlsAcceptor};

/// Wraps accepted control connections when the driver supplied a TLS config.
#[derive(Clone)]
pub struct TlsConnection {
    tls_acceptor: Option<TlsAcceptor>,
}

impl TlsConnection {
    pub fn new(config: Option<Arc<rustls::ServerConfig>>) -> Self {
        Self {
            tls_acceptor: config.map(TlsAcceptor::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tls_acceptor.is_some()
    }

    pub async fn accept_tls(&self, stream: TcpStream) -> Result<TlsStream<TcpStream>, TlsError> {
        let acceptor = match &self.tls_acceptor {
            Some(a) => a,
            None => {
                return Err(TlsError::TlsConfigError(
                    "TLS not configured".to_string(),
                ))
            }
        };

        acceptor
            .accept(stream)
            .await
            .map_err(|e| TlsError::TlsHandshakeError(e.to_string()))
    }
}
