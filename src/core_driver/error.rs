use crate::config::ConfigError;
use crate::core_tls::TlsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Maximum number of connections {0} reached")]
    TooManyConnections(u32),

    #[error("Authentication backend failure: {0}")]
    AuthBackend(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
