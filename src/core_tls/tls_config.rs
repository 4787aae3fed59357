use crate::core_tls::error::TlsError;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_rustls::rustls::{self, pki_types::CertificateDer};

/// PEM files backing the control channel's TLS identity.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl TlsConfig {
    pub fn new(cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        Self {
            cert_file: cert_file.into(),
            key_file: key_file.into(),
        }
    }

    /// Checks that both files exist before trying to parse them.
    pub fn validate(&self) -> Result<(), TlsError> {
        if !self.cert_file.exists() {
            return Err(TlsError::CertificateLoadError(format!(
                "Certificate file not found: {:?}",
                self.cert_file
            )));
        }
        if !self.key_file.exists() {
            return Err(TlsError::PrivateKeyLoadError(format!(
                "Private key file not found: {:?}",
                self.key_file
            )));
        }
        Ok(())
    }

    /// Loads the certificate chain and private key into a rustls server config.
    pub fn load_server_config(&self) -> Result<Arc<rustls::ServerConfig>, TlsError> {
        self.validate()?;

        let cert_file = File::open(&self.cert_file)
            .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
        let certs: Vec<CertificateDer<'static>> =
            rustls_pemfile::certs(&mut BufReader::new(cert_file))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
        if certs.is_empty() {
            return Err(TlsError::CertificateLoadError(format!(
                "No certificate found in {:?}",
                self.cert_file
            )));
        }

        let key_file = File::open(&self.key_file)
            .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
        let private_key = rustls_pemfile::private_key(&mut BufReader::new(key_file))
            .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?
            .ok_or_else(|| TlsError::PrivateKeyLoadError("No private key found".to_string()))?;

        let config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, private_key)
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?;

        info!("TLS certificate loaded from {:?}", self.cert_file);
        Ok(Arc::new(config))
    }
}
