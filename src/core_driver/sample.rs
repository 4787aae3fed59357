use crate::config::{AccessControlSettings, Config, ServerSettings};
use crate::core_auth::core_auth::PasswdEntry;
use crate::core_auth::helper::{load_passwd_file, verify_password};
use crate::core_driver::driver::ServerDriver;
use crate::core_driver::error::DriverError;
use crate::core_tls::TlsConfig;
use crate::session::UserContext;
use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio_rustls::rustls;

/// Reference driver backed by the TOML configuration file.
///
/// Without a passwd file every user/password pair is accepted.
///
/// The connection count only drops in `bye`, which runs after QUIT. Clients
/// that disconnect without QUIT keep their slot, so once `max_connections`
/// of them have gone away every new connection is refused with a 500.
pub struct SampleDriver {
    config: Config,
    users: Option<HashMap<String, PasswdEntry>>,
    num_clients: AtomicU32,
}

impl SampleDriver {
    pub async fn new(config: Config) -> Result<Self, DriverError> {
        let users = match &config.server.passwd_file {
            Some(path) => {
                let users = load_passwd_file(path).await.map_err(|source| DriverError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                info!("Loaded {} user(s) from {:?}", users.len(), path);
                Some(users)
            }
            None => {
                warn!("No passwd file configured, every login will be accepted");
                None
            }
        };

        Ok(Self {
            config,
            users,
            num_clients: AtomicU32::new(0),
        })
    }

    pub fn connected_clients(&self) -> u32 {
        self.num_clients.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServerDriver for SampleDriver {
    async fn welcome(&self, _ctx: &UserContext) -> Result<String, DriverError> {
        let max = self.config.server.max_connections;
        if self.num_clients.fetch_add(1, Ordering::SeqCst) + 1 > max {
            self.num_clients.fetch_sub(1, Ordering::SeqCst);
            return Err(DriverError::TooManyConnections(max));
        }
        Ok("Welcome".to_string())
    }

    async fn bye(&self, _ctx: &UserContext) -> Result<String, DriverError> {
        // Saturating at zero.
        let _ = self
            .num_clients
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        Ok("Bye".to_string())
    }

    async fn auth_user(
        &self,
        _ctx: &UserContext,
        user: &str,
        pass: &str,
    ) -> Result<bool, DriverError> {
        let users = match &self.users {
            Some(users) => users,
            None => return Ok(true),
        };
        let entry = match users.get(user) {
            Some(entry) => entry.clone(),
            None => return Ok(false),
        };

        // bcrypt verification is CPU bound.
        let pass = pass.to_string();
        tokio::task::spawn_blocking(move || verify_password(&pass, entry.get_hashed_password()))
            .await
            .map_err(|e| DriverError::AuthBackend(e.to_string()))
    }

    async fn settings(&self) -> Result<ServerSettings, DriverError> {
        Ok(self.config.server.to_settings()?)
    }

    async fn access_control_settings(&self) -> Result<AccessControlSettings, DriverError> {
        Ok(self.config.access.clone())
    }

    async fn tls_config(&self) -> Result<Option<Arc<rustls::ServerConfig>>, DriverError> {
        match &self.config.tls {
            Some(files) => {
                let tls = TlsConfig::new(&files.cert_file, &files.key_file);
                Ok(Some(tls.load_server_config()?))
            }
            None => Ok(None),
        }
    }
}
