use crate::config::ServerSettings;
use crate::core_access::AccessControl;
use crate::core_driver::ServerDriver;
use crate::core_network::network;
use crate::core_network::port_pool::PortPool;
use crate::core_tls::TlsConnection;
use anyhow::{Context, Result};
use log::{error, info};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

/// State shared by every session: read-only settings and access rules, the
/// port pool (internally locked) and the driver.
pub struct ServerContext {
    pub settings: ServerSettings,
    pub access: AccessControl,
    pub port_pool: PortPool,
    pub driver: Arc<dyn ServerDriver>,
}

impl ServerContext {
    /// Pulls settings and access rules from the driver.
    pub async fn from_driver(driver: Arc<dyn ServerDriver>) -> Result<Self> {
        let settings = driver
            .settings()
            .await
            .context("Failed to get server settings from driver")?;
        let access = driver
            .access_control_settings()
            .await
            .context("Failed to get access control settings from driver")?;

        Ok(Self {
            port_pool: PortPool::new(settings.data_port_range),
            settings,
            access: AccessControl::new(access),
            driver,
        })
    }
}

pub struct Server {
    listener: TcpListener,
    context: Arc<ServerContext>,
    tls: TlsConnection,
}

impl Server {
    /// Configures the server from the driver and binds the control listener.
    pub async fn new(driver: Arc<dyn ServerDriver>) -> Result<Self> {
        let context = ServerContext::from_driver(Arc::clone(&driver)).await?;
        let tls_config = driver
            .tls_config()
            .await
            .context("Failed to get TLS configuration from driver")?;
        let tls = TlsConnection::new(tls_config);

        let port = context.settings.listening_port;
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .with_context(|| format!("Failed to bind control port {}", port))?;

        log_settings(&context.settings, tls.is_enabled());

        Ok(Self {
            listener,
            context: Arc::new(context),
            tls,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn context(&self) -> Arc<ServerContext> {
        Arc::clone(&self.context)
    }

    /// Accepts control connections until the process exits.
    pub async fn run(self) -> Result<()> {
        info!("Server listening on {}", self.local_addr()?);
        network::accept_loop(self.listener, self.context, self.tls).await
    }
}

/// Runs an FTP server configured by `driver`.
///
/// Startup failures (settings, TLS, bind) are returned; per-session failures
/// are only logged.
pub async fn run(driver: Arc<dyn ServerDriver>) -> Result<()> {
    let server = match Server::new(driver).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {:#}", e);
            return Err(e);
        }
    };
    server.run().await
}

fn log_settings(settings: &ServerSettings, tls: bool) {
    info!("  Listen Port: {}", settings.listening_port);
    info!("  Public IP: {}", settings.public_ip);
    info!("  Public Directory: {}", settings.public_directory);
    info!(
        "  Data Ports: {}-{}",
        settings.data_port_range.start(),
        settings.data_port_range.end()
    );
    info!("  TLS: {}", if tls { "enabled" } else { "disabled" });
}
