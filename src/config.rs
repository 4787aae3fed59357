use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("start port {0} is a privileged port")]
    PrivilegedPort(u16),

    #[error("end port {end} is smaller than start port {start}")]
    InvertedRange { start: u16, end: u16 },

    #[error("invalid public IP address: {0}")]
    InvalidPublicIp(String),
}

/// Inclusive range of ports reserved for passive data listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self, ConfigError> {
        if start <= 1024 {
            return Err(ConfigError::PrivilegedPort(start));
        }
        if end < start {
            return Err(ConfigError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }

    pub fn ports(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

/// Settings handed over by the driver at startup. Read-only afterwards.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Directory every session starts in; reset to it on REIN.
    pub public_directory: String,
    /// Port listening to control connections. `0` lets the OS pick one.
    pub listening_port: u16,
    /// Address advertised in PASV replies to peers outside private networks.
    pub public_ip: Ipv4Addr,
    pub data_port_range: PortRange,
}

/// Scope key of the rules that apply to every authenticated user.
pub const ALL_SCOPE: &str = "all";

pub type AccessControlSettings = HashMap<String, Vec<String>>;

// ---------------------------------------------------------------------------
// TOML model used by the sample driver and the binary.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_port: u16,
    pub public_ip: String,
    pub public_directory: String,
    pub data_port_start: u16,
    pub data_port_end: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    pub passwd_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TlsFiles {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub access: AccessControlSettings,
    pub tls: Option<TlsFiles>,
}

fn default_max_connections() -> u32 {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: 2121,
            public_ip: String::from("127.0.0.1"),
            public_directory: String::from("/srv/ftp"),
            data_port_start: 8000,
            data_port_end: 8050,
            max_connections: default_max_connections(),
            passwd_file: None,
        }
    }
}

impl ServerConfig {
    /// Validates the raw TOML values into engine settings.
    pub fn to_settings(&self) -> Result<ServerSettings, ConfigError> {
        let public_ip = self
            .public_ip
            .parse::<Ipv4Addr>()
            .map_err(|_| ConfigError::InvalidPublicIp(self.public_ip.clone()))?;
        Ok(ServerSettings {
            public_directory: self.public_directory.clone(),
            listening_port: self.listen_port,
            public_ip,
            data_port_range: PortRange::new(self.data_port_start, self.data_port_end)?,
        })
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
