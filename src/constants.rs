// src/constants.rs

use std::time::Duration;

/// How long a transfer waits for the client to connect to the passive listener.
pub const PASV_ACCEPT_TIMEOUT: Duration = Duration::from_secs(5);
/// Poll interval used while waiting on the passive accept and on QUIT draining.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_CONFIG_PATH: &str = "/etc/driverftpd.conf";
