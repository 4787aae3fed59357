//! FTP server engine. The protocol and transport are fixed; identity,
//! storage policy and network settings come from a [`core_driver::ServerDriver`].

pub mod config;
pub mod constants;
pub mod core_access;
pub mod core_auth;
pub mod core_cli;
pub mod core_driver;
pub mod core_ftpcommand;
pub mod core_network;
pub mod core_tls;
pub mod helpers;
pub mod server;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{Config, ServerSettings};
pub use core_driver::{DriverError, SampleDriver, ServerDriver};
pub use server::{run, Server, ServerContext};
