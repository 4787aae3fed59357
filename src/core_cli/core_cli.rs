use crate::constants::DEFAULT_CONFIG_PATH;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "driverftpd", about = "A driver based FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Control port, overrides `listen_port` from the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the bcrypt hash of the given password for the passwd file and exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,
}
