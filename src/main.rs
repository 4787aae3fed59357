use anyhow::{Context, Result};
use clap::Parser;
use driverftpd::core_auth::helper::hash_password;
use driverftpd::core_cli::Cli;
use driverftpd::{server, Config, SampleDriver};
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if let Some(password) = args.hash_password.as_deref() {
        let hashed = hash_password(password).context("Failed to hash password")?;
        println!("{}", hashed);
        return Ok(());
    }

    // Initialize the logger with a custom format
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        let timestamp = buf.timestamp();
        writeln!(
            buf,
            "[{}] [{}] {}",
            timestamp,
            record.level(),
            record.args()
        )
    });
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    let mut config = load_config(&args.config)?;
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }

    let driver = SampleDriver::new(config)
        .await
        .context("Failed to initialize the sample driver")?;

    server::run(Arc::new(driver)).await
}

fn load_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    let config = Config::from_toml(&config_str)
        .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;
    Ok(config)
}
