use crate::core_network::ControlWriter;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::Session;
use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Replies 200 when the first token of `arg` is one of `accepted`, 504 for
/// any other value and 501 when no value is given. Nothing is stored: the
/// server only ever streams bytes unchanged.
async fn accept_parameter(
    writer: &ControlWriter,
    command: &str,
    arg: &str,
    accepted: &[&str],
) -> Result<(), std::io::Error> {
    let value = match arg.split_whitespace().next() {
        Some(value) => value.to_ascii_uppercase(),
        None => return send_reply(writer, 501, "Syntax error in parameters or arguments.").await,
    };

    if accepted.contains(&value.as_str()) {
        debug!("{} set to {}", command, value);
        send_reply(writer, 200, "Command okay.").await
    } else {
        send_reply(writer, 504, "Command not implemented for that parameter.").await
    }
}

/// Handles the TYPE FTP command. ASCII (`A`) and image (`I`) are accepted.
pub async fn handle_type_command(
    writer: ControlWriter,
    _server: Arc<ServerContext>,
    _session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    accept_parameter(&writer, "TYPE", &arg, &["A", "I"]).await
}

/// Handles the STRU FTP command. Only file structure (`F`) is supported.
pub async fn handle_stru_command(
    writer: ControlWriter,
    _server: Arc<ServerContext>,
    _session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    accept_parameter(&writer, "STRU", &arg, &["F"]).await
}

/// Handles the MODE FTP command. Only stream mode (`S`) is supported.
pub async fn handle_mode_command(
    writer: ControlWriter,
    _server: Arc<ServerContext>,
    _session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    accept_parameter(&writer, "MODE", &arg, &["S"]).await
}
