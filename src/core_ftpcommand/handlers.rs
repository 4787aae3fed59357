use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{
    cwd, list, mdtm, noop, pass, pwd, quit, rein, retr, size, stor, syst, type_, user,
};
use crate::core_network::{pasv, port, ControlWriter};
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::{LoginState, Session};
use log::debug;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type CommandFuture = Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send>>;

pub type CommandHandler = Box<
    dyn Fn(
            ControlWriter,
            Arc<ServerContext>,
            Arc<Mutex<Session>>,
            String, // Command argument
        ) -> CommandFuture
        + Send
        + Sync,
>;

pub type CommandHandlers = HashMap<FtpCommand, CommandHandler>;

fn handler<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(ControlWriter, Arc<ServerContext>, Arc<Mutex<Session>>, String) -> Fut
        + Send
        + Sync
        + 'static,
    Fut: Future<Output = Result<(), std::io::Error>> + Send + 'static,
{
    Box::new(move |writer, server, session, arg| -> CommandFuture {
        Box::pin(f(writer, server, session, arg))
    })
}

pub fn initialize_command_handlers() -> CommandHandlers {
    let mut handlers: CommandHandlers = HashMap::new();

    // Authentication
    handlers.insert(FtpCommand::USER, handler(user::handle_user_command));
    handlers.insert(FtpCommand::PASS, handler(pass::handle_pass_command));

    // Data connection
    handlers.insert(FtpCommand::PORT, handler(port::handle_port_command));
    handlers.insert(FtpCommand::PASV, handler(pasv::handle_pasv_command));

    // Directories
    handlers.insert(FtpCommand::CWD, handler(cwd::handle_cwd_command));
    handlers.insert(FtpCommand::PWD, handler(pwd::handle_pwd_command));
    handlers.insert(FtpCommand::LIST, handler(list::handle_list_command));

    // Files
    handlers.insert(FtpCommand::SIZE, handler(size::handle_size_command));
    handlers.insert(FtpCommand::MDTM, handler(mdtm::handle_mdtm_command));
    handlers.insert(FtpCommand::RETR, handler(retr::handle_retr_command));
    handlers.insert(FtpCommand::STOR, handler(stor::handle_stor_command));

    // Miscellaneous
    handlers.insert(FtpCommand::TYPE, handler(type_::handle_type_command));
    handlers.insert(FtpCommand::STRU, handler(type_::handle_stru_command));
    handlers.insert(FtpCommand::MODE, handler(type_::handle_mode_command));
    handlers.insert(FtpCommand::SYST, handler(syst::handle_syst_command));
    handlers.insert(FtpCommand::REIN, handler(rein::handle_rein_command));
    handlers.insert(FtpCommand::NOOP, handler(noop::handle_noop_command));
    handlers.insert(FtpCommand::QUIT, handler(quit::handle_quit_command));

    handlers
}

/// Splits a control line into its upper-cased verb and the raw argument
/// following the first space.
pub fn parse_command_line(line: &str) -> (String, String) {
    let line = line.trim_end();
    let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));
    (verb.to_ascii_uppercase(), arg.to_string())
}

/// Handles one control line. Returns `true` once QUIT has been accepted and
/// the session should drain and close.
pub async fn dispatch(
    handlers: &CommandHandlers,
    writer: &ControlWriter,
    server: &Arc<ServerContext>,
    session: &Arc<Mutex<Session>>,
    line: &str,
) -> Result<bool, std::io::Error> {
    let (verb, arg) = parse_command_line(line);
    let command = FtpCommand::parse(&verb);

    let (state, peer) = {
        let session = session.lock().await;
        (session.state(), session.ctx.peer_addr)
    };
    if command == Some(FtpCommand::PASS) {
        debug!("Command from {}: PASS ****", peer);
    } else {
        debug!("Command from {}: {} {}", peer, verb, arg);
    }

    if state == LoginState::Closing {
        if command != Some(FtpCommand::QUIT) {
            send_reply(
                writer,
                421,
                "Service not available, closing control connection.",
            )
            .await?;
        }
        return Ok(false);
    }

    let command = match command {
        Some(command) if command.allowed_before_login() => command,
        _ if state != LoginState::LoggedIn => {
            send_reply(writer, 530, "Not logged in.").await?;
            return Ok(false);
        }
        Some(command) => command,
        None => {
            send_reply(writer, 502, "Command not implemented.").await?;
            return Ok(false);
        }
    };

    match handlers.get(&command) {
        Some(handler) => {
            handler(
                Arc::clone(writer),
                Arc::clone(server),
                Arc::clone(session),
                arg,
            )
            .await?
        }
        None => send_reply(writer, 502, "Command not implemented.").await?,
    }

    Ok(command == FtpCommand::QUIT)
}
