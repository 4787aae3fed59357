#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    PORT,
    PASV,
    CWD,
    LIST,
    PWD,
    SIZE,
    MDTM,
    RETR,
    STOR,
    TYPE,
    STRU,
    MODE,
    SYST,
    REIN,
    NOOP,
    QUIT,
}

impl FtpCommand {
    pub fn parse(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "PORT" => Some(FtpCommand::PORT),
            "PASV" => Some(FtpCommand::PASV),
            "CWD" => Some(FtpCommand::CWD),
            "LIST" => Some(FtpCommand::LIST),
            "PWD" => Some(FtpCommand::PWD),
            "SIZE" => Some(FtpCommand::SIZE),
            "MDTM" => Some(FtpCommand::MDTM),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "TYPE" => Some(FtpCommand::TYPE),
            "STRU" => Some(FtpCommand::STRU),
            "MODE" => Some(FtpCommand::MODE),
            "SYST" => Some(FtpCommand::SYST),
            "REIN" => Some(FtpCommand::REIN),
            "NOOP" => Some(FtpCommand::NOOP),
            "QUIT" => Some(FtpCommand::QUIT),
            _ => None,
        }
    }

    /// Commands accepted before the session is logged in.
    pub fn allowed_before_login(self) -> bool {
        matches!(self, FtpCommand::USER | FtpCommand::PASS)
    }
}
