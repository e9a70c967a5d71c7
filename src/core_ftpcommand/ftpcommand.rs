#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FtpCommand {
    USER,
    PASS,
    SYST,
    FEAT,
    TYPE,
    PWD,
    CWD,
    PASV,
    LIST,
    NLST,
    SIZE,
    RETR,
    STOR,
    MKD,
    RMD,
    DELE,
    QUIT,
}

impl FtpCommand {
    /// Maps a verb to its command, case-insensitively. `XMKD`/`XRMD` are the
    /// historical aliases of `MKD`/`RMD`. Anything else (including `EPSV`)
    /// is unimplemented and yields `None`.
    pub fn from_str(verb: &str) -> Option<FtpCommand> {
        match verb.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "SYST" => Some(FtpCommand::SYST),
            "FEAT" => Some(FtpCommand::FEAT),
            "TYPE" => Some(FtpCommand::TYPE),
            "PWD" => Some(FtpCommand::PWD),
            "CWD" => Some(FtpCommand::CWD),
            "PASV" => Some(FtpCommand::PASV),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "SIZE" => Some(FtpCommand::SIZE),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "MKD" | "XMKD" => Some(FtpCommand::MKD),
            "RMD" | "XRMD" => Some(FtpCommand::RMD),
            "DELE" => Some(FtpCommand::DELE),
            "QUIT" => Some(FtpCommand::QUIT),
            _ => None,
        }
    }
}
