//! Per-connection protocol state and the command dispatch loop.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{
    cwd, dele, feat, list, mkd, nlst, pass, pwd, quit, retr, rmd, size, stor, syst, type_, user,
};
use crate::core_network::pasv::{self, PasvListener};
use crate::core_reply::Reply;
use crate::helpers::send_reply;

pub type ControlWriter = Arc<Mutex<OwnedWriteHalf>>;

/// One session per control connection. All mutable state is private to the
/// session's dispatch loop; the only cross-session sharing is the immutable
/// virtual root.
#[derive(Debug)]
pub struct Session {
    /// The virtual root; identical across all sessions of one server.
    pub root: Arc<PathBuf>,
    /// Always the root or a descendant of it; mutated only by `CWD`.
    pub cwd: PathBuf,
    /// Pending passive listener, at most one at a time.
    pub pasv: Option<PasvListener>,
    /// Representation type flag; acknowledged but all transfers are
    /// byte-exact regardless.
    pub transfer_type: String,
    pub username: Option<String>,
    /// Interface advertised by PASV; the control channel's local address
    /// unless overridden by configuration.
    pub advertise_ip: IpAddr,
}

impl Session {
    pub fn new(root: Arc<PathBuf>, advertise_ip: IpAddr) -> Self {
        Self {
            cwd: root.as_ref().clone(),
            root,
            pasv: None,
            transfer_type: String::from("I"),
            username: None,
            advertise_ip,
        }
    }
}

/// Reads commands off the control channel one line at a time and processes
/// each to completion before reading the next. The session ends on QUIT, EOF,
/// or a control-channel write error; any lingering passive listener is
/// dropped with the session.
pub async fn handle_connection(
    socket: TcpStream,
    root: Arc<PathBuf>,
    advertise_ip: Option<IpAddr>,
) -> Result<()> {
    let peer = socket.peer_addr()?;
    let advertise_ip = match advertise_ip {
        Some(ip) => ip,
        None => socket.local_addr()?.ip(),
    };
    let (read_half, write_half) = socket.into_split();
    let writer: ControlWriter = Arc::new(Mutex::new(write_half));

    send_reply(&writer, &Reply::service_ready()).await?;

    let session = Arc::new(Mutex::new(Session::new(root, advertise_ip)));
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            debug!("Control channel closed by {}", peer);
            break;
        }
        let input = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if input.is_empty() {
            continue;
        }

        let (verb, arg) = split_command(input);
        debug!("{} sent: {} {}", peer, verb, arg);

        match FtpCommand::from_str(verb) {
            Some(FtpCommand::QUIT) => {
                quit::handle_quit_command(&writer, &session, arg.to_string()).await?;
                break;
            }
            Some(command) => dispatch(command, &writer, &session, arg.to_string()).await?,
            None => {
                warn!("Unimplemented verb from {}: {}", peer, verb);
                send_reply(&writer, &Reply::not_implemented(verb)).await?;
            }
        }
    }

    Ok(())
}

/// Splits a command line on the first space: everything after the verb is
/// the argument.
fn split_command(input: &str) -> (&str, &str) {
    match input.split_once(' ') {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (input, ""),
    }
}

async fn dispatch(
    command: FtpCommand,
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    match command {
        FtpCommand::USER => user::handle_user_command(writer, session, arg).await,
        FtpCommand::PASS => pass::handle_pass_command(writer, session, arg).await,
        FtpCommand::SYST => syst::handle_syst_command(writer, session, arg).await,
        FtpCommand::FEAT => feat::handle_feat_command(writer, session, arg).await,
        FtpCommand::TYPE => type_::handle_type_command(writer, session, arg).await,
        FtpCommand::PWD => pwd::handle_pwd_command(writer, session, arg).await,
        FtpCommand::CWD => cwd::handle_cwd_command(writer, session, arg).await,
        FtpCommand::PASV => pasv::handle_pasv_command(writer, session, arg).await,
        FtpCommand::LIST => list::handle_list_command(writer, session, arg).await,
        FtpCommand::NLST => nlst::handle_nlst_command(writer, session, arg).await,
        FtpCommand::SIZE => size::handle_size_command(writer, session, arg).await,
        FtpCommand::RETR => retr::handle_retr_command(writer, session, arg).await,
        FtpCommand::STOR => stor::handle_stor_command(writer, session, arg).await,
        FtpCommand::MKD => mkd::handle_mkd_command(writer, session, arg).await,
        FtpCommand::RMD => rmd::handle_rmd_command(writer, session, arg).await,
        FtpCommand::DELE => dele::handle_dele_command(writer, session, arg).await,
        FtpCommand::QUIT => quit::handle_quit_command(writer, session, arg).await,
    }
}
