//! Passive-mode data channel management.
//!
//! `PASV` binds a per-session listener on an ephemeral port; the next
//! data-transferring command consumes it with a single accept.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use log::{debug, error};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::core_reply::Reply;
use crate::helpers::send_reply;
use crate::session::{ControlWriter, Session};

/// A single-shot passive listener awaiting one data connection.
///
/// Accepting consumes the listener, so a second accept is impossible by
/// construction.
#[derive(Debug)]
pub struct PasvListener {
    listener: TcpListener,
    addr: SocketAddr,
}

impl PasvListener {
    /// Binds an ephemeral port on the given interface.
    pub async fn bind(ip: IpAddr) -> io::Result<Self> {
        let listener = TcpListener::bind((ip, 0)).await?;
        let addr = listener.local_addr()?;
        debug!("Passive listener bound on {}", addr);
        Ok(Self { listener, addr })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// The `h1,h2,h3,h4,p1,p2` advertisement, `port == p1 * 256 + p2`.
    /// IPv4 only; an IPv6-bound listener cannot be advertised.
    pub fn advertisement(&self) -> Option<String> {
        match self.addr.ip() {
            IpAddr::V4(ip) => {
                let [h1, h2, h3, h4] = ip.octets();
                let port = self.addr.port();
                Some(format!(
                    "{},{},{},{},{},{}",
                    h1,
                    h2,
                    h3,
                    h4,
                    port / 256,
                    port % 256
                ))
            }
            IpAddr::V6(_) => None,
        }
    }

    /// Accepts the one pending data connection and closes the listener.
    pub async fn accept(self) -> io::Result<TcpStream> {
        let (stream, peer) = self.listener.accept().await?;
        debug!("Accepted data connection from {}", peer);
        Ok(stream)
    }
}

/// Handles the PASV command: binds a listener on the interface the control
/// channel terminates on and advertises its address. Any previously pending
/// listener is replaced, keeping at most one per session.
pub async fn handle_pasv_command(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let advertise_ip = { session.lock().await.advertise_ip };
    if !advertise_ip.is_ipv4() {
        error!(
            "PASV refused: control channel terminates on non-IPv4 address {}",
            advertise_ip
        );
        return send_reply(writer, &Reply::action_failed("PASV")).await;
    }

    let listener = match PasvListener::bind(advertise_ip).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind passive listener: {}", err);
            return send_reply(writer, &Reply::action_failed("PASV")).await;
        }
    };
    let advert = match listener.advertisement() {
        Some(advert) => advert,
        None => return send_reply(writer, &Reply::action_failed("PASV")).await,
    };

    {
        let mut session = session.lock().await;
        if session.pasv.replace(listener).is_some() {
            debug!("Replacing pending passive listener");
        }
    }
    send_reply(writer, &Reply::entering_passive_mode(&advert)).await
}
