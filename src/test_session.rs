//! End-to-end session tests: a real server on an ephemeral port, driven over
//! real sockets the way a command-line client would drive it.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::core_network::network;

async fn start_server(root: &Path) -> SocketAddr {
    let root = Arc::new(root.canonicalize().unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = network::start_server(listener, root, None).await;
    });
    addr
}

fn seed(root: &Path) {
    std::fs::write(root.join("message.md"), b"hello\nftp\n").unwrap();
    std::fs::create_dir(root.join("server")).unwrap();
    std::fs::write(root.join("server").join("main.rs"), b"fn main() {}\n").unwrap();
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Client {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        let mut client = Client {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        assert_eq!(client.reply().await, "220 Service ready for new user");
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn reply(&mut self) -> String {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "control channel closed unexpectedly");
        line.trim_end().to_string()
    }

    async fn cmd(&mut self, line: &str) -> String {
        self.send(line).await;
        self.reply().await
    }

    /// Issues PASV and dials the advertised address.
    async fn open_data_channel(&mut self) -> TcpStream {
        let reply = self.cmd("PASV").await;
        assert!(
            reply.starts_with("227 Entering Passive Mode ("),
            "unexpected PASV reply: {}",
            reply
        );
        let fields: Vec<u16> = reply
            .trim_end_matches(')')
            .rsplit('(')
            .next()
            .unwrap()
            .split(',')
            .map(|f| f.parse().unwrap())
            .collect();
        assert_eq!(fields.len(), 6, "unexpected PASV advertisement: {}", reply);
        let ip = format!("{}.{}.{}.{}", fields[0], fields[1], fields[2], fields[3]);
        let port = fields[4] * 256 + fields[5];
        TcpStream::connect((ip.as_str(), port)).await.unwrap()
    }
}

#[tokio::test]
async fn login_is_permissive() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.cmd("USER x").await, "331 User x okay, need password");
    assert_eq!(client.cmd("PASS y").await, "230 User logged in, proceed");
    assert_eq!(client.cmd("PWD").await, "257 \"/\"");
    assert_eq!(client.cmd("SYST").await, "215 UNIX Type: L8");
    assert_eq!(client.cmd("FEAT").await, "211 no-features");
    assert_eq!(client.cmd("TYPE I").await, "200 TYPE is now 8-bit binary");
}

#[tokio::test]
async fn list_streams_the_seeded_entries() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    let mut data = client.open_data_channel().await;
    client.send("LIST").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");

    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    drop(data);
    assert_eq!(client.reply().await, "226 Closing data connection");

    assert_eq!(listing.lines().count(), 2, "unexpected listing: {}", listing);
    assert!(listing.contains("message.md"));
    assert!(listing.contains("server"));
    assert!(listing.contains("\r\n"));
}

#[tokio::test]
async fn retr_delivers_the_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    let mut data = client.open_data_channel().await;
    client.send("RETR message.md").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");

    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    drop(data);
    assert_eq!(payload, b"hello\nftp\n");
    assert_eq!(client.reply().await, "226 File successfully transferred");
}

#[tokio::test]
async fn cwd_navigates_and_clamps_escapes() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(
        client.cmd("CWD server").await,
        "250 OK. Current directory is /server"
    );
    assert_eq!(client.cmd("PWD").await, "257 \"/server\"");
    assert_eq!(client.cmd("CWD ..").await, "250 OK. Current directory is /");
    assert_eq!(client.cmd("PWD").await, "257 \"/\"");

    assert_eq!(client.cmd("CWD server").await, "250 OK. Current directory is /server");
    assert_eq!(client.cmd("CWD ../..").await, "250 OK. Current directory is /");
    assert_eq!(client.cmd("PWD").await, "257 \"/\"");

    assert_eq!(client.cmd("CWD /..").await, "250 OK. Current directory is /");
    assert_eq!(
        client.cmd("CWD ../../etc").await,
        "250 OK. Current directory is /"
    );
    assert_eq!(client.cmd("PWD").await, "257 \"/\"");

    assert_eq!(
        client.cmd("CWD message.md").await,
        "550 Not a directory message.md"
    );
    assert_eq!(
        client.cmd("CWD nowhere").await,
        "550 No such file or directory nowhere"
    );
    assert_eq!(client.cmd("PWD").await, "257 \"/\"");
}

#[tokio::test]
async fn listing_an_escape_behaves_as_the_root() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    let mut data = client.open_data_channel().await;
    client.send("LIST ../../").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");

    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    drop(data);
    assert_eq!(client.reply().await, "226 Closing data connection");
    assert!(listing.contains("message.md"));
}

#[tokio::test]
async fn stor_then_size_reports_the_byte_length() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    let mut data = client.open_data_channel().await;
    client.send("STOR note.txt").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");
    data.write_all(b"abc").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.reply().await, "226 File successfully transferred");

    assert_eq!(client.cmd("SIZE note.txt").await, "213 3");
    assert_eq!(
        std::fs::read(dir.path().join("note.txt")).unwrap(),
        b"abc"
    );
}

#[tokio::test]
async fn stor_retr_round_trip_is_byte_exact() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    // Larger than one transfer buffer, with every byte value present.
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();

    let mut data = client.open_data_channel().await;
    client.send("STOR big.bin").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");
    data.write_all(&payload).await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.reply().await, "226 File successfully transferred");

    let mut data = client.open_data_channel().await;
    client.send("RETR big.bin").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");
    let mut received = Vec::new();
    data.read_to_end(&mut received).await.unwrap();
    drop(data);
    assert_eq!(client.reply().await, "226 File successfully transferred");
    assert_eq!(received, payload);
}

#[tokio::test]
async fn stor_of_an_empty_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    let mut data = client.open_data_channel().await;
    client.send("STOR empty.bin").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.reply().await, "226 File successfully transferred");
    assert_eq!(client.cmd("SIZE empty.bin").await, "213 0");
}

#[tokio::test]
async fn mkd_rmd_lifecycle_and_refusals() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.cmd("MKD d").await, "257 Created \"d\"");
    assert_eq!(
        client.cmd("MKD d").await,
        "550 Can't create existing directory"
    );
    assert_eq!(
        client.cmd("MKD missing/sub").await,
        "550 No such file or directory missing/sub"
    );
    assert_eq!(client.cmd("RMD d").await, "250 Deleted d");
    assert!(!dir.path().join("d").exists());

    // Retrieval of the deleted directory refuses on the control channel
    // only: no 150, no data connection consumed.
    let data = client.open_data_channel().await;
    assert_eq!(
        client.cmd("RETR d").await,
        "550 No such file or directory d"
    );
    drop(data);

    assert_eq!(
        client.cmd("RMD message.md").await,
        "550 Not a directory message.md"
    );
}

#[tokio::test]
async fn rmd_removes_a_populated_tree() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    std::fs::create_dir_all(dir.path().join("tree/deep")).unwrap();
    std::fs::write(dir.path().join("tree/deep/f"), b"x").unwrap();

    assert_eq!(client.cmd("RMD tree").await, "250 Deleted tree");
    assert!(!dir.path().join("tree").exists());
}

#[tokio::test]
async fn dele_is_restricted_to_regular_files() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.cmd("DELE message.md").await, "250 Deleted message.md");
    assert_eq!(
        client.cmd("DELE message.md").await,
        "550 No such file or directory message.md"
    );
    assert_eq!(
        client.cmd("DELE server").await,
        "550 Can only delete regular files"
    );
}

#[tokio::test]
async fn retr_refuses_directories_without_touching_the_data_channel() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    let data = client.open_data_channel().await;
    assert_eq!(
        client.cmd("RETR server").await,
        "550 Can only retrieve regular files"
    );
    drop(data);

    // The listener was released; a fresh PASV and transfer still work.
    let mut data = client.open_data_channel().await;
    client.send("RETR message.md").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    drop(data);
    assert_eq!(payload, b"hello\nftp\n");
    assert_eq!(client.reply().await, "226 File successfully transferred");
}

#[tokio::test]
async fn size_refuses_directories_and_missing_paths() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.cmd("SIZE message.md").await, "213 10");
    assert_eq!(
        client.cmd("SIZE server").await,
        "550 Can only size regular files"
    );
    assert_eq!(
        client.cmd("SIZE nowhere").await,
        "500 Requested action has failed \"SIZE\""
    );
}

#[tokio::test]
async fn nlst_of_an_empty_directory_opens_and_closes_the_data_channel() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.cmd("MKD empty").await, "257 Created \"empty\"");

    let mut data = client.open_data_channel().await;
    client.send("NLST empty").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    drop(data);
    assert!(listing.is_empty());
    assert_eq!(client.reply().await, "226 Closing data connection");
}

#[tokio::test]
async fn nlst_lists_bare_names() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    let mut data = client.open_data_channel().await;
    client.send("NLST").await;
    assert_eq!(client.reply().await, "150 Accepted data connection");
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    drop(data);
    assert_eq!(client.reply().await, "226 Closing data connection");
    assert_eq!(listing, "message.md\r\nserver\r\n");
}

#[tokio::test]
async fn data_commands_require_a_pending_listener() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(
        client.cmd("LIST").await,
        "500 Requested action has failed \"LIST\""
    );
    assert_eq!(
        client.cmd("RETR message.md").await,
        "500 Requested action has failed \"RETR\""
    );
}

#[tokio::test]
async fn unknown_verbs_do_not_end_the_session() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(
        client.cmd("XYZZY foo").await,
        "502 Command not implemented \"XYZZY\""
    );
    assert_eq!(
        client.cmd("EPSV").await,
        "502 Command not implemented \"EPSV\""
    );
    assert_eq!(
        client.cmd("QUIT").await,
        "221 Service closing control connection"
    );

    let mut line = String::new();
    let n = client.reader.read_line(&mut line).await.unwrap();
    assert_eq!(n, 0, "expected EOF after QUIT, got: {}", line);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let addr = start_server(dir.path()).await;
    let mut first = Client::connect(addr).await;
    let mut second = Client::connect(addr).await;

    assert_eq!(
        first.cmd("CWD server").await,
        "250 OK. Current directory is /server"
    );
    assert_eq!(second.cmd("PWD").await, "257 \"/\"");
    assert_eq!(first.cmd("PWD").await, "257 \"/server\"");
}
