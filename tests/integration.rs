use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use mini_ftpd::Server;
use mini_ftpd::config::{ListBackend, ServerConfig};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

struct FtpClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl FtpClient {
    async fn connect(addr: SocketAddr) -> FtpClient {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        FtpClient {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    // Reads one reply line
    async fn reply(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line
    }

    // Sends a command and reads the first reply line
    async fn send_command(&mut self, command: &str) -> String {
        self.writer
            .write_all(format!("{}\r\n", command).as_bytes())
            .await
            .unwrap();
        self.reply().await
    }

    /// Advertises a fresh data listener via PORT.
    async fn port(&mut self) -> TcpListener {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let response = self
            .send_command(&format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff))
            .await;
        assert_eq!(response, "200 Command okay.\r\n");
        listener
    }

    /// Runs a download-style command (RETR, LIST) and returns the data bytes.
    async fn download(&mut self, command: &str) -> Vec<u8> {
        let listener = self.port().await;
        let response = self.send_command(command).await;
        assert!(response.starts_with("150 "), "unexpected reply {:?}", response);

        let (mut data, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        data.read_to_end(&mut received).await.unwrap();

        assert_eq!(self.reply().await, "226 Closing data connection.\r\n");
        received
    }
}

// Start a server on an ephemeral port serving `root`
async fn start_test_server(root: &TempDir, tweak: impl FnOnce(&mut ServerConfig)) -> SocketAddr {
    let mut config = ServerConfig {
        server_root: root.path().to_string_lossy().into_owned(),
        connect_timeout_secs: 5,
        ..ServerConfig::default()
    };
    tweak(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::from_listener(listener, config).unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());
    addr
}

async fn connect_logged_in(addr: SocketAddr) -> FtpClient {
    let mut client = FtpClient::connect(addr).await;
    assert!(client.reply().await.starts_with("220 "));
    assert_eq!(
        client.send_command("USER anonymous").await,
        "230 User logged in, proceed.\r\n"
    );
    client
}

#[tokio::test]
async fn test_initial_connection_and_quit() {
    let root = TempDir::new().unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut client = connect_logged_in(addr).await;
    assert_eq!(client.send_command("QUIT").await, "221 Good bye.\r\n");

    // Connection closed by the server
    let mut rest = String::new();
    assert_eq!(client.reader.read_line(&mut rest).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_command() {
    let root = TempDir::new().unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut client = connect_logged_in(addr).await;
    assert_eq!(client.send_command("BADCMD").await, "502 Command not implemented.\r\n");
    assert_eq!(client.send_command("PASV").await, "502 Command not implemented.\r\n");
    assert_eq!(client.send_command("NOOP").await, "200 Command okay.\r\n");
}

#[tokio::test]
async fn test_retr_requires_binary_type() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("test.txt"), b"content").unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut client = connect_logged_in(addr).await;
    let aborted = "451 Requested action aborted: local error in processing.\r\n";
    assert_eq!(client.send_command("RETR test.txt").await, aborted);
    assert_eq!(
        client.send_command("TYPE A").await,
        "504 Command not implemented for that parameter.\r\n"
    );
    assert_eq!(client.send_command("STOR new.txt").await, aborted);
    assert!(!root.path().join("new.txt").exists());

    assert_eq!(client.send_command("TYPE I").await, "200 Command okay.\r\n");
    assert_eq!(client.download("RETR test.txt").await, b"content");
}

#[tokio::test]
async fn test_retr_nonexistent_file() {
    let root = TempDir::new().unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut client = connect_logged_in(addr).await;
    client.send_command("TYPE I").await;
    let listener = client.port().await;

    assert_eq!(
        client.send_command("RETR nonexistent.txt").await,
        "450 Requested file action not taken.\r\n"
    );
    let accepted = tokio::time::timeout(Duration::from_millis(300), listener.accept()).await;
    assert!(accepted.is_err(), "server must not open a data connection");
}

#[tokio::test]
async fn test_retr_command() {
    let root = TempDir::new().unwrap();
    let content: Vec<u8> = (0..300_000u32).map(|i| (i * 31 % 256) as u8).collect();
    fs::write(root.path().join("big.bin"), &content).unwrap();
    let addr = start_test_server(&root, |config| config.buffer_size = 4096).await;

    let mut client = connect_logged_in(addr).await;
    client.send_command("TYPE I").await;

    let received = client.download("RETR big.bin").await;
    assert_eq!(received.len(), content.len());
    assert_eq!(received, content);

    // Leading separator is stripped
    assert_eq!(client.download("RETR /big.bin").await, content);
}

#[tokio::test]
async fn test_stor_command() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("existing.txt"), b"old content that is longer").unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut client = connect_logged_in(addr).await;
    client.send_command("TYPE I").await;

    for (name, payload) in [
        ("newfile.bin", vec![7u8; 100_000]),
        ("existing.txt", b"new".to_vec()),
        ("empty.txt", Vec::new()),
    ] {
        let listener = client.port().await;
        let response = client.send_command(&format!("STOR {}", name)).await;
        assert!(response.starts_with("150 "));

        let (mut data, _) = listener.accept().await.unwrap();
        data.write_all(&payload).await.unwrap();
        data.shutdown().await.unwrap();
        drop(data);

        assert_eq!(client.reply().await, "226 Closing data connection.\r\n");
        assert_eq!(fs::read(root.path().join(name)).unwrap(), payload);
    }
}

#[tokio::test]
async fn test_stor_without_data_listener() {
    let root = TempDir::new().unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut client = connect_logged_in(addr).await;
    client.send_command("TYPE I").await;
    let listener = client.port().await;
    drop(listener);

    assert!(client.send_command("STOR up.bin").await.starts_with("150 "));
    assert_eq!(client.reply().await, "425 Can't open data connection.\r\n");
    assert_eq!(client.send_command("NOOP").await, "200 Command okay.\r\n");
}

#[tokio::test]
async fn test_port_without_argument() {
    let root = TempDir::new().unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut client = connect_logged_in(addr).await;
    let syntax = "501 Syntax error in parameters or arguments.\r\n";
    assert_eq!(client.send_command("PORT").await, syntax);
    assert_eq!(client.send_command("PORT 127,0,0,1,999,1").await, syntax);
    assert_eq!(client.send_command("RETR").await, syntax);
    assert_eq!(client.send_command("").await, syntax);
}

#[tokio::test]
async fn test_list_path_rule_native() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("test.txt"), b"abc").unwrap();
    fs::create_dir(root.path().join("dir1")).unwrap();
    fs::write(root.path().join("dir1/inner.txt"), b"xyz").unwrap();
    let addr = start_test_server(&root, |config| config.list_backend = ListBackend::Native).await;

    let mut client = connect_logged_in(addr).await;

    let plain = client.download("LIST").await;
    let slash = client.download("LIST /").await;
    assert_eq!(plain, slash);
    let listing = String::from_utf8(plain).unwrap();
    assert!(listing.contains("test.txt"));
    assert!(listing.contains("dir1"));

    let relative = client.download("LIST dir1").await;
    let absolute = client.download("LIST /dir1").await;
    assert_eq!(relative, absolute);
    assert!(String::from_utf8(relative).unwrap().contains("inner.txt"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_list_path_rule_process() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("test.txt"), b"abc").unwrap();
    fs::create_dir(root.path().join("sub")).unwrap();
    fs::write(root.path().join("sub/nested.txt"), b"xyz").unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut client = connect_logged_in(addr).await;

    let plain = client.download("LIST").await;
    assert_eq!(plain, client.download("LIST /").await);
    assert!(String::from_utf8_lossy(&plain).contains("test.txt"));

    let relative = client.download("LIST sub").await;
    assert_eq!(relative, client.download("LIST /sub").await);
    assert!(String::from_utf8_lossy(&relative).contains("nested.txt"));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("shared.txt"), b"shared").unwrap();
    let addr = start_test_server(&root, |_| {}).await;

    let mut binary = connect_logged_in(addr).await;
    let mut text = connect_logged_in(addr).await;

    assert_eq!(binary.send_command("TYPE I").await, "200 Command okay.\r\n");
    assert!(text.send_command("RETR shared.txt").await.starts_with("451 "));
    assert_eq!(binary.download("RETR shared.txt").await, b"shared");
}

#[tokio::test]
async fn test_connection_limit() {
    let root = TempDir::new().unwrap();
    let addr = start_test_server(&root, |config| config.max_clients = 1).await;

    let mut first = connect_logged_in(addr).await;

    let mut second = FtpClient::connect(addr).await;
    assert!(second.reply().await.starts_with("421 "));

    assert_eq!(first.send_command("QUIT").await, "221 Good bye.\r\n");
}
