use log::{debug, error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::client::Session;
use crate::config::ServerConfig;
use crate::protocol::{Command, CommandStatus, Dispatcher, LineReader, Reply};
use crate::transfer::Lister;

/// Handles one FTP control connection until QUIT or disconnect.
///
/// - Sends the greeting, then reads one command line at a time.
/// - Each command is fully handled, transfer included, before the next read.
/// - The connection is shut down on exit.
pub async fn handle_client(
    cmd_stream: TcpStream,
    client_addr: SocketAddr,
    config: Arc<ServerConfig>,
    lister: Lister,
) {
    let (read_half, mut write_half) = cmd_stream.into_split();

    if let Err(e) = run_session(read_half, &mut write_half, client_addr, config, lister).await {
        error!("Control connection with {} failed: {}", client_addr, e);
    }

    if let Err(e) = write_half.shutdown().await {
        debug!("Shutdown of control connection to {} failed: {}", client_addr, e);
    }
    info!("Client {} disconnected", client_addr);
}

/// Runs the read-evaluate-reply loop over any control byte stream.
pub async fn run_session<R, W>(
    reader: R,
    writer: &mut W,
    client_addr: SocketAddr,
    config: Arc<ServerConfig>,
    lister: Lister,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    let mut lines = LineReader::new(BufReader::new(reader), config.max_command_length);
    let mut dispatcher = Dispatcher::new(Session::new(client_addr), config, lister);

    writer.write_all(Reply::ServiceReady.to_string().as_bytes()).await?;
    writer.flush().await?;

    loop {
        let Some(line) = lines.read_line().await? else {
            info!("Connection closed by client {}", client_addr);
            return Ok(());
        };

        let command = Command::parse(&line);
        debug!("Received from {}: {:?}", client_addr, command);

        if dispatcher.dispatch(command.as_ref(), writer).await? == CommandStatus::CloseConnection {
            info!("Client {} requested to quit", client_addr);
            return Ok(());
        }
    }
}
