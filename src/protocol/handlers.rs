//! Command handlers module for the mini FTP server.
//!
//! The dispatcher is the protocol state machine. It handles one command at a
//! time, checks it against the connection's `Session`, drives the data
//! channel and transfer engine when a command moves bytes, and writes the
//! status replies. Any per-command failure becomes a reply; only a broken
//! control connection ends the session.

use log::{debug, info, warn};
use std::io;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::client::{FileStructure, Session, TransferType};
use crate::config::ServerConfig;
use crate::error::CommandError;
use crate::protocol::{Command, Reply};
use crate::storage::{resolve_client_path, strip_leading_separator};
use crate::transfer::{DataChannel, Lister, stream};

/// What the session loop does after a command has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Continue,
    CloseConnection,
}

type HandlerResult = Result<Reply, CommandError>;

/// Per-connection protocol state machine.
pub struct Dispatcher {
    session: Session,
    config: Arc<ServerConfig>,
    lister: Lister,
}

impl Dispatcher {
    pub fn new(session: Session, config: Arc<ServerConfig>, lister: Lister) -> Self {
        Self {
            session,
            config,
            lister,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handles one parsed line (`None` for a line without tokens) and writes
    /// its replies to `control`.
    ///
    /// Returns an error only when the control connection itself failed.
    pub async fn dispatch<W>(
        &mut self,
        command: Option<&Command>,
        control: &mut W,
    ) -> io::Result<CommandStatus>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let Some(command) = command else {
            write_reply(control, Reply::SyntaxError).await?;
            return Ok(CommandStatus::Continue);
        };

        let result = match command.verb.as_str() {
            "QUIT" => {
                write_reply(control, Reply::Goodbye).await?;
                return Ok(CommandStatus::CloseConnection);
            }
            "USER" => self.handle_user(command),
            "NOOP" => Ok(Reply::CommandOkay),
            "STRU" => self.handle_stru(command),
            "TYPE" => self.handle_type(command),
            "MODE" => handle_mode(command),
            "PORT" => self.handle_port(command),
            "RETR" => self.handle_retr(command, control).await,
            "STOR" => self.handle_stor(command, control).await,
            "LIST" => self.handle_list(command, control).await,
            other => Err(CommandError::NotImplemented(other.to_string())),
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(CommandError::Control(e)) => return Err(e),
            Err(e) => {
                warn!("{} from {} failed: {}", command.verb, self.session.peer_addr(), e);
                e.reply()
            }
        };
        write_reply(control, reply).await?;
        Ok(CommandStatus::Continue)
    }

    /// Any identity is accepted.
    fn handle_user(&self, command: &Command) -> HandlerResult {
        info!(
            "Client {} logged in as {}",
            self.session.peer_addr(),
            command.arg().unwrap_or("<anonymous>")
        );
        Ok(Reply::LoggedIn)
    }

    fn handle_stru(&mut self, command: &Command) -> HandlerResult {
        let structure = command
            .arg()
            .ok_or_else(|| CommandError::Syntax("STRU requires a structure code".into()))?;

        if structure.eq_ignore_ascii_case("F") {
            self.session.set_structure(FileStructure::File);
            Ok(Reply::CommandOkay)
        } else {
            Err(CommandError::UnsupportedParameter(format!("STRU {}", structure)))
        }
    }

    /// Only image type is usable; anything else leaves the session in text
    /// mode, which blocks RETR and STOR.
    fn handle_type(&mut self, command: &Command) -> HandlerResult {
        let transfer_type = match command.arg() {
            None => TransferType::Binary,
            Some(code) if code.eq_ignore_ascii_case("I") => TransferType::Binary,
            Some(_) => TransferType::Text,
        };
        self.session.set_transfer_type(transfer_type);

        match transfer_type {
            TransferType::Binary => Ok(Reply::CommandOkay),
            TransferType::Text => Err(CommandError::UnsupportedParameter(format!(
                "TYPE {}",
                command.args.join(" ")
            ))),
        }
    }

    fn handle_port(&mut self, command: &Command) -> HandlerResult {
        let arg = command
            .arg()
            .ok_or_else(|| CommandError::Syntax("PORT requires a host-port argument".into()))?;
        let (host, port) = parse_host_port(arg)
            .ok_or_else(|| CommandError::Syntax(format!("malformed host-port {}", arg)))?;

        let peer_ip = self.session.peer_addr().ip();
        if peer_ip != host {
            warn!(
                "PORT from {} names host {}; data connections stay on {}",
                self.session.peer_addr(),
                host,
                peer_ip
            );
        }

        self.session.set_data_port(port);
        debug!("Data peer for {} is now {}", peer_ip, self.session.data_peer());
        Ok(Reply::CommandOkay)
    }

    async fn handle_retr<W>(&mut self, command: &Command, control: &mut W) -> HandlerResult
    where
        W: AsyncWrite + Unpin + Send,
    {
        let name = command
            .arg()
            .ok_or_else(|| CommandError::Syntax("RETR requires a file name".into()))?;
        if !self.session.is_binary() {
            return Err(CommandError::NotBinary);
        }

        let path = self
            .file_path(name)
            .ok_or_else(|| CommandError::FileUnavailable(name.to_string(), no_file_name()))?;
        let mut file = File::open(&path)
            .await
            .map_err(|e| CommandError::FileUnavailable(name.to_string(), e))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| CommandError::FileUnavailable(name.to_string(), e))?;
        if metadata.is_dir() {
            return Err(CommandError::FileUnavailable(
                name.to_string(),
                io::Error::new(io::ErrorKind::Other, "is a directory"),
            ));
        }

        send(control, Reply::AboutToOpenDataConnection).await?;
        let mut channel =
            DataChannel::open(self.session.data_peer(), self.config.connect_timeout()).await?;

        info!("Sending {} ({} bytes) to {}", path.display(), metadata.len(), channel.peer());
        let result = stream(&mut file, channel.stream_mut(), self.config.buffer_size).await;
        drop(file);
        channel.close().await;

        let sent = result?;
        info!("Sent {} bytes of {}", sent, path.display());
        Ok(Reply::ClosingDataConnection)
    }

    async fn handle_stor<W>(&mut self, command: &Command, control: &mut W) -> HandlerResult
    where
        W: AsyncWrite + Unpin + Send,
    {
        let name = command
            .arg()
            .ok_or_else(|| CommandError::Syntax("STOR requires a file name".into()))?;
        if !self.session.is_binary() {
            return Err(CommandError::NotBinary);
        }

        let path = self
            .file_path(name)
            .ok_or_else(|| CommandError::CannotCreate(name.to_string(), no_file_name()))?;
        let mut file = File::create(&path)
            .await
            .map_err(|e| CommandError::CannotCreate(name.to_string(), e))?;

        send(control, Reply::AboutToOpenDataConnection).await?;
        let mut channel =
            DataChannel::open(self.session.data_peer(), self.config.connect_timeout()).await?;

        info!("Receiving {} from {}", path.display(), channel.peer());
        let result = stream(channel.stream_mut(), &mut file, self.config.buffer_size).await;
        drop(file);
        channel.close().await;

        // A failed upload leaves whatever arrived so far on disk.
        let received = result?;
        info!("Stored {} bytes into {}", received, path.display());
        Ok(Reply::ClosingDataConnection)
    }

    async fn handle_list<W>(&mut self, command: &Command, control: &mut W) -> HandlerResult
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = command.arg().and_then(strip_leading_separator);
        let root = self.config.server_root_path();

        let mut listing = self
            .lister
            .start(&root, target)
            .await
            .map_err(CommandError::ListingFailed)?;

        if let Err(e) = send(control, Reply::AboutToOpenDataConnection).await {
            listing.abort().await;
            return Err(e);
        }

        let mut channel =
            match DataChannel::open(self.session.data_peer(), self.config.connect_timeout()).await
            {
                Ok(channel) => channel,
                Err(e) => {
                    listing.abort().await;
                    return Err(e.into());
                }
            };

        let result = stream(listing.reader(), channel.stream_mut(), self.config.buffer_size).await;
        channel.close().await;
        match result {
            Ok(sent) => {
                listing.finish().await;
                info!("Listed {} ({} bytes)", target.unwrap_or("."), sent);
                Ok(Reply::ClosingDataConnection)
            }
            Err(e) => {
                listing.abort().await;
                Err(e.into())
            }
        }
    }

    fn file_path(&self, arg: &str) -> Option<PathBuf> {
        resolve_client_path(&self.config.server_root_path(), Some(arg))
    }
}

/// Only stream mode is supported.
fn handle_mode(command: &Command) -> HandlerResult {
    match command.arg() {
        None => Ok(Reply::CommandOkay),
        Some(mode) if mode.eq_ignore_ascii_case("S") => Ok(Reply::CommandOkay),
        Some(mode) => Err(CommandError::UnsupportedParameter(format!("MODE {}", mode))),
    }
}

/// Parses the RFC 959 host-port form `h1,h2,h3,h4,p1,p2`.
///
/// Every field must be a decimal number in `0..=255`; the port is
/// `p1 * 256 + p2`.
pub fn parse_host_port(arg: &str) -> Option<(Ipv4Addr, u16)> {
    let fields: Vec<u8> = arg
        .split(',')
        .map(|field| field.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;

    match fields.as_slice() {
        &[a, b, c, d, high, low] => {
            Some((Ipv4Addr::new(a, b, c, d), u16::from(high) * 256 + u16::from(low)))
        }
        _ => None,
    }
}

async fn write_reply<W>(control: &mut W, reply: Reply) -> io::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let line = reply.to_string();
    debug!("Reply: {}", line.trim_end());
    control.write_all(line.as_bytes()).await?;
    control.flush().await
}

/// Sends an intermediate reply in the middle of a command.
async fn send<W>(control: &mut W, reply: Reply) -> Result<(), CommandError>
where
    W: AsyncWrite + Unpin + Send,
{
    write_reply(control, reply).await.map_err(CommandError::Control)
}

fn no_file_name() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "no file name")
}
