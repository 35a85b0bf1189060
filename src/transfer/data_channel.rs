//! Module `data_channel`
//!
//! Opens the outbound data connection used by RETR, STOR and LIST. The
//! server always initiates the connection to the client's advertised
//! endpoint (active mode). Each transfer opens a fresh channel and closes
//! it when done.

use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::error::TransferError;

/// A single outbound data connection, owned by one transfer.
#[derive(Debug)]
pub struct DataChannel {
    stream: TcpStream,
    peer: SocketAddr,
}

impl DataChannel {
    /// Connects to `peer`, giving up after `timeout` when one is set.
    ///
    /// On failure nothing is left open; the half-built socket is dropped
    /// before the error is returned.
    pub async fn open(
        peer: SocketAddr,
        timeout: Option<Duration>,
    ) -> Result<DataChannel, TransferError> {
        debug!("Opening data channel to {}", peer);

        let connect = TcpStream::connect(peer);
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no connection within {:?}", limit),
                )),
            },
            None => connect.await,
        };

        match result {
            Ok(stream) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!("Failed to set TCP_NODELAY on data channel to {}: {}", peer, e);
                }
                info!("Data channel connected to {}", peer);
                Ok(DataChannel { stream, peer })
            }
            Err(e) => {
                error!("Failed to connect data channel to {}: {}", peer, e);
                Err(TransferError::ConnectFailed(peer, e))
            }
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The underlying stream, readable for STOR and writable for RETR/LIST.
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Shuts the connection down so the client sees end-of-stream.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!("Data channel to {} already closed: {}", self.peer, e);
        }
        debug!("Data channel to {} closed", self.peer);
    }
}
