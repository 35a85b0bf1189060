//! Error types
//!
//! Defines domain-specific error types for each layer of the FTP server.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

use crate::protocol::Reply;

/// Data channel and byte-stream errors
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to connect data channel to {0}: {1}")]
    ConnectFailed(SocketAddr, io::Error),

    #[error("Transfer failed: {0}")]
    TransferFailed(io::Error),
}

/// Errors raised while handling a single control command.
///
/// Everything except `Control` is answered with a reply and the session continues.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Transfer type must be binary")]
    NotBinary,

    #[error("Command not implemented: {0}")]
    NotImplemented(String),

    #[error("Parameter not implemented: {0}")]
    UnsupportedParameter(String),

    #[error("Cannot open file {0}: {1}")]
    FileUnavailable(String, io::Error),

    #[error("Cannot create file {0}: {1}")]
    CannotCreate(String, io::Error),

    #[error("Cannot start listing: {0}")]
    ListingFailed(io::Error),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Control connection error: {0}")]
    Control(io::Error),
}

impl CommandError {
    /// Convert error to the FTP reply sent on the control connection
    pub fn reply(&self) -> Reply {
        match self {
            CommandError::Syntax(_) => Reply::SyntaxError,
            CommandError::NotBinary => Reply::LocalError,
            CommandError::NotImplemented(_) => Reply::NotImplemented,
            CommandError::UnsupportedParameter(_) => Reply::NotImplementedForParameter,
            CommandError::FileUnavailable(..) => Reply::FileActionNotTaken,
            CommandError::CannotCreate(..) => Reply::CannotCreateFile,
            CommandError::ListingFailed(_) => Reply::FileActionNotTaken,
            CommandError::Transfer(TransferError::ConnectFailed(..)) => {
                Reply::CantOpenDataConnection
            }
            CommandError::Transfer(TransferError::TransferFailed(_)) => Reply::LocalError,
            // Never written; the session is torn down instead.
            CommandError::Control(_) => Reply::ServiceNotAvailable,
        }
    }
}

/// Startup failures, fatal to the process
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to bind {0}: {1}")]
    Bind(String, io::Error),

    #[error("Failed to access server root {0}: {1}")]
    ServerRoot(String, io::Error),
}
