//! Module `state`
//!
//! Defines the per-connection `Session`: transfer type, file structure and
//! the address the data channel connects to.

use std::net::SocketAddr;

/// How bytes are represented on the data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferType {
    Binary,
    #[default]
    Text,
}

/// File structure negotiated by STRU. Only file structure is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStructure {
    #[default]
    File,
}

/// Represents the state of one control connection.
///
/// Lives from accept to disconnect and is never shared between connections.
#[derive(Debug, Clone)]
pub struct Session {
    peer_addr: SocketAddr,
    data_peer: SocketAddr,
    transfer_type: TransferType,
    structure: FileStructure,
}

impl Session {
    /// Creates a session for a control connection from `peer_addr`.
    ///
    /// The data peer starts as the control peer itself, same host and port.
    pub fn new(peer_addr: SocketAddr) -> Self {
        Self {
            peer_addr,
            data_peer: peer_addr,
            transfer_type: TransferType::default(),
            structure: FileStructure::default(),
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Returns the control connection's remote address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Returns the address the next data channel connects to.
    pub fn data_peer(&self) -> SocketAddr {
        self.data_peer
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    pub fn structure(&self) -> FileStructure {
        self.structure
    }

    pub fn is_binary(&self) -> bool {
        self.transfer_type == TransferType::Binary
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_transfer_type(&mut self, transfer_type: TransferType) {
        self.transfer_type = transfer_type;
    }

    pub fn set_structure(&mut self, structure: FileStructure) {
        self.structure = structure;
    }

    /// Sets the data port. The data host always stays the control peer's IP.
    pub fn set_data_port(&mut self, port: u16) {
        self.data_peer.set_port(port);
    }
}
