//! Transfer module for the FTP server
//!
//! Data channel management, the chunked transfer engine and the LIST
//! byte-stream producers.

pub mod data_channel;
pub mod file_ops;
pub mod listing;

pub use data_channel::DataChannel;
pub use file_ops::{DEFAULT_CHUNK_SIZE, stream};
pub use listing::{Lister, Listing};
