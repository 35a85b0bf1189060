//! FTP Protocol implementation
//!
//! Handles control line framing, command parsing, dispatch and replies.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Command, tokenize};
pub use handlers::{CommandStatus, Dispatcher};
pub use parser::LineReader;
pub use responses::Reply;
