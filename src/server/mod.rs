//! Server core functionality
//!
//! The control listener and the accept loop that hands each connection to
//! its own session task.

pub mod core;

pub use self::core::Server;
