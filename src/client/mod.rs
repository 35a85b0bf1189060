//! Client connection handling
//!
//! Per-connection session state and the control loop that drives it.

pub mod handler;
pub mod state;

pub use handler::{handle_client, run_session};
pub use state::{FileStructure, Session, TransferType};
