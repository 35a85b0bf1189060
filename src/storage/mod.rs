//! File system path handling
//!
//! Maps client path arguments onto the server root.

pub mod validation;

pub use validation::{resolve_client_path, strip_leading_separator};
