//! HTTP API module.
//!
//! This module provides the HTTP server, wire types and log streaming
//! for the SylvaScan knowledge backend.

pub mod server;
pub mod types;
pub mod logs;

pub use server::start_server;
pub use types::*;
pub use logs::*;
