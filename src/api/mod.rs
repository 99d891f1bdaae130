//! HTTP API module.
//!
//! This module provides the HTTP server, API types, and the broadcast
//! logger used by the whole pipeline.

pub mod logs;
pub mod server;
pub mod types;

pub use server::start_server;
pub use types::*;
