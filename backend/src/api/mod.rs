//! HTTP API module.
//!
//! Server, request/response types and the log stream.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{port_from_env, router, start_server, DEFAULT_PORT, PORT_ENV};
pub use types::*;
