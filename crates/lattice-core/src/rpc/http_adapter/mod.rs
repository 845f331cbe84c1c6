//! HTTP transport for node RPC endpoints.
//!
//! Implements [`super::Transport`] over `reqwest`, with per-attempt timeouts
//! and optional request rate limiting, plus endpoint URL validation.

mod client;
mod connection;

pub use client::{HttpRpcClient, HttpTransport};
pub(super) use connection::parse_endpoint;
