//! Transport Trait
//!
//! Platform-agnostic abstraction for the protocol's HTTP POST exchanges.
//!
//! # Synchronous Interface
//!
//! The core is driven synchronously, one login attempt at a time; callers
//! run it off any latency-sensitive thread. Platform implementations may use
//! async runtimes internally but expose a blocking interface here.

use super::error::ProtocolResult;

/// A decoded HTTP reply: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for protocol exchanges.
///
/// One call, one POST: the protocol never reuses an exchange across a
/// redirect, so implementations are free to open a fresh connection per
/// call.
pub trait Transport: Send {
    /// Posts a form body to `url` with the given headers and returns the
    /// server's reply.
    fn post(&mut self, url: &str, headers: &[(&'static str, String)], body: &str)
        -> ProtocolResult<HttpReply>;
}
