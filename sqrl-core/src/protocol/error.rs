// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Protocol Error Types

use thiserror::Error;

use crate::link::LinkError;

/// Errors from the protocol engine.
///
/// `Transient` is deliberately a data-carrying variant rather than a side
/// channel: the single-shot retry in the request path is an explicit match
/// arm on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The underlying link was invalid or a redirect target was rejected.
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// Transport-level I/O failure.
    #[error("transport error: {0}")]
    Io(String),

    /// The server answered outside the 2xx range.
    #[error("server returned HTTP status {0}")]
    HttpStatus(u16),

    /// The response body violated the protocol grammar.
    #[error("invalid server response: {0}")]
    InvalidServerResponse(String),

    /// The server offers no protocol version this client speaks.
    #[error("no supported protocol version in ver={0}")]
    VersionNotSupported(String),

    /// The server flagged the command as failed (hard tif bits).
    #[error("server reported command failure (tif={tif:#x})")]
    CommandFailed { tif: u32 },

    /// The server asked for a retry with fresh parameters (tif 0x20).
    ///
    /// Carries everything the retry needs: the fresh nut, the redirect
    /// path+query, and the raw response body to forward as the next server
    /// value.
    #[error("transient server error, retry at {qry}")]
    Transient {
        nut: String,
        qry: String,
        body: String,
    },
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
