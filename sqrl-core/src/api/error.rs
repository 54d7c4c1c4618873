// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the SQRL API layer.

use thiserror::Error;

use crate::crypto::{EnScryptError, SealError};
use crate::identity::StoreError;
use crate::link::LinkError;
use crate::protocol::ProtocolError;

/// Unified error type for SQRL operations.
#[derive(Error, Debug)]
pub enum SqrlError {
    /// Link parsing or validation failed.
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// Password KDF failed.
    #[error("key derivation error: {0}")]
    Kdf(#[from] EnScryptError),

    /// Sealing or unsealing the master key failed.
    #[error("seal error: {0}")]
    Seal(#[from] SealError),

    /// Identity store operation failed.
    #[error("identity store error: {0}")]
    Store(#[from] StoreError),

    /// Protocol exchange failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// No identity is selected in the store.
    #[error("no identity selected")]
    NoIdentitySelected,

    /// The selected identity has not been unlocked yet.
    #[error("identity not unlocked")]
    IdentityNotUnlocked,

    /// `perform_ident` called without a completed query in this attempt.
    #[error("no query has completed in this login attempt")]
    NoPriorQuery,
}

/// Result type for SQRL operations.
pub type SqrlResult<T> = Result<T, SqrlError>;
