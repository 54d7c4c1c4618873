// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Configuration

use std::path::PathBuf;
use std::time::Duration;

/// Minimum KDF work when sealing a new identity (brute-force resistance).
const DEFAULT_KDF_DURATION: Duration = Duration::from_secs(5);

/// Configuration for the SQRL orchestrator.
///
/// Constructed by the embedding application and passed in explicitly; the
/// core has no ambient globals.
#[derive(Debug, Clone)]
pub struct SqrlConfig {
    /// Directory holding one record file per identity.
    pub storage_dir: PathBuf,
    /// Wall-clock EnScrypt work target when sealing a new identity.
    pub kdf_duration: Duration,
}

impl Default for SqrlConfig {
    fn default() -> Self {
        SqrlConfig {
            storage_dir: PathBuf::from("sqrl-identities"),
            kdf_duration: DEFAULT_KDF_DURATION,
        }
    }
}

impl SqrlConfig {
    /// Config rooted at a specific storage directory.
    pub fn with_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        SqrlConfig {
            storage_dir: storage_dir.into(),
            ..Default::default()
        }
    }
}
