// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Identity Store
//!
//! The process-wide identity registry and sole mutator of persisted identity
//! state. One file per identity; the filename is the unpadded base64url
//! encoding of the identity name, so arbitrary user text (path separators
//! included) never reaches the filesystem verbatim.
//!
//! Record layout, length-checked on load:
//!   sealed: `0x01 || iterations (u32 LE) || salt (16) || iv (12) || ciphertext (48)`
//!   plain : `0x00 || master_key (32)`
//!
//! All mutations are serialized behind one mutex: uniqueness and the
//! current-identity pointer are test-and-set invariants.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use thiserror::Error;

use super::Identity;
use crate::crypto::enscrypt::ProgressFn;
use crate::crypto::seal::{self, SealedKey, IV_LEN, SALT_LEN, TAG_LEN};
use crate::crypto::SealError;

/// Record tag for a password-sealed master key.
const TAG_SEALED: u8 = 0x01;
/// Record tag for an unencrypted master key (test/legacy path).
const TAG_PLAIN: u8 = 0x00;

/// Filename suffix for identity records.
const RECORD_SUFFIX: &str = ".id";

/// Total sealed record length: tag + iterations + salt + iv + ciphertext.
const SEALED_RECORD_LEN: usize = 1 + 4 + SALT_LEN + IV_LEN + 32 + TAG_LEN;
/// Total plain record length: tag + master key.
const PLAIN_RECORD_LEN: usize = 1 + 32;

/// Identity store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("identity '{0}' already exists")]
    AlreadyExists(String),

    #[error("identity '{0}' not found")]
    NotFound(String),

    #[error("failed to write identity record: {0}")]
    WriteFailed(String),

    #[error("failed to delete identity record: {0}")]
    DeleteFailed(String),

    /// Fatal at construction: without a readable store the uniqueness and
    /// current-identity invariants cannot be guaranteed.
    #[error("identities could not be loaded: {0}")]
    Load(String),

    #[error(transparent)]
    Seal(#[from] SealError),
}

/// A master key at rest, in either of the two record forms.
#[derive(Debug, Clone)]
enum StoredKey {
    Sealed(SealedKey),
    Plain([u8; 32]),
}

struct StoreInner {
    records: BTreeMap<String, StoredKey>,
    current: Option<String>,
}

/// Maps identity names to persisted master keys and tracks the single
/// "current" identity.
pub struct IdentityStore {
    dir: PathBuf,
    inner: Mutex<StoreInner>,
}

impl IdentityStore {
    /// Opens the store, scanning `dir` for persisted identity records.
    ///
    /// A single unreadable or malformed record is skipped with a warning; a
    /// directory that cannot be created or scanned at all is fatal.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Load(e.to_string()))?;

        let mut records = BTreeMap::new();
        let entries = std::fs::read_dir(&dir).map_err(|e| StoreError::Load(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Load(e.to_string()))?;
            let path = entry.path();
            match load_record(&path) {
                Some((name, key)) => {
                    records.insert(name, key);
                }
                None => {
                    tracing::warn!(path = %path.display(), "skipping unreadable identity record");
                }
            }
        }

        Ok(IdentityStore {
            dir,
            inner: Mutex::new(StoreInner {
                records,
                current: None,
            }),
        })
    }

    /// Creates and persists a new identity.
    ///
    /// With a password the master key is sealed with at least `kdf_duration`
    /// of EnScrypt work; without one it is stored unencrypted (test/legacy
    /// path only). Name uniqueness is checked before any disk write.
    pub fn create(
        &self,
        name: &str,
        identity: &Identity,
        password: Option<&str>,
        kdf_duration: Duration,
    ) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::WriteFailed("name must not be empty".to_string()));
        }
        {
            let inner = self.inner.lock().expect("store mutex poisoned");
            if inner.records.contains_key(name) {
                return Err(StoreError::AlreadyExists(name.to_string()));
            }
        }

        // The KDF runs for seconds; keep it outside the lock and re-check
        // uniqueness before committing.
        let stored = match password {
            Some(_) => StoredKey::Sealed(seal::seal_master_key(
                identity.master_key(),
                password,
                kdf_duration,
            )?),
            None => StoredKey::Plain(*identity.master_key()),
        };

        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.records.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        std::fs::write(self.record_path(name), encode_record(&stored))
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        inner.records.insert(name.to_string(), stored);
        Ok(())
    }

    /// Returns all identity names. Order is stable within one load.
    pub fn list(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.records.keys().cloned().collect()
    }

    /// Returns true if an identity with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.records.contains_key(name)
    }

    /// Selects the current identity, or deselects with `None`.
    ///
    /// Selecting an unknown name fails without changing the selection.
    pub fn set_current(&self, name: Option<&str>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        match name {
            None => {
                inner.current = None;
                Ok(())
            }
            Some(name) => {
                if !inner.records.contains_key(name) {
                    return Err(StoreError::NotFound(name.to_string()));
                }
                inner.current = Some(name.to_string());
                Ok(())
            }
        }
    }

    /// Returns the currently selected identity name, if any.
    pub fn current(&self) -> Option<String> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.current.clone()
    }

    /// Removes an identity and its on-disk record.
    ///
    /// If the removed identity was current, the selection is cleared — the
    /// current pointer is never left dangling.
    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if !inner.records.contains_key(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        std::fs::remove_file(self.record_path(name))
            .map_err(|e| StoreError::DeleteFailed(e.to_string()))?;
        inner.records.remove(name);
        if inner.current.as_deref() == Some(name) {
            inner.current = None;
        }
        Ok(())
    }

    /// Removes every identity, best-effort.
    ///
    /// Individual deletion failures are logged and do not abort the rest.
    pub fn remove_all(&self) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let names: Vec<String> = inner.records.keys().cloned().collect();
        for name in names {
            if let Err(e) = std::fs::remove_file(self.record_path(&name)) {
                tracing::warn!(identity = %name, error = %e, "failed to delete identity record");
            }
            inner.records.remove(&name);
        }
        inner.current = None;
    }

    /// Decrypts an identity's master key and returns the usable identity.
    ///
    /// For sealed records a wrong password surfaces as
    /// [`SealError::AuthenticationFailed`]; plain records ignore the
    /// password.
    pub fn unlock(
        &self,
        name: &str,
        password: Option<&str>,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Identity, StoreError> {
        let stored = {
            let inner = self.inner.lock().expect("store mutex poisoned");
            inner
                .records
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(name.to_string()))?
        };

        // KDF work happens outside the lock.
        match stored {
            StoredKey::Plain(master_key) => Ok(Identity::from_master_key(master_key)),
            StoredKey::Sealed(sealed) => {
                let master_key = seal::open_master_key(&sealed, password, progress)?;
                Ok(Identity::from_master_key(master_key))
            }
        }
    }

    fn record_path(&self, name: &str) -> PathBuf {
        let encoded = URL_SAFE_NO_PAD.encode(name.as_bytes());
        self.dir.join(format!("{}{}", encoded, RECORD_SUFFIX))
    }
}

/// Serializes a stored key into its on-disk record form.
fn encode_record(stored: &StoredKey) -> Vec<u8> {
    match stored {
        StoredKey::Plain(master_key) => {
            let mut out = Vec::with_capacity(PLAIN_RECORD_LEN);
            out.push(TAG_PLAIN);
            out.extend_from_slice(master_key);
            out
        }
        StoredKey::Sealed(sealed) => {
            let mut out = Vec::with_capacity(SEALED_RECORD_LEN);
            out.push(TAG_SEALED);
            out.extend_from_slice(&sealed.iterations.to_le_bytes());
            out.extend_from_slice(&sealed.salt);
            out.extend_from_slice(&sealed.iv);
            out.extend_from_slice(&sealed.ciphertext);
            out
        }
    }
}

/// Loads one record file. Returns `None` on anything malformed: wrong
/// suffix, undecodable name, unexpected length, unknown tag.
fn load_record(path: &Path) -> Option<(String, StoredKey)> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.strip_suffix(RECORD_SUFFIX)?;
    let name_bytes = URL_SAFE_NO_PAD.decode(stem.as_bytes()).ok()?;
    let name = String::from_utf8(name_bytes).ok()?;

    let bytes = std::fs::read(path).ok()?;
    let key = decode_record(&bytes)?;
    Some((name, key))
}

/// Parses the record payload, rejecting unexpected lengths rather than
/// guessing.
fn decode_record(bytes: &[u8]) -> Option<StoredKey> {
    match bytes.first()? {
        &TAG_PLAIN => {
            if bytes.len() != PLAIN_RECORD_LEN {
                return None;
            }
            let master_key: [u8; 32] = bytes[1..].try_into().ok()?;
            Some(StoredKey::Plain(master_key))
        }
        &TAG_SEALED => {
            if bytes.len() != SEALED_RECORD_LEN {
                return None;
            }
            let iterations = u32::from_le_bytes(bytes[1..5].try_into().ok()?);
            let salt: [u8; SALT_LEN] = bytes[5..5 + SALT_LEN].try_into().ok()?;
            let iv: [u8; IV_LEN] = bytes[5 + SALT_LEN..5 + SALT_LEN + IV_LEN].try_into().ok()?;
            let ciphertext = bytes[5 + SALT_LEN + IV_LEN..].to_vec();
            Some(StoredKey::Sealed(SealedKey {
                ciphertext,
                salt,
                iv,
                iterations,
            }))
        }
        _ => None,
    }
}
