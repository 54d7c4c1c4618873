// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Master Key Sealing (AES-256-GCM)
//!
//! Authenticated encryption of the 32-byte master identity key under a key
//! derived from the user's password via EnScrypt. The sealed form is what
//! the identity store persists; the plaintext master key exists only
//! transiently in memory while in use.
//!
//! Sealing runs the KDF in duration mode (the achieved iteration count is
//! recorded in the sealed record); opening re-derives with that exact count.

use std::time::Duration;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;
use zeroize::Zeroize;

use super::enscrypt::{self, EnScryptError, ProgressFn};

/// Fixed associated-data tag mixed into the authentication tag.
///
/// Domain separator only, not a secret. Must stay byte-identical forever so
/// previously-created identities keep decrypting.
const SEAL_AAD: &[u8] = b"SQRL identity v1";

/// Salt length for the password KDF.
pub const SALT_LEN: usize = 16;
/// AES-256-GCM nonce length.
pub const IV_LEN: usize = 12;
/// AES-256-GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Sealing error types.
#[derive(Error, Debug)]
pub enum SealError {
    /// Authentication tag mismatch. For callers this means "wrong password";
    /// it is an expected, user-facing condition rather than a bug.
    #[error("authentication failed: wrong password or corrupted record")]
    AuthenticationFailed,

    /// Unexpected internal cryptographic failure.
    #[error("cryptographic failure: {0}")]
    Crypto(String),

    /// The password KDF rejected its input.
    #[error(transparent)]
    Kdf(#[from] EnScryptError),
}

/// An encrypted master key at rest: ciphertext plus the KDF parameters
/// needed to re-derive the sealing key from the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedKey {
    /// AES-256-GCM output: encrypted master key followed by the 16-byte tag.
    pub ciphertext: Vec<u8>,
    /// KDF salt, fresh per seal.
    pub salt: [u8; SALT_LEN],
    /// AES-GCM nonce, fresh per seal.
    pub iv: [u8; IV_LEN],
    /// EnScrypt iteration count achieved during sealing.
    pub iterations: u32,
}

/// Seals a master key under a password.
///
/// Generates a fresh random salt and IV, derives the sealing key with
/// EnScrypt in duration mode (`duration` is the wall-clock work target, 5
/// seconds in production), and authenticated-encrypts the master key.
pub fn seal_master_key(
    master_key: &[u8; 32],
    password: Option<&str>,
    duration: Duration,
) -> Result<SealedKey, SealError> {
    let rng = SystemRandom::new();
    let salt = ring::rand::generate::<[u8; SALT_LEN]>(&rng)
        .map_err(|_| SealError::Crypto("rng failure".to_string()))?
        .expose();
    let mut iv = [0u8; IV_LEN];
    rng.fill(&mut iv)
        .map_err(|_| SealError::Crypto("rng failure".to_string()))?;

    let (mut sealing_key, iterations) = enscrypt::derive_duration(password, Some(&salt), duration)?;

    let unbound = UnboundKey::new(&AES_256_GCM, &sealing_key)
        .map_err(|_| SealError::Crypto("invalid AES key".to_string()))?;
    sealing_key.zeroize();
    let key = LessSafeKey::new(unbound);

    let mut in_out = master_key.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(iv),
        Aad::from(SEAL_AAD),
        &mut in_out,
    )
    .map_err(|_| SealError::Crypto("seal failure".to_string()))?;

    Ok(SealedKey {
        ciphertext: in_out,
        salt,
        iv,
        iterations,
    })
}

/// Opens a sealed master key with the password it was sealed under.
///
/// Re-derives the sealing key with the stored salt and exact iteration
/// count, then attempts authenticated decryption. A wrong password shows up
/// as [`SealError::AuthenticationFailed`], never as a garbage key.
pub fn open_master_key(
    sealed: &SealedKey,
    password: Option<&str>,
    progress: Option<ProgressFn<'_>>,
) -> Result<[u8; 32], SealError> {
    let mut opening_key =
        enscrypt::derive_iterations(password, Some(&sealed.salt), sealed.iterations, progress)?;

    let unbound = UnboundKey::new(&AES_256_GCM, &opening_key)
        .map_err(|_| SealError::Crypto("invalid AES key".to_string()))?;
    opening_key.zeroize();
    let key = LessSafeKey::new(unbound);

    let mut buffer = sealed.ciphertext.clone();
    let plaintext = key
        .open_in_place(
            Nonce::assume_unique_for_key(sealed.iv),
            Aad::from(SEAL_AAD),
            &mut buffer,
        )
        .map_err(|_| SealError::AuthenticationFailed)?;

    let master_key: [u8; 32] = plaintext
        .try_into()
        .map_err(|_| SealError::AuthenticationFailed)?;
    buffer.zeroize();
    Ok(master_key)
}
