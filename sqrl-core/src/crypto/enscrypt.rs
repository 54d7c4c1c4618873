// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! EnScrypt Password Key Derivation
//!
//! The SQRL password KDF: repeated scrypt calls where each output re-seeds
//! the next call's salt and the 32-byte results are XOR-accumulated into the
//! final key. Memory/CPU hardness comes from the fixed scrypt parameters
//! (N=512, r=256, p=1); total work is set either by an exact iteration count
//! or by a wall-clock duration.

use std::time::{Duration, Instant};

use scrypt::Params;
use thiserror::Error;
use zeroize::Zeroize;

/// EnScrypt error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnScryptError {
    /// Passwords must not contain NUL bytes (protocol restriction).
    #[error("password must not contain NUL bytes")]
    EmbeddedNul,

    /// Iteration count must be positive.
    #[error("iteration count must be positive")]
    ZeroIterations,

    /// The scrypt primitive rejected its parameters.
    #[error("scrypt failure: {0}")]
    Scrypt(String),
}

/// log2 of the scrypt CPU/memory cost (N = 512).
const SCRYPT_LOG_N: u8 = 9;
/// scrypt block size.
const SCRYPT_R: u32 = 256;
/// scrypt parallelism.
const SCRYPT_P: u32 = 1;
/// Derived key length in bytes.
const KEY_LEN: usize = 32;

/// Progress callback, invoked with a 0-100 percentage after each completed
/// iteration (iteration-bounded mode only).
pub type ProgressFn<'a> = &'a mut dyn FnMut(u32);

/// Derives a 32-byte key with a fixed iteration count.
///
/// Fully deterministic: identical `(password, salt, iterations)` inputs
/// always produce the identical key. `None` password or salt are treated as
/// empty byte strings.
pub fn derive_iterations(
    password: Option<&str>,
    salt: Option<&[u8]>,
    iterations: u32,
    mut progress: Option<ProgressFn<'_>>,
) -> Result<[u8; 32], EnScryptError> {
    if iterations == 0 {
        return Err(EnScryptError::ZeroIterations);
    }

    let mut password = nul_terminated(password)?;
    let mut state = [0u8; KEY_LEN];
    let mut key = [0u8; KEY_LEN];

    let mut result = Ok(());
    for i in 1..=iterations {
        let chain_salt = if i == 1 {
            salt.unwrap_or(&[]).to_vec()
        } else {
            state.to_vec()
        };
        result = scrypt_once(&password, &chain_salt, &mut state);
        if result.is_err() {
            break;
        }
        xor_into(&mut key, &state);
        if let Some(report) = progress.as_deref_mut() {
            report(100 * i / iterations);
        }
    }

    password.zeroize();
    state.zeroize();
    result.map(|_| key)
}

/// Derives a 32-byte key by iterating until `duration` has elapsed.
///
/// The clock is checked after each full iteration, so at least one iteration
/// always runs. Returns the key together with the iteration count achieved;
/// callers persist that count so a later [`derive_iterations`] call with the
/// same inputs reproduces the key exactly.
pub fn derive_duration(
    password: Option<&str>,
    salt: Option<&[u8]>,
    duration: Duration,
) -> Result<([u8; 32], u32), EnScryptError> {
    let mut password = nul_terminated(password)?;
    let mut state = [0u8; KEY_LEN];
    let mut key = [0u8; KEY_LEN];
    let mut iterations: u32 = 0;

    let start = Instant::now();
    let mut result = Ok(());
    loop {
        let chain_salt = if iterations == 0 {
            salt.unwrap_or(&[]).to_vec()
        } else {
            state.to_vec()
        };
        result = scrypt_once(&password, &chain_salt, &mut state);
        if result.is_err() {
            break;
        }
        xor_into(&mut key, &state);
        iterations += 1;
        if start.elapsed() >= duration {
            break;
        }
    }

    password.zeroize();
    state.zeroize();
    result.map(|_| (key, iterations))
}

/// Validates the password and appends the protocol's NUL terminator.
fn nul_terminated(password: Option<&str>) -> Result<Vec<u8>, EnScryptError> {
    let bytes = password.map(str::as_bytes).unwrap_or_default();
    if bytes.contains(&0) {
        return Err(EnScryptError::EmbeddedNul);
    }
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.extend_from_slice(bytes);
    out.push(0);
    Ok(out)
}

/// One scrypt pass with the fixed EnScrypt parameters.
fn scrypt_once(password: &[u8], salt: &[u8], out: &mut [u8; KEY_LEN]) -> Result<(), EnScryptError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| EnScryptError::Scrypt(e.to_string()))?;
    scrypt::scrypt(password, salt, &params, out).map_err(|e| EnScryptError::Scrypt(e.to_string()))
}

fn xor_into(acc: &mut [u8; KEY_LEN], chunk: &[u8; KEY_LEN]) {
    for (a, b) in acc.iter_mut().zip(chunk.iter()) {
        *a ^= b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_nul_rejected_before_work() {
        for pw in ["\0lead", "mid\0dle", "trail\0"] {
            assert_eq!(
                derive_iterations(Some(pw), None, 1, None),
                Err(EnScryptError::EmbeddedNul)
            );
        }
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert_eq!(
            derive_iterations(None, None, 0, None),
            Err(EnScryptError::ZeroIterations)
        );
    }

    #[test]
    fn test_progress_fires_per_iteration() {
        let mut seen = Vec::new();
        let mut report = |pct: u32| seen.push(pct);
        derive_iterations(None, None, 4, Some(&mut report)).unwrap();
        assert_eq!(seen, vec![25, 50, 75, 100]);
    }
}
