// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Identity Management Module
//!
//! The master identity key and everything derived from it. Each relying-party
//! site sees its own Ed25519 keypair, derived from the master key and the
//! site's hostname, so sites cannot correlate a user across domains.

pub mod store;

pub use store::{IdentityStore, StoreError};

use ring::digest;
use ring::hmac;
use ring::rand::SystemRandom;
use zeroize::Zeroize;

use crate::crypto::{PublicKey, SigningKeyPair, HKDF};

/// HKDF info string for the server unlock key.
const SUK_INFO: &[u8] = b"SQRL Server Unlock Key";
/// HKDF info string for the verify unlock key.
const VUK_INFO: &[u8] = b"SQRL Verify Unlock Key";

/// A user identity: the 32-byte master secret all site keys derive from.
///
/// Exists in plaintext only while in use; at rest it is always sealed (see
/// [`crate::crypto::seal`]).
pub struct Identity {
    master_key: [u8; 32],
}

impl Drop for Identity {
    fn drop(&mut self) {
        self.master_key.zeroize();
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose key bytes in debug output
        f.debug_struct("Identity")
            .field("master_key", &"[REDACTED]")
            .finish()
    }
}

impl Identity {
    /// Generates a brand-new identity.
    ///
    /// `extra_entropy` is an opaque seed from the caller (e.g. harvested by
    /// the UI's camera subsystem); it is hashed together with system
    /// randomness, never interpreted, and never required to be strong on its
    /// own.
    pub fn generate(extra_entropy: &[u8]) -> Self {
        let rng = SystemRandom::new();
        let mut system = ring::rand::generate::<[u8; 32]>(&rng)
            .expect("System RNG should not fail")
            .expose();

        let mut ctx = digest::Context::new(&digest::SHA256);
        ctx.update(&system);
        ctx.update(extra_entropy);
        let mixed = ctx.finish();
        system.zeroize();

        let master_key: [u8; 32] = mixed
            .as_ref()
            .try_into()
            .expect("SHA-256 output is always 32 bytes");
        Identity { master_key }
    }

    /// Wraps an existing 32-byte master key.
    pub fn from_master_key(master_key: [u8; 32]) -> Self {
        Identity { master_key }
    }

    /// Returns the raw master key bytes.
    pub fn master_key(&self) -> &[u8; 32] {
        &self.master_key
    }

    /// Derives the Ed25519 keypair this identity uses towards one site.
    ///
    /// Seed = HMAC-SHA256(master key, hostname), so the keypair is stable
    /// per site and unlinkable across sites.
    pub fn site_keypair(&self, host: &str) -> SigningKeyPair {
        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.master_key);
        let tag = hmac::sign(&key, host.as_bytes());
        let seed: [u8; 32] = tag
            .as_ref()
            .try_into()
            .expect("HMAC-SHA256 output is always 32 bytes");
        SigningKeyPair::from_seed(&seed)
    }

    /// Server unlock key sent with `ident` when the site has no account yet.
    pub fn server_unlock_key(&self, host: &str) -> PublicKey {
        self.unlock_keypair(host, SUK_INFO).public_key()
    }

    /// Verify unlock key sent alongside the server unlock key.
    pub fn verify_unlock_key(&self, host: &str) -> PublicKey {
        self.unlock_keypair(host, VUK_INFO).public_key()
    }

    fn unlock_keypair(&self, host: &str, info: &[u8]) -> SigningKeyPair {
        let seed = HKDF::derive_key(Some(&self.master_key), host.as_bytes(), info);
        SigningKeyPair::from_seed(&seed)
    }
}
