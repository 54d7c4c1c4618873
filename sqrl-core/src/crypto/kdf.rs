// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! HKDF Key Derivation
//!
//! Thin wrapper over `ring`'s HKDF-SHA256 for deriving sub-keys from the
//! master key with domain separation.

use ring::hkdf;

/// HKDF-SHA256 helper.
pub struct HKDF;

struct OutputLen(usize);

impl hkdf::KeyType for OutputLen {
    fn len(&self) -> usize {
        self.0
    }
}

impl HKDF {
    /// Derives a 32-byte key from input key material.
    ///
    /// `info` is the domain-separation string; distinct infos yield
    /// independent keys from the same material.
    pub fn derive_key(ikm: Option<&[u8]>, salt: &[u8], info: &[u8]) -> [u8; 32] {
        let salt = hkdf::Salt::new(hkdf::HKDF_SHA256, salt);
        let prk = salt.extract(ikm.unwrap_or(&[]));
        let info_components = [info];
        let okm = prk
            .expand(&info_components, OutputLen(32))
            .expect("32 bytes is within HKDF-SHA256 output bounds");

        let mut out = [0u8; 32];
        okm.fill(&mut out)
            .expect("output buffer matches requested length");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_separation() {
        let ikm = [1u8; 32];
        let a = HKDF::derive_key(Some(&ikm), b"site", b"context-a");
        let b = HKDF::derive_key(Some(&ikm), b"site", b"context-b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_deterministic() {
        let ikm = [2u8; 32];
        let a = HKDF::derive_key(Some(&ikm), b"salt", b"info");
        let b = HKDF::derive_key(Some(&ikm), b"salt", b"info");
        assert_eq!(a, b);
    }
}
