// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod enscrypt;
pub mod kdf;
pub mod seal;
pub mod signing;

pub use enscrypt::{derive_duration, derive_iterations, EnScryptError};
pub use kdf::HKDF;
pub use seal::{open_master_key, seal_master_key, SealError, SealedKey};
pub use signing::{PublicKey, Signature, SigningKeyPair};
