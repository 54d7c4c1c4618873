//! SQRL Client Core Library
//!
//! Protocol engine and identity cryptography for the SQRL ("Secure, Quick,
//! Reliable Login") challenge-response authentication protocol.
//! All cryptographic operations use the audited `ring` crate, with the
//! RustCrypto `scrypt` primitive underneath the EnScrypt password KDF.

pub mod api;
pub mod crypto;
pub mod identity;
pub mod link;
pub mod protocol;

pub use api::{
    EventHandler, EventRelay, IdentOutcome, QueryOutcome, Sqrl, SqrlConfig, SqrlError, SqrlEvent,
    SqrlResult,
};
pub use crypto::{
    EnScryptError, PublicKey, SealError, SealedKey, Signature, SigningKeyPair,
};
pub use identity::{Identity, IdentityStore, StoreError};
pub use link::{LinkError, SiteLink};
pub use protocol::{
    Command, HttpReply, MockTransport, ProtocolConnection, ProtocolError, ProtocolRequest,
    ProtocolResponse, Transport,
};
#[cfg(feature = "network")]
pub use protocol::HttpTransport;
