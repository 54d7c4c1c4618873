// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SQRL Orchestrator
//!
//! Main entry point for the SQRL API. This is the surface the UI shell
//! drives: link parsing, identity management, and the query/ident login
//! flow. One login attempt is one synchronous flow — parse, query, decide,
//! ident — safely invokable from a background worker; the core spawns no
//! threads of its own.

use std::sync::Arc;

use crate::identity::{Identity, IdentityStore};
use crate::link::SiteLink;
use crate::protocol::{
    Command, MockTransport, ProtocolConnection, ProtocolRequest, ProtocolResponse, Transport,
};

use super::config::SqrlConfig;
use super::error::{SqrlError, SqrlResult};
use super::events::{EventHandler, EventRelay, SqrlEvent};

/// Outcome of a `query` round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The server recognizes this identity.
    AccountExists,
    /// The server has never seen this identity.
    DoesNotExist,
}

/// Outcome of an `ident` round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentOutcome {
    /// The identification was sent and accepted by the server.
    Sent,
}

/// The unlocked identity for this session.
struct Session {
    name: String,
    identity: Identity,
}

/// State of one in-progress login attempt.
struct LoginAttempt<T: Transport> {
    connection: ProtocolConnection<T>,
    last_response: ProtocolResponse,
    account_exists: bool,
}

/// Main SQRL orchestrator.
///
/// Coordinates the identity store, the protocol engine, and event delivery
/// behind the narrow UI boundary.
///
/// # Example
///
/// ```ignore
/// use sqrl_core::api::{Sqrl, SqrlConfig};
///
/// let mut sqrl = Sqrl::new(SqrlConfig::default())?;
/// sqrl.create_identity("Alice", &camera_seed, Some("correct horse"))?;
/// sqrl.select_identity(Some("Alice"))?;
/// sqrl.unlock_identity(Some("correct horse"))?;
///
/// match sqrl.perform_query("sqrl://example.com/sqrl?nut=...")? {
///     QueryOutcome::AccountExists | QueryOutcome::DoesNotExist => {
///         sqrl.perform_ident()?;
///     }
/// }
/// ```
pub struct Sqrl<T: Transport> {
    config: SqrlConfig,
    store: IdentityStore,
    events: EventRelay,
    make_transport: Box<dyn Fn() -> T + Send + Sync>,
    session: Option<Session>,
    attempt: Option<LoginAttempt<T>>,
}

impl Sqrl<MockTransport> {
    /// Creates an orchestrator with the mock transport (for testing).
    pub fn new(config: SqrlConfig) -> SqrlResult<Self> {
        Self::with_transport_factory(config, MockTransport::new)
    }
}

#[cfg(feature = "network")]
impl Sqrl<crate::protocol::HttpTransport> {
    /// Creates an orchestrator that talks to real servers over HTTPS/HTTP.
    pub fn with_network(config: SqrlConfig) -> SqrlResult<Self> {
        let prototype = crate::protocol::HttpTransport::new()?;
        Self::with_transport_factory(config, move || prototype.clone())
    }
}

impl<T: Transport> Sqrl<T> {
    /// Creates an orchestrator with a custom transport factory.
    ///
    /// A fresh transport is created per login attempt; the protocol never
    /// reuses a transport across attempts.
    pub fn with_transport_factory<F>(config: SqrlConfig, transport_factory: F) -> SqrlResult<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let store = IdentityStore::open(&config.storage_dir)?;

        Ok(Sqrl {
            config,
            store,
            events: EventRelay::new(),
            make_transport: Box::new(transport_factory),
            session: None,
            attempt: None,
        })
    }

    // === Links ===

    /// Parses and validates a SQRL link.
    pub fn parse_link(&self, uri: &str) -> SqrlResult<SiteLink> {
        Ok(SiteLink::parse(uri)?)
    }

    /// Returns the display name for a SQRL link.
    pub fn display_name(&self, uri: &str) -> SqrlResult<String> {
        Ok(SiteLink::parse(uri)?.display_name())
    }

    // === Identity management ===

    /// Creates and persists a new identity.
    ///
    /// `extra_entropy` is the opaque seed supplied by the UI's entropy
    /// collector; it strengthens but never replaces system randomness.
    /// Sealing performs at least the configured KDF duration of work, so
    /// call this off any latency-sensitive thread.
    pub fn create_identity(
        &self,
        name: &str,
        extra_entropy: &[u8],
        password: Option<&str>,
    ) -> SqrlResult<()> {
        let identity = Identity::generate(extra_entropy);
        self.store
            .create(name, &identity, password, self.config.kdf_duration)?;
        Ok(())
    }

    /// Returns all identity names.
    pub fn list_identities(&self) -> Vec<String> {
        self.store.list()
    }

    /// Returns true if an identity with this name exists.
    pub fn identity_exists(&self, name: &str) -> bool {
        self.store.exists(name)
    }

    /// Selects (or with `None` deselects) the current identity.
    ///
    /// Changing the selection discards any unlocked session and any
    /// in-progress login attempt.
    pub fn select_identity(&mut self, name: Option<&str>) -> SqrlResult<()> {
        self.store.set_current(name)?;
        if self.session.as_ref().map(|s| s.name.as_str()) != name {
            self.session = None;
            self.attempt = None;
        }
        Ok(())
    }

    /// Returns the currently selected identity name.
    pub fn current_identity(&self) -> Option<String> {
        self.store.current()
    }

    /// Deletes an identity and its persisted record.
    pub fn delete_identity(&mut self, name: &str) -> SqrlResult<()> {
        self.store.remove(name)?;
        if self.session.as_ref().map(|s| s.name.as_str()) == Some(name) {
            self.session = None;
            self.attempt = None;
        }
        Ok(())
    }

    /// Deletes every identity, best-effort.
    pub fn delete_all_identities(&mut self) {
        self.store.remove_all();
        self.session = None;
        self.attempt = None;
    }

    /// Decrypts the selected identity for use in login attempts.
    ///
    /// Runs the full stored EnScrypt iteration count (seconds of work) and
    /// reports progress through the event relay. A wrong password surfaces
    /// as an authentication failure, not a crash.
    pub fn unlock_identity(&mut self, password: Option<&str>) -> SqrlResult<()> {
        let name = self.store.current().ok_or(SqrlError::NoIdentitySelected)?;

        let events = &self.events;
        let mut report = |percent: u32| events.post(SqrlEvent::KdfProgress { percent });
        let identity = self.store.unlock(&name, password, Some(&mut report))?;

        self.session = Some(Session { name, identity });
        Ok(())
    }

    // === Login flow ===

    /// Sends a `query` for the given link and reports whether an account
    /// exists. Starts a new login attempt, discarding any previous one.
    pub fn perform_query(&mut self, uri: &str) -> SqrlResult<QueryOutcome> {
        self.attempt = None;
        let session = self.session.as_ref().ok_or(SqrlError::IdentityNotUnlocked)?;

        let link = SiteLink::parse(uri)?;
        let mut connection = ProtocolConnection::open(link, (self.make_transport)())?;
        let request = ProtocolRequest::first(Command::Query, &session.identity, connection.link());

        let response = match request.send(&mut connection, &session.identity) {
            Ok(response) => response,
            Err(e) => {
                self.events.post(SqrlEvent::Error {
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let account_exists = response.current_account_exists();
        self.attempt = Some(LoginAttempt {
            connection,
            last_response: response,
            account_exists,
        });
        self.events.post(SqrlEvent::QueryCompleted { account_exists });

        Ok(if account_exists {
            QueryOutcome::AccountExists
        } else {
            QueryOutcome::DoesNotExist
        })
    }

    /// Sends the `ident` that completes the current login attempt.
    ///
    /// Requires a completed [`Sqrl::perform_query`]: the ident is chained
    /// onto that response and needs it to decide whether unlock keys must be
    /// included (they are when no account exists yet).
    pub fn perform_ident(&mut self) -> SqrlResult<IdentOutcome> {
        let session = self.session.as_ref().ok_or(SqrlError::IdentityNotUnlocked)?;
        let attempt = self.attempt.as_mut().ok_or(SqrlError::NoPriorQuery)?;

        let include_unlock_keys = !attempt.account_exists;
        let request = ProtocolRequest::chained(
            Command::Ident,
            &session.identity,
            attempt.connection.link().host(),
            &attempt.last_response,
            include_unlock_keys,
        );
        attempt.connection.redirect(attempt.last_response.qry())?;

        let response = match request.send(&mut attempt.connection, &session.identity) {
            Ok(response) => response,
            Err(e) => {
                self.events.post(SqrlEvent::Error {
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        attempt.account_exists = response.current_account_exists();
        attempt.last_response = response;
        self.events.post(SqrlEvent::IdentCompleted);
        Ok(IdentOutcome::Sent)
    }

    // === Events & accessors ===

    /// Attaches an event handler, receiving any buffered events first.
    pub fn attach_event_handler(&self, handler: Arc<dyn EventHandler>) {
        self.events.attach(handler);
    }

    /// Detaches the event handler; events buffer until the next attach.
    pub fn detach_event_handler(&self) {
        self.events.detach();
    }

    /// Returns the event relay.
    pub fn events(&self) -> &EventRelay {
        &self.events
    }

    /// Returns the identity store.
    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SqrlConfig {
        &self.config
    }
}
