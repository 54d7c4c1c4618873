// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Protocol Request Construction
//!
//! Builds the signed `client=&server=&ids=` wire body and drives one
//! protocol step, including the single-shot transient-error retry.
//!
//! Message chaining: the first request of a login attempt carries the
//! base64url-encoded original link as its server value; every later request
//! forwards the previous response's wire body verbatim. The `ids` signature
//! covers the textual concatenation of the two base64 values.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use super::connection::ProtocolConnection;
use super::error::{ProtocolError, ProtocolResult};
use super::response::ProtocolResponse;
use super::transport::Transport;
use crate::identity::Identity;
use crate::link::SiteLink;

/// The subset of SQRL commands this client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask whether the identity is known to the server.
    Query,
    /// Authenticate (and create the account if the query said none exists).
    Ident,
}

impl Command {
    fn wire_name(self) -> &'static str {
        match self {
            Command::Query => "query",
            Command::Ident => "ident",
        }
    }
}

/// One protocol message, built and signed, ready to send.
///
/// Ephemeral: construct, send, discard. Chaining state lives in the
/// responses, not here.
pub struct ProtocolRequest {
    command: Command,
    include_unlock_keys: bool,
    client_value: String,
    server_value: String,
    signature: String,
}

impl ProtocolRequest {
    /// Builds the first request of a login attempt.
    ///
    /// The server value is the base64url encoding of the full original link.
    pub fn first(command: Command, identity: &Identity, link: &SiteLink) -> Self {
        let server_value = URL_SAFE_NO_PAD.encode(link.to_string().as_bytes());
        Self::build(command, identity, link.host(), server_value, false)
    }

    /// Builds a request chained onto a previous response.
    ///
    /// `include_unlock_keys` adds the `suk`/`vuk` lines; required for an
    /// `ident` that creates a new account.
    pub fn chained(
        command: Command,
        identity: &Identity,
        host: &str,
        previous: &ProtocolResponse,
        include_unlock_keys: bool,
    ) -> Self {
        Self::build(
            command,
            identity,
            host,
            previous.wire_body().to_string(),
            include_unlock_keys,
        )
    }

    fn build(
        command: Command,
        identity: &Identity,
        host: &str,
        server_value: String,
        include_unlock_keys: bool,
    ) -> Self {
        let site_keys = identity.site_keypair(host);

        let mut client = format!(
            "ver=1\r\ncmd={}\r\nidk={}\r\n",
            command.wire_name(),
            site_keys.public_key().to_base64url()
        );
        if include_unlock_keys {
            client.push_str(&format!(
                "suk={}\r\nvuk={}\r\n",
                identity.server_unlock_key(host).to_base64url(),
                identity.verify_unlock_key(host).to_base64url()
            ));
        }
        let client_value = URL_SAFE_NO_PAD.encode(client.as_bytes());

        let signature = sign_values(&site_keys, &client_value, &server_value);

        ProtocolRequest {
            command,
            include_unlock_keys,
            client_value,
            server_value,
            signature,
        }
    }

    /// The command this request carries.
    pub fn command(&self) -> Command {
        self.command
    }

    /// The `client=&server=&ids=` form body.
    pub fn wire_body(&self) -> String {
        format!(
            "client={}&server={}&ids={}",
            self.client_value, self.server_value, self.signature
        )
    }

    /// Sends the request and decodes the reply.
    ///
    /// Implements the transient-error sub-protocol: on a
    /// [`ProtocolError::Transient`] decode outcome the connection is
    /// redirected to the supplied `qry`, the same client value is re-signed
    /// against the transient response body as the new server value, and the
    /// message is sent exactly once more. Whatever the retry yields — success
    /// or any failure, a second transient included — is final.
    pub fn send<T: Transport>(
        self,
        connection: &mut ProtocolConnection<T>,
        identity: &Identity,
    ) -> ProtocolResult<ProtocolResponse> {
        let reply = connection.post_form(&self.wire_body())?;
        if !reply.is_success() {
            return Err(ProtocolError::HttpStatus(reply.status));
        }

        match ProtocolResponse::decode(&reply.body) {
            Err(ProtocolError::Transient { qry, body, .. }) => {
                connection.redirect(&qry)?;
                let retry = self.rechain(identity, connection.link().host(), body);

                let reply = connection.post_form(&retry.wire_body())?;
                if !reply.is_success() {
                    return Err(ProtocolError::HttpStatus(reply.status));
                }
                ProtocolResponse::decode(&reply.body)
            }
            other => other,
        }
    }

    /// Rebuilds this request with a new server value, re-signing. The client
    /// value is kept byte-identical.
    fn rechain(self, identity: &Identity, host: &str, server_value: String) -> Self {
        let site_keys = identity.site_keypair(host);
        let signature = sign_values(&site_keys, &self.client_value, &server_value);
        ProtocolRequest {
            server_value,
            signature,
            ..self
        }
    }
}

/// Signs `client_value + server_value` as UTF-8 text.
fn sign_values(
    site_keys: &crate::crypto::SigningKeyPair,
    client_value: &str,
    server_value: &str,
) -> String {
    let mut message = String::with_capacity(client_value.len() + server_value.len());
    message.push_str(client_value);
    message.push_str(server_value);
    site_keys.sign(message.as_bytes()).to_base64url()
}
