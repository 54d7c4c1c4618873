// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Protocol Connection
//!
//! Binds a validated [`SiteLink`] to a transport and owns the fixed request
//! headers. A server redirect replaces the link's path+query atomically and
//! subsequent posts target the new communication URL; the old exchange is
//! never reused.

use url::Url;

use super::error::ProtocolResult;
use super::transport::{HttpReply, Transport};
use crate::link::SiteLink;

/// The protocol version this client identifies as.
const USER_AGENT: &str = "SQRL/1";

/// An open protocol connection: link plus transport.
pub struct ProtocolConnection<T: Transport> {
    link: SiteLink,
    comm_url: Url,
    transport: T,
}

impl<T: Transport> ProtocolConnection<T> {
    /// Opens a connection to the link's communication URL.
    pub fn open(link: SiteLink, transport: T) -> ProtocolResult<Self> {
        let comm_url = link.communication_url()?;
        Ok(ProtocolConnection {
            link,
            comm_url,
            transport,
        })
    }

    /// Returns the link this connection targets.
    pub fn link(&self) -> &SiteLink {
        &self.link
    }

    /// Posts a wire body with the protocol's fixed headers.
    pub fn post_form(&mut self, body: &str) -> ProtocolResult<HttpReply> {
        let headers = [
            ("Host", self.link.host().to_string()),
            ("User-Agent", USER_AGENT.to_string()),
            (
                "Content-Type",
                "application/x-www-form-urlencoded".to_string(),
            ),
        ];
        self.transport.post(self.comm_url.as_str(), &headers, body)
    }

    /// Redirects to a server-supplied path+query.
    ///
    /// Delegates to the link's atomic replace (failure leaves the connection
    /// targeting its previous URL) and re-resolves the communication URL.
    pub fn redirect(&mut self, path_and_query: &str) -> ProtocolResult<()> {
        self.link.replace_path_and_query(path_and_query)?;
        self.comm_url = self.link.communication_url()?;
        Ok(())
    }

    /// Consumes the connection, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
