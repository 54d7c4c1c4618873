// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP Transport
//!
//! Production transport over `reqwest`'s blocking client with rustls.

use std::time::Duration;

use super::error::{ProtocolError, ProtocolResult};
use super::transport::{HttpReply, Transport};

/// Request timeout for protocol exchanges.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport with the protocol's fixed client settings.
    pub fn new() -> ProtocolResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProtocolError::Io(e.to_string()))?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &str,
    ) -> ProtocolResult<HttpReply> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request
            .body(body.to_string())
            .send()
            .map_err(|e| ProtocolError::Io(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ProtocolError::Io(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}
