// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! Scripted transport for protocol tests: replies are queued up front, every
//! send is recorded for inspection.

use std::collections::VecDeque;

use super::error::{ProtocolError, ProtocolResult};
use super::transport::{HttpReply, Transport};

/// One captured outbound POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub url: String,
    pub body: String,
    pub headers: Vec<(&'static str, String)>,
}

/// In-memory transport with scripted replies.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: VecDeque<HttpReply>,
    sent: Vec<SentRequest>,
}

impl MockTransport {
    /// Creates an empty mock transport.
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Queues a reply for a future `post` call.
    pub fn queue_reply(&mut self, status: u16, body: impl Into<String>) {
        self.replies.push_back(HttpReply {
            status,
            body: body.into(),
        });
    }

    /// Returns every request sent so far.
    pub fn sent_requests(&self) -> &[SentRequest] {
        &self.sent
    }
}

impl Transport for MockTransport {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &str,
    ) -> ProtocolResult<HttpReply> {
        self.sent.push(SentRequest {
            url: url.to_string(),
            body: body.to_string(),
            headers: headers.to_vec(),
        });
        self.replies
            .pop_front()
            .ok_or_else(|| ProtocolError::Io("mock transport has no scripted reply".to_string()))
    }
}
