// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SQRL Link Handling
//!
//! Parses and validates `sqrl://` / `qrl://` authentication links. A link
//! always carries a one-time `nut` nonce; an optional `sfn` parameter holds
//! a base64url-encoded friendly name for display.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use thiserror::Error;
use url::Url;

/// Link error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The URI scheme is not `sqrl` or `qrl`.
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    /// The mandatory `nut` query parameter is missing or empty.
    #[error("link has no nut parameter")]
    MissingNut,

    /// The URI (or a replacement path+query) is not syntactically valid.
    #[error("malformed url: {0}")]
    MalformedUrl(String),
}

/// Link scheme. `Sqrl` maps to HTTPS transport, `Qrl` to plain HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Sqrl,
    Qrl,
}

impl Scheme {
    fn parse(scheme: &str) -> Result<Self, LinkError> {
        match scheme.to_ascii_lowercase().as_str() {
            "sqrl" => Ok(Scheme::Sqrl),
            "qrl" => Ok(Scheme::Qrl),
            other => Err(LinkError::UnknownScheme(other.to_string())),
        }
    }

    fn transport_scheme(self) -> &'static str {
        match self {
            Scheme::Sqrl => "https",
            Scheme::Qrl => "http",
        }
    }
}

/// A validated SQRL authentication link.
///
/// Immutable except for [`SiteLink::replace_path_and_query`], which is driven
/// by server redirects and either succeeds wholly or leaves the link
/// untouched.
#[derive(Debug, Clone)]
pub struct SiteLink {
    url: Url,
    scheme: Scheme,
}

impl SiteLink {
    /// Parses and validates a SQRL link string.
    pub fn parse(uri: &str) -> Result<Self, LinkError> {
        let url = Url::parse(uri).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => {
                LinkError::UnknownScheme(String::new())
            }
            other => LinkError::MalformedUrl(other.to_string()),
        })?;

        let scheme = Scheme::parse(url.scheme())?;
        require_nut(&url)?;

        Ok(SiteLink { url, scheme })
    }

    /// Returns the link scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns the host the link points at.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Returns the one-time server nonce.
    pub fn nut(&self) -> String {
        query_param(&self.url, "nut").unwrap_or_default()
    }

    /// Returns a human-readable name for the site.
    ///
    /// Prefers the `sfn` parameter (base64url-encoded UTF-8); falls back to
    /// the hostname on absence or any decode failure.
    pub fn display_name(&self) -> String {
        if let Some(sfn) = query_param(&self.url, "sfn") {
            if let Ok(bytes) = URL_SAFE_NO_PAD.decode(sfn.as_bytes()) {
                if let Ok(name) = String::from_utf8(bytes) {
                    return name;
                }
            }
        }
        self.host().to_string()
    }

    /// Returns the URL the protocol actually talks to.
    ///
    /// Same URI with the scheme rewritten to `https` (for `sqrl`) or `http`
    /// (for `qrl`). The original scheme stays in the stored link for display.
    pub fn communication_url(&self) -> Result<Url, LinkError> {
        let raw = self.url.as_str();
        let rest = raw
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or_default();
        let rewritten = format!("{}:{}", self.scheme.transport_scheme(), rest);
        Url::parse(&rewritten).map_err(|e| LinkError::MalformedUrl(e.to_string()))
    }

    /// Atomically replaces the path and query with a server-supplied value.
    ///
    /// Splits `new_path_and_query` on the first `?`. The replacement is
    /// validated (including the nut invariant) before it is committed; on
    /// failure the link is left unmodified.
    pub fn replace_path_and_query(&mut self, new_path_and_query: &str) -> Result<(), LinkError> {
        let (path, query) = match new_path_and_query.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (new_path_and_query, None),
        };

        let mut candidate = self.url.clone();
        candidate.set_path(path);
        candidate.set_query(query);

        // Re-parse the serialized form so a hostile path cannot smuggle in
        // components that bypass URL syntax checks.
        let reparsed = Url::parse(candidate.as_str())
            .map_err(|e| LinkError::MalformedUrl(e.to_string()))?;
        if reparsed.host_str() != self.url.host_str() || reparsed.scheme() != self.url.scheme() {
            return Err(LinkError::MalformedUrl(
                "replacement altered scheme or authority".to_string(),
            ));
        }
        require_nut(&reparsed)?;

        self.url = reparsed;
        Ok(())
    }
}

impl std::fmt::Display for SiteLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl PartialEq for SiteLink {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for SiteLink {}

/// Returns the first value of a query parameter, if present.
fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Enforces the exactly-one-non-empty-nut invariant.
fn require_nut(url: &Url) -> Result<(), LinkError> {
    match query_param(url, "nut") {
        Some(nut) if !nut.is_empty() => Ok(()),
        _ => Err(LinkError::MissingNut),
    }
}
