// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Protocol Response Decoding
//!
//! A server response body is the base64 encoding (standard or URL-safe
//! alphabet) of CRLF-joined `key=value` lines. Four keys are mandatory and
//! non-empty: `ver`, `nut`, `tif` (hex bitmask), `qry`. Everything else
//! (`sfn`, `suk`, ...) is optional.

use std::collections::HashMap;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;

use super::error::{ProtocolError, ProtocolResult};

/// Protocol version this client supports.
const SUPPORTED_VERSION: u32 = 1;

/// tif bit: current identity matches an existing account.
const TIF_ID_MATCH: u32 = 0x01;
/// tif bit: previous identity match (also treated as "account exists").
const TIF_PREVIOUS_ID_MATCH: u32 = 0x04;
/// tif bit: transient error, client should retry with fresh parameters.
const TIF_TRANSIENT_ERROR: u32 = 0x20;
/// tif bits that terminate the command (command-failed family, excluding the
/// transient bit).
const TIF_HARD_FAIL: u32 = 0x40 | 0x80 | 0x100 | 0x200;

/// A decoded, validated server response.
///
/// Immutable once constructed. Keeps the wire body exactly as received so a
/// chained request can forward it verbatim as its server value.
#[derive(Debug, Clone)]
pub struct ProtocolResponse {
    wire_body: String,
    decoded: String,
    values: HashMap<String, String>,
    tif: u32,
}

impl ProtocolResponse {
    /// Decodes and validates a response body against the protocol grammar.
    ///
    /// A body whose `tif` carries the transient bit (and no hard-fail bit)
    /// decodes to [`ProtocolError::Transient`]; the command-failed family
    /// decodes to [`ProtocolError::CommandFailed`].
    pub fn decode(wire_body: &str) -> ProtocolResult<Self> {
        let trimmed = wire_body.trim();
        let bytes = decode_base64(trimmed).ok_or_else(|| {
            ProtocolError::InvalidServerResponse("body is not valid base64".to_string())
        })?;
        let decoded = String::from_utf8(bytes).map_err(|_| {
            ProtocolError::InvalidServerResponse("body is not valid UTF-8".to_string())
        })?;

        let mut values = HashMap::new();
        for line in decoded.split("\r\n").filter(|l| !l.is_empty()) {
            let (key, value) = line.split_once('=').ok_or_else(|| {
                ProtocolError::InvalidServerResponse(format!("line without '=': {}", line))
            })?;
            values.insert(key.to_string(), value.to_string());
        }

        for key in ["ver", "nut", "tif", "qry"] {
            match values.get(key) {
                Some(v) if !v.is_empty() => {}
                _ => {
                    return Err(ProtocolError::InvalidServerResponse(format!(
                        "missing or empty mandatory key '{}'",
                        key
                    )));
                }
            }
        }

        let ver = &values["ver"];
        if !version_supported(ver) {
            return Err(ProtocolError::VersionNotSupported(ver.clone()));
        }

        let tif_text = values["tif"].trim_start_matches("0x");
        let tif = u32::from_str_radix(tif_text, 16).map_err(|_| {
            ProtocolError::InvalidServerResponse(format!("tif is not hex: {}", values["tif"]))
        })?;

        if tif & TIF_HARD_FAIL != 0 {
            return Err(ProtocolError::CommandFailed { tif });
        }
        if tif & TIF_TRANSIENT_ERROR != 0 {
            return Err(ProtocolError::Transient {
                nut: values["nut"].clone(),
                qry: values["qry"].clone(),
                body: trimmed.to_string(),
            });
        }

        Ok(ProtocolResponse {
            wire_body: trimmed.to_string(),
            decoded,
            values,
            tif,
        })
    }

    /// The body exactly as it came off the wire (still base64 text); this is
    /// what the next chained request forwards as its server value.
    pub fn wire_body(&self) -> &str {
        &self.wire_body
    }

    /// The server's version offer.
    pub fn ver(&self) -> &str {
        &self.values["ver"]
    }

    /// The fresh nonce for the next exchange.
    pub fn nut(&self) -> &str {
        &self.values["nut"]
    }

    /// The path+query the next request in the chain must use.
    pub fn qry(&self) -> &str {
        &self.values["qry"]
    }

    /// The decoded status bitmask.
    pub fn tif(&self) -> u32 {
        self.tif
    }

    /// Optional server friendly name.
    pub fn sfn(&self) -> Option<&str> {
        self.values.get("sfn").map(String::as_str)
    }

    /// Any other decoded value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// True when the signing identity matches an account on this server
    /// (either the current-id or previous-id bit; both forms are seen in the
    /// wild).
    pub fn current_account_exists(&self) -> bool {
        self.tif & (TIF_ID_MATCH | TIF_PREVIOUS_ID_MATCH) != 0
    }
}

impl std::fmt::Display for ProtocolResponse {
    /// Renders the decoded CRLF `key=value` text.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.decoded)
    }
}

/// Decodes base64 in either alphabet, padded or unpadded. Malformed padding
/// fails all four engines and is rejected.
fn decode_base64(text: &str) -> Option<Vec<u8>> {
    URL_SAFE
        .decode(text)
        .or_else(|_| URL_SAFE_NO_PAD.decode(text))
        .or_else(|_| STANDARD.decode(text))
        .or_else(|_| STANDARD_NO_PAD.decode(text))
        .ok()
}

/// Checks the server's comma-separated version offer (single numbers or
/// `low-high` ranges) for one we speak.
fn version_supported(offer: &str) -> bool {
    offer.split(',').map(str::trim).any(|item| {
        if let Some((low, high)) = item.split_once('-') {
            match (low.trim().parse::<u32>(), high.trim().parse::<u32>()) {
                (Ok(low), Ok(high)) => (low..=high).contains(&SUPPORTED_VERSION),
                _ => false,
            }
        } else {
            item.parse::<u32>() == Ok(SUPPORTED_VERSION)
        }
    })
}

// INLINE_TEST_REQUIRED: exercises the private base64/version helpers
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_offers() {
        assert!(version_supported("1"));
        assert!(version_supported("2,1"));
        assert!(version_supported("1-3"));
        assert!(!version_supported("2"));
        assert!(!version_supported("2-4"));
        assert!(!version_supported("x"));
    }

    #[test]
    fn test_decode_base64_either_alphabet() {
        // '>' encodes to Pg== (standard) / Pg (unpadded)
        assert_eq!(decode_base64("Pg==").unwrap(), b">");
        assert_eq!(decode_base64("Pg").unwrap(), b">");
        // Malformed padding is rejected by every engine
        assert!(decode_base64("Pg=").is_none());
    }
}
