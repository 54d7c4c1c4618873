// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the protocol engine
//!
//! Response grammar, tif status-flag semantics, and the single-shot
//! transient-error retry, all driven through the mock transport.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;

use sqrl_core::identity::Identity;
use sqrl_core::link::SiteLink;
use sqrl_core::protocol::{
    Command, MockTransport, ProtocolConnection, ProtocolError, ProtocolRequest, ProtocolResponse,
};

fn encode_body(lines: &str) -> String {
    URL_SAFE_NO_PAD.encode(lines.as_bytes())
}

fn response_body(tif: &str, nut: &str) -> String {
    encode_body(&format!(
        "ver=1\r\nnut={}\r\ntif={}\r\nqry=/sqrl?nut={}\r\n",
        nut, tif, nut
    ))
}

fn test_identity() -> Identity {
    Identity::from_master_key([11u8; 32])
}

fn test_link() -> SiteLink {
    SiteLink::parse("sqrl://example.com/sqrl?nut=n1").unwrap()
}

// =============================================================================
// Response decoding
// =============================================================================

#[test]
fn test_decode_valid_response() {
    let response = ProtocolResponse::decode(&response_body("0", "n2")).unwrap();
    assert_eq!(response.ver(), "1");
    assert_eq!(response.nut(), "n2");
    assert_eq!(response.tif(), 0);
    assert_eq!(response.qry(), "/sqrl?nut=n2");
    assert!(!response.current_account_exists());
}

#[test]
fn test_decode_accepts_standard_alphabet() {
    let body = STANDARD.encode(b"ver=1\r\nnut=n2\r\ntif=1\r\nqry=/sqrl?nut=n2\r\n");
    let response = ProtocolResponse::decode(&body).unwrap();
    assert!(response.current_account_exists());
}

#[test]
fn test_decode_rejects_garbage_base64() {
    assert!(matches!(
        ProtocolResponse::decode("!not base64!"),
        Err(ProtocolError::InvalidServerResponse(_))
    ));
}

#[test]
fn test_decode_rejects_missing_mandatory_keys() {
    // No qry line
    let body = encode_body("ver=1\r\nnut=n2\r\ntif=0\r\n");
    assert!(matches!(
        ProtocolResponse::decode(&body),
        Err(ProtocolError::InvalidServerResponse(_))
    ));

    // Empty nut value
    let body = encode_body("ver=1\r\nnut=\r\ntif=0\r\nqry=/q?nut=x\r\n");
    assert!(matches!(
        ProtocolResponse::decode(&body),
        Err(ProtocolError::InvalidServerResponse(_))
    ));
}

#[test]
fn test_decode_rejects_non_hex_tif() {
    let body = encode_body("ver=1\r\nnut=n2\r\ntif=zz\r\nqry=/q?nut=x\r\n");
    assert!(matches!(
        ProtocolResponse::decode(&body),
        Err(ProtocolError::InvalidServerResponse(_))
    ));
}

#[test]
fn test_decode_rejects_unsupported_version() {
    let body = encode_body("ver=2\r\nnut=n2\r\ntif=0\r\nqry=/q?nut=x\r\n");
    assert!(matches!(
        ProtocolResponse::decode(&body),
        Err(ProtocolError::VersionNotSupported(_))
    ));
}

#[test]
fn test_decode_accepts_version_list() {
    let body = encode_body("ver=2,1\r\nnut=n2\r\ntif=0\r\nqry=/q?nut=x\r\n");
    assert!(ProtocolResponse::decode(&body).is_ok());
}

#[test]
fn test_display_renders_decoded_body() {
    let lines = "ver=1\r\nnut=n2\r\ntif=0\r\nqry=/q?nut=x\r\n";
    let response = ProtocolResponse::decode(&encode_body(lines)).unwrap();
    assert_eq!(response.to_string(), lines);
}

// =============================================================================
// tif status-flag semantics
// =============================================================================

#[test]
fn test_tif_01_means_account_exists() {
    let response = ProtocolResponse::decode(&response_body("1", "n2")).unwrap();
    assert!(response.current_account_exists());
}

#[test]
fn test_tif_04_also_means_account_exists() {
    let response = ProtocolResponse::decode(&response_body("4", "n2")).unwrap();
    assert!(response.current_account_exists());
}

#[test]
fn test_tif_400_is_not_account_exists() {
    let response = ProtocolResponse::decode(&response_body("400", "n2")).unwrap();
    assert!(!response.current_account_exists());
}

#[test]
fn test_hard_fail_bits_are_command_failed() {
    for tif in ["40", "80", "100", "200", "c0"] {
        match ProtocolResponse::decode(&response_body(tif, "n2")) {
            Err(ProtocolError::CommandFailed { .. }) => {}
            other => panic!("tif={} should be CommandFailed, got {:?}", tif, other),
        }
    }
}

#[test]
fn test_transient_bit_carries_retry_parameters() {
    let body = response_body("20", "fresh");
    match ProtocolResponse::decode(&body) {
        Err(ProtocolError::Transient {
            nut,
            qry,
            body: raw,
        }) => {
            assert_eq!(nut, "fresh");
            assert_eq!(qry, "/sqrl?nut=fresh");
            assert_eq!(raw, body);
        }
        other => panic!("expected Transient, got {:?}", other),
    }
}

#[test]
fn test_transient_combined_with_hard_fail_is_command_failed() {
    // 0x60 = transient bit plus a hard-fail bit: the hard failure wins
    assert!(matches!(
        ProtocolResponse::decode(&response_body("60", "n2")),
        Err(ProtocolError::CommandFailed { tif: 0x60 })
    ));
}

// =============================================================================
// Request/retry state machine
// =============================================================================

#[test]
fn test_query_success_single_send() {
    let mut transport = MockTransport::new();
    transport.queue_reply(200, response_body("1", "n2"));

    let mut conn = ProtocolConnection::open(test_link(), transport).unwrap();
    let identity = test_identity();
    let request = ProtocolRequest::first(Command::Query, &identity, conn.link());
    let response = request.send(&mut conn, &identity).unwrap();

    assert!(response.current_account_exists());
    let transport = conn.into_transport();
    assert_eq!(transport.sent_requests().len(), 1);
    let body = &transport.sent_requests()[0].body;
    assert!(body.starts_with("client="));
    assert!(body.contains("&server="));
    assert!(body.contains("&ids="));
}

#[test]
fn test_http_error_status_propagates() {
    let mut transport = MockTransport::new();
    transport.queue_reply(500, "");

    let mut conn = ProtocolConnection::open(test_link(), transport).unwrap();
    let identity = test_identity();
    let request = ProtocolRequest::first(Command::Query, &identity, conn.link());

    assert!(matches!(
        request.send(&mut conn, &identity),
        Err(ProtocolError::HttpStatus(500))
    ));
    assert_eq!(conn.into_transport().sent_requests().len(), 1);
}

#[test]
fn test_transient_error_retries_exactly_once() {
    let transient_body = response_body("20", "fresh");
    let mut transport = MockTransport::new();
    transport.queue_reply(200, transient_body.clone());
    transport.queue_reply(200, response_body("1", "final"));

    let mut conn = ProtocolConnection::open(test_link(), transport).unwrap();
    let identity = test_identity();
    let request = ProtocolRequest::first(Command::Query, &identity, conn.link());
    let response = request.send(&mut conn, &identity).unwrap();

    assert!(response.current_account_exists());
    assert_eq!(response.nut(), "final");

    let transport = conn.into_transport();
    let sent = transport.sent_requests();
    assert_eq!(sent.len(), 2, "exactly two wire sends, never a third");

    // The retry went to the qry-supplied path on the same host
    assert_eq!(sent[1].url, "https://example.com/sqrl?nut=fresh");

    // Client value is byte-identical; server value is the transient body
    let first_client = sent[0].body.split('&').next().unwrap().to_string();
    let retry_client = sent[1].body.split('&').next().unwrap().to_string();
    assert_eq!(first_client, retry_client);
    assert!(sent[1].body.contains(&format!("&server={}", transient_body)));
}

#[test]
fn test_second_transient_propagates_without_third_send() {
    let mut transport = MockTransport::new();
    transport.queue_reply(200, response_body("20", "a"));
    transport.queue_reply(200, response_body("20", "b"));

    let mut conn = ProtocolConnection::open(test_link(), transport).unwrap();
    let identity = test_identity();
    let request = ProtocolRequest::first(Command::Query, &identity, conn.link());

    assert!(matches!(
        request.send(&mut conn, &identity),
        Err(ProtocolError::Transient { .. })
    ));
    assert_eq!(conn.into_transport().sent_requests().len(), 2);
}

#[test]
fn test_failure_on_retry_propagates() {
    let mut transport = MockTransport::new();
    transport.queue_reply(200, response_body("20", "fresh"));
    transport.queue_reply(200, response_body("40", "x"));

    let mut conn = ProtocolConnection::open(test_link(), transport).unwrap();
    let identity = test_identity();
    let request = ProtocolRequest::first(Command::Query, &identity, conn.link());

    assert!(matches!(
        request.send(&mut conn, &identity),
        Err(ProtocolError::CommandFailed { tif: 0x40 })
    ));
    assert_eq!(conn.into_transport().sent_requests().len(), 2);
}

// =============================================================================
// Message chaining
// =============================================================================

#[test]
fn test_chained_ident_forwards_previous_body_verbatim() {
    let query_body = response_body("1", "n2");
    let mut transport = MockTransport::new();
    transport.queue_reply(200, query_body.clone());
    transport.queue_reply(200, response_body("1", "n3"));

    let mut conn = ProtocolConnection::open(test_link(), transport).unwrap();
    let identity = test_identity();

    let query = ProtocolRequest::first(Command::Query, &identity, conn.link());
    let query_response = query.send(&mut conn, &identity).unwrap();

    conn.redirect(query_response.qry()).unwrap();
    let ident =
        ProtocolRequest::chained(Command::Ident, &identity, conn.link().host(), &query_response, false);
    ident.send(&mut conn, &identity).unwrap();

    let transport = conn.into_transport();
    let sent = transport.sent_requests();
    assert_eq!(sent.len(), 2);
    assert!(
        sent[1].body.contains(&format!("&server={}", query_body)),
        "chained request must forward the previous wire body unmodified"
    );

    // cmd switched from query to ident in the client value
    let client_b64 = sent[1].body.trim_start_matches("client=");
    let client_b64 = client_b64.split('&').next().unwrap();
    let client = String::from_utf8(URL_SAFE_NO_PAD.decode(client_b64).unwrap()).unwrap();
    assert!(client.contains("cmd=ident"));
}
