// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for SQRL link parsing and validation

use sqrl_core::link::{LinkError, SiteLink};

#[test]
fn test_parse_roundtrip_exact() {
    let input = "sqrl://host/p?nut=X";
    let link = SiteLink::parse(input).unwrap();
    assert_eq!(link.to_string(), input);

    let reparsed = SiteLink::parse(&link.to_string()).unwrap();
    assert_eq!(link, reparsed);
}

#[test]
fn test_parse_missing_nut() {
    assert!(matches!(
        SiteLink::parse("sqrl://host/p"),
        Err(LinkError::MissingNut)
    ));
}

#[test]
fn test_parse_unknown_scheme() {
    match SiteLink::parse("ftp://host/p?nut=X") {
        Err(LinkError::UnknownScheme(scheme)) => assert_eq!(scheme, "ftp"),
        other => panic!("expected UnknownScheme, got {:?}", other),
    }
}

#[test]
fn test_display_name_from_sfn() {
    // R1JD is the base64url encoding of "GRC"
    let link = SiteLink::parse("sqrl://www.grc.com/sqrl?nut=X&sfn=R1JD").unwrap();
    assert_eq!(link.display_name(), "GRC");
}

#[test]
fn test_display_name_falls_back_to_host() {
    let link = SiteLink::parse("sqrl://www.grc.com/sqrl?nut=X").unwrap();
    assert_eq!(link.display_name(), "www.grc.com");
}

#[test]
fn test_display_name_bad_sfn_falls_back_to_host() {
    // "!!!" is not valid base64url
    let link = SiteLink::parse("sqrl://www.grc.com/sqrl?nut=X&sfn=!!!").unwrap();
    assert_eq!(link.display_name(), "www.grc.com");
}

#[test]
fn test_communication_url_sqrl_is_https() {
    let link = SiteLink::parse("sqrl://example.com:8443/sqrl?nut=X").unwrap();
    let url = link.communication_url().unwrap();
    assert_eq!(url.as_str(), "https://example.com:8443/sqrl?nut=X");
}

#[test]
fn test_communication_url_qrl_is_http() {
    let link = SiteLink::parse("qrl://example.com/sqrl?nut=X").unwrap();
    let url = link.communication_url().unwrap();
    assert_eq!(url.as_str(), "http://example.com/sqrl?nut=X");
}

#[test]
fn test_communication_url_keeps_display_scheme() {
    let link = SiteLink::parse("sqrl://example.com/sqrl?nut=X").unwrap();
    let _ = link.communication_url().unwrap();
    assert!(link.to_string().starts_with("sqrl://"));
}

#[test]
fn test_nut_accessor() {
    let link = SiteLink::parse("sqrl://example.com/sqrl?nut=oOB4kIa9&can=L3Nxcmw").unwrap();
    assert_eq!(link.nut(), "oOB4kIa9");
}

#[test]
fn test_replace_path_and_query() {
    let mut link = SiteLink::parse("sqrl://example.com/sqrl?nut=first").unwrap();
    link.replace_path_and_query("/sqrl/next?nut=second&extra=1")
        .unwrap();

    assert_eq!(link.nut(), "second");
    assert_eq!(
        link.to_string(),
        "sqrl://example.com/sqrl/next?nut=second&extra=1"
    );
}

#[test]
fn test_replace_without_query_fails_nut_invariant() {
    let mut link = SiteLink::parse("sqrl://example.com/sqrl?nut=first").unwrap();
    let before = link.to_string();

    assert!(matches!(
        link.replace_path_and_query("/plain-path"),
        Err(LinkError::MissingNut)
    ));
    // Atomic: the failed replacement changed nothing
    assert_eq!(link.to_string(), before);
    assert_eq!(link.nut(), "first");
}

#[test]
fn test_replace_preserves_host() {
    let mut link = SiteLink::parse("sqrl://example.com/sqrl?nut=a").unwrap();
    link.replace_path_and_query("/other?nut=b").unwrap();
    assert_eq!(link.host(), "example.com");
}
