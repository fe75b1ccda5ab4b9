//! Tests for how `rexray connect` reports session outcomes.

#![allow(clippy::expect_used)]

use std::path::Path;

use rexray_cli::application::services::connect::TrustedSession;
use rexray_cli::application::services::host_trust::TrustDecision;
use rexray_cli::commands::connect::{ConnectStatus, report};
use rexray_cli::domain::{HostTrustError, parse_endpoint};
use rexray_cli::output::OutputContext;

use crate::helpers::identity;

const STORE: &str = "/home/op/.rexray/known_hosts";

fn quiet() -> OutputContext {
    OutputContext::new(true, true)
}

fn session(decision: TrustDecision) -> TrustedSession {
    TrustedSession {
        endpoint: parse_endpoint("10.0.0.5").expect("endpoint"),
        identity: identity("10.0.0.5", "AA:BB"),
        decision,
    }
}

#[test]
fn test_conflict_prints_warning_and_rejects() {
    let conflict = HostTrustError::Conflict {
        host: "10.0.0.5".to_string(),
        presented: "CC:DD".parse().expect("fp"),
        stored: "AA:BB".parse().expect("fp"),
    };
    let mut err = Vec::new();
    let status = report(&quiet(), Path::new(STORE), Err(conflict), &mut err).expect("report");

    assert_eq!(status, ConnectStatus::Rejected);
    let text = String::from_utf8(err).expect("utf8");
    assert!(text.contains("REMOTE HOST IDENTIFICATION HAS CHANGED"));
    assert!(text.contains("CC:DD"));
    assert!(text.contains("RSA host key for 10.0.0.5 has changed"));
    assert!(text.contains(&format!("Offending key in {STORE}")));
}

#[test]
fn test_conflict_warning_uses_error_style_when_colored() {
    let mut output = quiet();
    output.styles.colorize();
    let conflict = HostTrustError::Conflict {
        host: "10.0.0.5".to_string(),
        presented: "CC:DD".parse().expect("fp"),
        stored: "AA:BB".parse().expect("fp"),
    };
    let mut err = Vec::new();
    report(&output, Path::new(STORE), Err(conflict), &mut err).expect("report");

    let text = String::from_utf8(err).expect("utf8");
    assert!(text.starts_with("\x1b[31m"), "warning should be red: {text:?}");
    assert!(text.contains("REMOTE HOST IDENTIFICATION HAS CHANGED"));
}

#[test]
fn test_conflict_warning_is_plain_without_color() {
    let conflict = HostTrustError::Conflict {
        host: "10.0.0.5".to_string(),
        presented: "CC:DD".parse().expect("fp"),
        stored: "AA:BB".parse().expect("fp"),
    };
    let mut err = Vec::new();
    report(&quiet(), Path::new(STORE), Err(conflict), &mut err).expect("report");
    assert!(!String::from_utf8(err).expect("utf8").contains('\x1b'));
}

#[test]
fn test_refusal_prints_abort_message() {
    let mut err = Vec::new();
    let status = report(
        &quiet(),
        Path::new(STORE),
        Err(HostTrustError::Refused {
            host: "10.0.0.5".to_string(),
        }),
        &mut err,
    )
    .expect("report");
    assert_eq!(status, ConnectStatus::Rejected);
    assert_eq!(String::from_utf8(err).expect("utf8"), "Aborting request, remote host not trusted.\n");
}

#[test]
fn test_added_host_prints_permanently_added() {
    let entry = identity("10.0.0.5", "AA:BB").into_entry();
    let mut err = Vec::new();
    let status = report(&quiet(), Path::new(STORE), Ok(session(TrustDecision::Added(entry))), &mut err)
        .expect("report");
    assert_eq!(status, ConnectStatus::Connected);
    assert_eq!(
        String::from_utf8(err).expect("utf8"),
        format!("Permanently added host 10.0.0.5 to known_hosts file {STORE}\n")
    );
}

#[test]
fn test_add_failure_is_reported_but_connects() {
    let decision = TrustDecision::AddFailed {
        entry: identity("10.0.0.5", "AA:BB").into_entry(),
        error: HostTrustError::Persistence {
            host: "10.0.0.5".to_string(),
            reason: "read-only file system".to_string(),
        },
    };
    let mut err = Vec::new();
    let status = report(&quiet(), Path::new(STORE), Ok(session(decision)), &mut err).expect("report");
    assert_eq!(status, ConnectStatus::Connected);
    assert!(
        String::from_utf8(err)
            .expect("utf8")
            .starts_with("Failed to add entry to known_hosts file: read-only file system")
    );
}

#[test]
fn test_confirmed_host_is_silent() {
    let mut err = Vec::new();
    let status = report(&quiet(), Path::new(STORE), Ok(session(TrustDecision::Confirmed)), &mut err)
        .expect("report");
    assert_eq!(status, ConnectStatus::Connected);
    assert!(err.is_empty());
}

#[test]
fn test_malformed_store_is_an_error() {
    let mut err = Vec::new();
    let result = report(
        &quiet(),
        Path::new(STORE),
        Err(HostTrustError::MalformedStore {
            line: 3,
            reason: "expected 3 fields".to_string(),
        }),
        &mut err,
    );
    assert!(result.expect_err("fatal").to_string().contains("line 3"));
    assert!(err.is_empty());
}
