//! Tests for error types

use std::time::Duration;

use venue_gate::core::GateError;
use venue_gate::util::ClientClass;

#[test]
fn test_malformed_manifest_error() {
    let err = GateError::MalformedManifest {
        entry: 2,
        reason: "bad class flag".to_string(),
    };
    assert_eq!(format!("{}", err), "malformed manifest at entry 2: bad class flag");
    assert_eq!(err.as_label(), "malformed_manifest");
}

#[test]
fn test_invariant_violation_error() {
    let err = GateError::InvariantViolation("occupancy below zero".to_string());
    assert_eq!(format!("{}", err), "invariant violated: occupancy below zero");
    assert!(err.is_fatal());
}

#[test]
fn test_resource_creation_error() {
    let err = GateError::ResourceCreation {
        what: "thread for client 4".to_string(),
        source: std::io::Error::other("out of threads"),
    };
    assert_eq!(format!("{}", err), "failed to create thread for client 4: out of threads");
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.is_fatal());
}

#[test]
fn test_timeout_error_not_fatal() {
    let err = GateError::Timeout {
        id: 9,
        class: ClientClass::Normal,
        waited: Duration::from_millis(5),
    };
    assert_eq!(format!("{}", err), "client 9 (normal) not admitted within 5ms");
    assert!(!err.is_fatal());
    assert_eq!(err.as_label(), "timeout");
}

#[test]
fn test_client_panicked_error() {
    let err = GateError::ClientPanicked { id: 3 };
    assert_eq!(format!("{}", err), "client 3 panicked");
}

#[test]
fn test_io_error_mentions_path() {
    let err = GateError::Io {
        path: "clients.txt".into(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    };
    assert!(format!("{}", err).starts_with("cannot read clients.txt:"));
}
