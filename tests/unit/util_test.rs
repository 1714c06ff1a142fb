//! Tests for utility functions

use std::time::{Duration, Instant};

use venue_gate::util::{now_ms, remaining, ClientClass, ClientId};

#[test]
fn test_class_ordering() {
    assert!(ClientClass::Vip > ClientClass::Normal);
}

#[test]
fn test_class_from_flag() {
    assert_eq!(ClientClass::from_flag(0), ClientClass::Normal);
    assert_eq!(ClientClass::from_flag(1), ClientClass::Vip);
    assert_eq!(ClientClass::from_flag(42), ClientClass::Vip);
    assert!(ClientClass::Vip.is_vip());
    assert!(!ClientClass::Normal.is_vip());
}

#[test]
fn test_class_serde() {
    assert_eq!(serde_json::to_string(&ClientClass::Vip).unwrap(), "\"vip\"");
    let class: ClientClass = serde_json::from_str("\"normal\"").unwrap();
    assert_eq!(class, ClientClass::Normal);
    assert_eq!(ClientClass::Vip.to_string(), "vip");
}

#[test]
fn test_client_id() {
    let id: ClientId = 12345;
    assert_eq!(id, 12345);
}

#[test]
fn test_clock_helpers() {
    assert!(now_ms() > 0);
    assert!(remaining(Instant::now() + Duration::from_secs(60)).is_some());
    assert!(remaining(Instant::now()).is_none());
}
