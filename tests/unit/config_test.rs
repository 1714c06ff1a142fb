//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use venue_gate::config::VenueConfig;
use venue_gate::core::StayPolicy;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_default_config_is_valid() {
    let cfg = VenueConfig::default();
    assert_eq!(cfg.capacity, 5);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_invalid_capacity() {
    let cfg = VenueConfig {
        capacity: 0,
        ..VenueConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_invalid_stay_bounds() {
    let cfg = VenueConfig {
        min_stay_ms: 10,
        max_stay_ms: 5,
        ..VenueConfig::default()
    };
    assert!(cfg.validate().unwrap_err().contains("min_stay_ms"));
}

#[test]
fn test_config_invalid_patience() {
    let cfg = VenueConfig {
        patience_ms: Some(0),
        ..VenueConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "capacity": 3,
        "min_stay_ms": 10,
        "max_stay_ms": 20
    }"#;

    let cfg = VenueConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.capacity, 3);
    assert_eq!(cfg.patience_ms, None);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(VenueConfig::from_json_str(r#"{"capacity": 0}"#).is_err());
    assert!(VenueConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_env_overrides() {
    let cfg = VenueConfig::default()
        .merge_with(lookup(&[
            ("VENUE_CAPACITY", "2"),
            ("VENUE_MAX_STAY_MS", " 4000 "),
            ("VENUE_PATIENCE_MS", "500"),
        ]))
        .unwrap();
    assert_eq!(cfg.capacity, 2);
    assert_eq!(cfg.min_stay_ms, 1_000);
    assert_eq!(cfg.max_stay_ms, 4_000);
    assert_eq!(cfg.patience(), Some(Duration::from_millis(500)));
}

#[test]
fn test_config_layers_validate_only_when_combined() {
    // Env raises the minimum past the default maximum; a later layer lifts the maximum.
    let mut cfg = VenueConfig::default()
        .merge_with(lookup(&[("VENUE_MIN_STAY_MS", "5000")]))
        .unwrap();
    assert_eq!(cfg.min_stay_ms, 5_000);
    assert!(cfg.validate().is_err());

    cfg.max_stay_ms = 6_000;
    assert!(cfg.validate().is_ok());
    assert_eq!(
        cfg.stay_policy(),
        StayPolicy::Uniform {
            min_ms: 5_000,
            max_ms: 6_000
        }
    );
}

#[test]
fn test_config_json_layer_with_one_bound() {
    let base = VenueConfig::parse_json_str(r#"{"max_stay_ms": 500}"#).unwrap();
    assert_eq!(base.min_stay_ms, 1_000);
    assert!(VenueConfig::from_json_str(r#"{"max_stay_ms": 500}"#).is_err());

    let cfg = base
        .merge_with(lookup(&[("VENUE_MIN_STAY_MS", "100")]))
        .unwrap();
    assert!(cfg.validate().is_ok());
    assert!(VenueConfig::parse_json_str("not json").is_err());
}

#[test]
fn test_config_env_bad_value() {
    let err = VenueConfig::default()
        .merge_with(lookup(&[("VENUE_CAPACITY", "many")]))
        .unwrap_err();
    assert!(err.starts_with("VENUE_CAPACITY"));
}

#[test]
fn test_stay_policy_from_bounds() {
    let fixed = VenueConfig {
        min_stay_ms: 50,
        max_stay_ms: 50,
        ..VenueConfig::default()
    };
    assert_eq!(fixed.stay_policy(), StayPolicy::Fixed(Duration::from_millis(50)));
    assert_eq!(
        VenueConfig::default().stay_policy(),
        StayPolicy::Uniform {
            min_ms: 1_000,
            max_ms: 3_000
        }
    );
}
