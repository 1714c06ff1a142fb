//! Tests for builder modules

use std::time::Duration;

use venue_gate::builders::GateBuilder;
use venue_gate::config::VenueConfig;
use venue_gate::core::{check_log, event_channel, Client, GateError};
use venue_gate::util::ClientClass;

#[test]
fn test_gate_builder_defaults() {
    let builder = GateBuilder::new(VenueConfig::default());
    assert_eq!(builder.config().capacity, 5);

    let gate = builder.build_gate().unwrap();
    assert_eq!(gate.capacity(), 5);
    assert!(gate.snapshot().is_idle());
}

#[test]
fn test_gate_builder_rejects_invalid_config() {
    let cfg = VenueConfig {
        min_stay_ms: 9,
        max_stay_ms: 1,
        ..VenueConfig::default()
    };
    let err = GateBuilder::new(cfg).build_gate().unwrap_err();
    assert!(matches!(err, GateError::InvalidConfig(_)));
}

#[test]
fn test_gate_builder_wires_sink() {
    let (sink, log) = event_channel();
    let gate = GateBuilder::new(VenueConfig::default())
        .with_sink(sink)
        .build_gate()
        .unwrap();
    gate.acquire(Client::new(0, ClientClass::Vip)).release();

    let events = log.drain();
    assert_eq!(events.len(), 3);
    check_log(&events, 5).unwrap();
}

#[test]
fn test_dispatcher_from_config() {
    let cfg = VenueConfig {
        capacity: 2,
        min_stay_ms: 1,
        max_stay_ms: 1,
        patience_ms: None,
    };
    let dispatcher = GateBuilder::new(cfg).build_dispatcher().unwrap();
    assert_eq!(dispatcher.gate().capacity(), 2);

    let clients = vec![
        Client::new(0, ClientClass::Normal),
        Client::new(1, ClientClass::Vip),
        Client::new(2, ClientClass::Normal),
    ];
    let summary = dispatcher.run(clients).unwrap();
    assert_eq!(summary.reports.len(), 3);
    assert!(summary.reports.iter().all(|r| r.stayed >= Duration::from_millis(1)));
}
