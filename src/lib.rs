//! # Venue Gate
//!
//! A blocking admission controller for a capacity-bounded venue serving two
//! priority classes, VIP and normal.
//!
//! The [`AdmissionGate`](core::AdmissionGate) is a monitor: one
//! `parking_lot::Mutex` guards the occupancy and the per-class waiting counts,
//! and each class parks on its own `Condvar`. It guarantees:
//!
//! - **Capacity safety**: occupancy never exceeds the configured capacity.
//! - **VIP precedence**: no normal client is admitted while a VIP is waiting.
//! - **Wake-one**: a departure wakes a single waiter, VIP first, and the woken
//!   thread rechecks its admission rule before entering.
//!
//! Normal clients are not protected from starvation: under a steady stream
//! of VIPs they may wait indefinitely.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use venue_gate::core::{AdmissionGate, Client, Dispatcher, StayPolicy, event_channel, check_log};
//! use venue_gate::util::ClientClass;
//!
//! let (sink, log) = event_channel();
//! let gate = Arc::new(AdmissionGate::new(2).unwrap().with_sink(sink));
//! let clients = vec![
//!     Client::new(0, ClientClass::Vip),
//!     Client::new(1, ClientClass::Normal),
//!     Client::new(2, ClientClass::Normal),
//! ];
//!
//! let summary = Dispatcher::new(Arc::clone(&gate), StayPolicy::Fixed(Duration::from_millis(5)))
//!     .run(clients)
//!     .unwrap();
//!
//! assert!(summary.final_snapshot.is_idle());
//! check_log(&log.drain(), 2).unwrap();
//! ```
//!
//! The `venue` binary reads a manifest file and runs the same simulation with
//! randomized stays.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Admission gate, client lifecycle and dispatch.
pub mod core;
/// Configuration models for the venue.
pub mod config;
/// Builders to construct gates and dispatchers from configuration.
pub mod builders;
/// Manifest input.
pub mod infra;
/// Shared utilities.
pub mod util;
