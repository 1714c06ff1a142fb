//! Admission gate, client lifecycle and dispatch.

pub mod error;
pub mod gate;
pub mod journal;
pub mod client;
pub mod dispatcher;

pub use error::{AppResult, GateError};
pub use gate::{AdmissionGate, AdmissionPermit, GateSnapshot};
pub use journal::{check_log, event_channel, ChannelSink, EventKind, EventLog, EventSink, GateEvent};
pub use client::{Activity, Client, ClientReport, ClientState, ClientTask, StayPolicy};
pub use dispatcher::{Dispatcher, RunSummary};
