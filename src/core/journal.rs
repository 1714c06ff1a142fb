//! Observable gate events.
//!
//! Every state transition inside the gate produces one [`GateEvent`], recorded
//! while the gate lock is still held, so a sink sees events in exactly the
//! order the critical sections ran. [`check_log`] replays such a log and
//! verifies the admission invariants against it.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::core::GateError;
use crate::util::serde::{ClientClass, ClientId};

/// Kind of state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Client registered intent to enter.
    WaitRequested,
    /// Client was granted a slot.
    Admitted,
    /// Client left and freed its slot.
    Departed,
    /// Client gave up waiting before being admitted.
    WaitAbandoned,
}

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateEvent {
    /// Position in the gate's event order, starting at 0.
    pub seq: u64,
    /// Client the event belongs to.
    pub client_id: ClientId,
    /// Its class.
    pub class: ClientClass,
    /// What happened.
    pub kind: EventKind,
    /// Occupancy after the transition.
    pub occupancy: u32,
}

/// Receiver of gate events.
///
/// `record` runs under the gate lock: implementations must not block, take
/// other locks held across gate calls, or perform I/O.
pub trait EventSink: Send {
    /// Record one event.
    fn record(&mut self, event: GateEvent);
}

/// Sink forwarding events over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<GateEvent>,
}

impl EventSink for ChannelSink {
    fn record(&mut self, event: GateEvent) {
        // A dropped receiver only means nobody is listening anymore.
        let _ = self.tx.send(event);
    }
}

/// Receiving side of an event channel.
#[derive(Debug, Clone)]
pub struct EventLog {
    rx: Receiver<GateEvent>,
}

impl EventLog {
    /// Take every event recorded so far without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<GateEvent> {
        self.rx.try_iter().collect()
    }

    /// Blocking iterator that ends once every sender is gone.
    pub fn iter(&self) -> impl Iterator<Item = GateEvent> + '_ {
        self.rx.iter()
    }
}

/// Create a connected sink/log pair.
#[must_use]
pub fn event_channel() -> (ChannelSink, EventLog) {
    let (tx, rx) = unbounded();
    (ChannelSink { tx }, EventLog { rx })
}

/// Replay `events` against a gate of `capacity` and check the admission rules.
///
/// Verifies occupancy stays within `0..=capacity`, waiting counters never go
/// negative, no normal client is admitted while a VIP is waiting, every
/// admission follows a wait request, every departure follows an admission,
/// and the recorded occupancy matches the replay.
///
/// # Errors
///
/// Returns [`GateError::InvariantViolation`] describing the first offending event.
pub fn check_log(events: &[GateEvent], capacity: u32) -> Result<(), GateError> {
    use std::collections::HashMap;

    #[derive(Clone, Copy, PartialEq)]
    enum Phase {
        Waiting,
        Inside,
    }

    let mut occupancy: u32 = 0;
    // Indexed by `is_vip()`: [normal, vip].
    let mut waiting = [0_u32; 2];
    let mut phase: HashMap<ClientId, (Phase, ClientClass)> = HashMap::new();

    let fail = |event: &GateEvent, what: &str| {
        Err(GateError::InvariantViolation(format!(
            "event #{} (client {} {:?}): {what}",
            event.seq, event.client_id, event.kind
        )))
    };

    for event in events {
        let slot = usize::from(event.class.is_vip());
        let known = phase.get(&event.client_id).copied();
        if matches!(known, Some((_, class)) if class != event.class) {
            return fail(event, "class changed");
        }
        match event.kind {
            EventKind::WaitRequested => {
                if known.is_some() {
                    return fail(event, "client registered twice");
                }
                let Some(count) = waiting[slot].checked_add(1) else {
                    return fail(event, "waiting count overflow");
                };
                waiting[slot] = count;
                phase.insert(event.client_id, (Phase::Waiting, event.class));
            }
            EventKind::Admitted => {
                if known.map(|(p, _)| p) != Some(Phase::Waiting) {
                    return fail(event, "admitted without waiting");
                }
                if event.class == ClientClass::Normal && waiting[1] > 0 {
                    return fail(event, "normal admitted while a VIP is waiting");
                }
                if occupancy >= capacity {
                    return fail(event, "occupancy would exceed capacity");
                }
                let Some(count) = waiting[slot].checked_sub(1) else {
                    return fail(event, "waiting count below zero");
                };
                waiting[slot] = count;
                occupancy += 1;
                phase.insert(event.client_id, (Phase::Inside, event.class));
            }
            EventKind::Departed => {
                if known.map(|(p, _)| p) != Some(Phase::Inside) {
                    return fail(event, "departed without being inside");
                }
                let Some(count) = occupancy.checked_sub(1) else {
                    return fail(event, "occupancy below zero");
                };
                occupancy = count;
                phase.remove(&event.client_id);
            }
            EventKind::WaitAbandoned => {
                if known.map(|(p, _)| p) != Some(Phase::Waiting) {
                    return fail(event, "abandoned without waiting");
                }
                let Some(count) = waiting[slot].checked_sub(1) else {
                    return fail(event, "waiting count below zero");
                };
                waiting[slot] = count;
                phase.remove(&event.client_id);
            }
        }
        if occupancy != event.occupancy {
            return fail(event, "recorded occupancy disagrees with replay");
        }
    }
    Ok(())
}
