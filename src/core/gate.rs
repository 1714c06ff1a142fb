//! Admission gate: a capacity-bounded monitor with strict VIP precedence.
//!
//! All counters live in one [`GateState`] behind a single `parking_lot::Mutex`.
//! Each class parks on its own `Condvar`, and every wait sits in a
//! "wait while not admissible" loop, so a wake is only ever a hint to recheck.
//!
//! Admission rules:
//!
//! - a VIP enters when `occupancy < capacity`;
//! - a normal client enters when `occupancy < capacity` and no VIP is waiting.
//!
//! On release the gate wakes exactly one waiter: a VIP if any is registered,
//! otherwise a normal client, otherwise nobody. Normal clients can therefore
//! wait indefinitely under a steady stream of VIPs.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::core::client::Client;
use crate::core::journal::{EventKind, EventSink, GateEvent};
use crate::core::GateError;
use crate::util::clock::remaining;
use crate::util::serde::ClientClass;

/// Point-in-time copy of the gate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSnapshot {
    /// Maximum simultaneous occupants.
    pub capacity: u32,
    /// Clients currently inside.
    pub occupancy: u32,
    /// VIPs registered and not yet admitted.
    pub waiting_vip: u32,
    /// Normal clients registered and not yet admitted.
    pub waiting_normal: u32,
}

impl GateSnapshot {
    /// Nobody inside and nobody waiting.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.occupancy == 0 && self.waiting_vip == 0 && self.waiting_normal == 0
    }
}

/// State guarded by the gate lock.
struct GateState {
    occupancy: u32,
    waiting_vip: u32,
    waiting_normal: u32,
    next_seq: u64,
    sink: Option<Box<dyn EventSink>>,
}

impl GateState {
    const fn new() -> Self {
        Self {
            occupancy: 0,
            waiting_vip: 0,
            waiting_normal: 0,
            next_seq: 0,
            sink: None,
        }
    }

    fn waiting_mut(&mut self, class: ClientClass) -> &mut u32 {
        match class {
            ClientClass::Vip => &mut self.waiting_vip,
            ClientClass::Normal => &mut self.waiting_normal,
        }
    }

    const fn admissible(&self, class: ClientClass, capacity: u32) -> bool {
        match class {
            ClientClass::Vip => self.occupancy < capacity,
            ClientClass::Normal => self.occupancy < capacity && self.waiting_vip == 0,
        }
    }

    fn register(&mut self, class: ClientClass) -> Result<(), GateError> {
        let waiting = self.waiting_mut(class);
        *waiting = waiting
            .checked_add(1)
            .ok_or_else(|| GateError::InvariantViolation(format!("{class} waiting count overflow")))?;
        Ok(())
    }

    fn unregister(&mut self, class: ClientClass) -> Result<(), GateError> {
        let waiting = self.waiting_mut(class);
        *waiting = waiting
            .checked_sub(1)
            .ok_or_else(|| GateError::InvariantViolation(format!("{class} waiting count below zero")))?;
        Ok(())
    }

    fn admit(&mut self, class: ClientClass, capacity: u32) -> Result<(), GateError> {
        if self.occupancy >= capacity {
            return Err(GateError::InvariantViolation(format!(
                "occupancy {} would exceed capacity {capacity}",
                self.occupancy
            )));
        }
        self.unregister(class)?;
        self.occupancy += 1;
        Ok(())
    }

    fn depart(&mut self) -> Result<(), GateError> {
        self.occupancy = self
            .occupancy
            .checked_sub(1)
            .ok_or_else(|| GateError::InvariantViolation("occupancy below zero".into()))?;
        Ok(())
    }

    fn emit(&mut self, client: Client, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(sink) = self.sink.as_mut() {
            sink.record(GateEvent {
                seq,
                client_id: client.id,
                class: client.class,
                kind,
                occupancy: self.occupancy,
            });
        }
    }
}

/// Counter arithmetic failing means the monitor itself is broken; there is no
/// state worth continuing from.
fn enforce(result: Result<(), GateError>) {
    if let Err(err) = result {
        panic!("admission gate corrupted: {err}");
    }
}

/// Capacity-bounded admission monitor for two priority classes.
pub struct AdmissionGate {
    capacity: u32,
    state: Mutex<GateState>,
    vip_ready: Condvar,
    normal_ready: Condvar,
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl AdmissionGate {
    /// Create an empty gate admitting at most `capacity` clients at once.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] when `capacity` is zero, since no
    /// client could ever be admitted.
    pub fn new(capacity: u32) -> Result<Self, GateError> {
        if capacity == 0 {
            return Err(GateError::InvalidConfig("capacity must be greater than 0".into()));
        }
        Ok(Self {
            capacity,
            state: Mutex::new(GateState::new()),
            vip_ready: Condvar::new(),
            normal_ready: Condvar::new(),
        })
    }

    /// Attach an event sink. Events are recorded under the gate lock.
    #[must_use]
    pub fn with_sink(self, sink: impl EventSink + 'static) -> Self {
        self.with_boxed_sink(Box::new(sink))
    }

    /// Attach an already boxed event sink.
    #[must_use]
    pub fn with_boxed_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.state.get_mut().sink = Some(sink);
        self
    }

    /// Maximum simultaneous occupants.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Copy of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> GateSnapshot {
        let state = self.state.lock();
        GateSnapshot {
            capacity: self.capacity,
            occupancy: state.occupancy,
            waiting_vip: state.waiting_vip,
            waiting_normal: state.waiting_normal,
        }
    }

    /// Block until `client` is admitted.
    ///
    /// Intent is registered before any blocking so the waiting counters always
    /// reflect pending demand. The returned permit releases the slot when it is
    /// released explicitly or dropped.
    pub fn acquire(&self, client: Client) -> AdmissionPermit<'_> {
        let mut state = self.register(client);
        let ready = self.ready_for(client.class);
        while !state.admissible(client.class, self.capacity) {
            ready.wait(&mut state);
        }
        self.grant(state, client)
    }

    /// Like [`acquire`](Self::acquire), but give up after `timeout`.
    ///
    /// An expired wait unregisters the client and passes on any wake it may
    /// have consumed, so the remaining waiters are not stranded.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Timeout`] if the client was not admitted in time.
    pub fn acquire_timeout(
        &self,
        client: Client,
        timeout: Duration,
    ) -> Result<AdmissionPermit<'_>, GateError> {
        let started = Instant::now();
        // Too far out to represent: no practical deadline.
        let Some(deadline) = started.checked_add(timeout) else {
            return Ok(self.acquire(client));
        };
        let mut state = self.register(client);
        let ready = self.ready_for(client.class);
        while !state.admissible(client.class, self.capacity) {
            let Some(left) = remaining(deadline) else {
                enforce(state.unregister(client.class));
                state.emit(client, EventKind::WaitAbandoned);
                if state.occupancy < self.capacity {
                    self.wake_next(&state);
                }
                return Err(GateError::Timeout {
                    id: client.id,
                    class: client.class,
                    waited: started.elapsed(),
                });
            };
            let _timed_out = ready.wait_for(&mut state, left);
        }
        Ok(self.grant(state, client))
    }

    fn register(&self, client: Client) -> MutexGuard<'_, GateState> {
        let mut state = self.state.lock();
        enforce(state.register(client.class));
        state.emit(client, EventKind::WaitRequested);
        state
    }

    fn grant(&self, mut state: MutexGuard<'_, GateState>, client: Client) -> AdmissionPermit<'_> {
        enforce(state.admit(client.class, self.capacity));
        state.emit(client, EventKind::Admitted);
        let entry_occupancy = state.occupancy;
        // A slot freed while this waiter was reacquiring the lock would
        // otherwise sit idle until the next release.
        if state.occupancy < self.capacity {
            self.wake_next(&state);
        }
        drop(state);
        AdmissionPermit {
            gate: self,
            client,
            entry_occupancy,
            released: false,
        }
    }

    /// Free the slot held by `client` and wake at most one waiter.
    fn release(&self, client: Client) -> u32 {
        let mut state = self.state.lock();
        enforce(state.depart());
        state.emit(client, EventKind::Departed);
        self.wake_next(&state);
        state.occupancy
    }

    /// VIP first, else normal, else nobody. Never both.
    fn wake_next(&self, state: &GateState) {
        if state.waiting_vip > 0 {
            self.vip_ready.notify_one();
        } else if state.waiting_normal > 0 {
            self.normal_ready.notify_one();
        }
    }

    const fn ready_for(&self, class: ClientClass) -> &Condvar {
        match class {
            ClientClass::Vip => &self.vip_ready,
            ClientClass::Normal => &self.normal_ready,
        }
    }
}

/// Proof of admission. Releasing or dropping it frees the slot.
#[must_use = "dropping the permit releases the slot immediately"]
#[derive(Debug)]
pub struct AdmissionPermit<'a> {
    gate: &'a AdmissionGate,
    client: Client,
    entry_occupancy: u32,
    released: bool,
}

impl AdmissionPermit<'_> {
    /// Client holding the slot.
    #[must_use]
    pub const fn client(&self) -> Client {
        self.client
    }

    /// Occupancy right after this client entered.
    #[must_use]
    pub const fn entry_occupancy(&self) -> u32 {
        self.entry_occupancy
    }

    /// Leave the venue, returning the occupancy after departure.
    pub fn release(mut self) -> u32 {
        self.released = true;
        self.gate.release(self.client)
    }
}

impl Drop for AdmissionPermit<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.gate.release(self.client);
        }
    }
}
