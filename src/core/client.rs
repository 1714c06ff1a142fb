//! Client task lifecycle.
//!
//! A client moves strictly through `Arrived -> Waiting -> Inside -> Done`.
//! It only becomes `Inside` through a granted [`AdmissionPermit`], and the
//! permit is released before the task reports `Done`.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::gate::{AdmissionGate, AdmissionPermit};
use crate::core::GateError;
use crate::util::serde::{ClientClass, ClientId};

/// Visitor descriptor, passed by value to its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier.
    pub id: ClientId,
    /// Priority class.
    pub class: ClientClass,
}

impl Client {
    /// Create a descriptor.
    #[must_use]
    pub const fn new(id: ClientId, class: ClientClass) -> Self {
        Self { id, class }
    }
}

/// Lifecycle position of a client task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientState {
    /// Created, not yet registered at the gate.
    Arrived,
    /// Registered and blocked until admitted.
    Waiting,
    /// Holding a slot.
    Inside,
    /// Left the venue.
    Done,
}

impl ClientState {
    /// The only legal successor, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Arrived => Some(Self::Waiting),
            Self::Waiting => Some(Self::Inside),
            Self::Inside => Some(Self::Done),
            Self::Done => None,
        }
    }
}

/// How long an admitted client stays inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayPolicy {
    /// Always the same duration; useful for deterministic runs.
    Fixed(Duration),
    /// Uniformly drawn whole milliseconds in `min_ms..=max_ms`.
    Uniform {
        /// Lower bound, inclusive.
        min_ms: u64,
        /// Upper bound, inclusive.
        max_ms: u64,
    },
}

impl StayPolicy {
    /// Draw one stay duration.
    #[must_use]
    pub fn sample(&self) -> Duration {
        match *self {
            Self::Fixed(stay) => stay,
            Self::Uniform { min_ms, max_ms } if max_ms <= min_ms => Duration::from_millis(min_ms),
            Self::Uniform { min_ms, max_ms } => {
                Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
            }
        }
    }
}

impl Default for StayPolicy {
    fn default() -> Self {
        Self::Uniform {
            min_ms: 1_000,
            max_ms: 3_000,
        }
    }
}

/// Work a client performs while it holds its slot, after its stay elapses.
///
/// Runs outside the gate lock. If it panics, the permit is dropped during
/// unwinding and the slot is freed.
#[derive(Clone)]
pub struct Activity(Arc<dyn Fn(Client) + Send + Sync>);

impl Activity {
    /// Wrap `f`.
    pub fn new(f: impl Fn(Client) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    fn perform(&self, client: Client) {
        (self.0)(client);
    }
}

impl std::fmt::Debug for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Activity(..)")
    }
}

/// Outcome of one completed client task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientReport {
    /// Who ran.
    pub client: Client,
    /// States visited, in order.
    pub trail: Vec<ClientState>,
    /// Time between registering and admission.
    pub waited: Duration,
    /// Time spent inside.
    pub stayed: Duration,
    /// Occupancy right after entering.
    pub entry_occupancy: u32,
    /// Occupancy right after leaving.
    pub exit_occupancy: u32,
}

/// One visitor: acquire, stay, release.
#[derive(Debug)]
pub struct ClientTask {
    client: Client,
    gate: Arc<AdmissionGate>,
    stay: StayPolicy,
    patience: Option<Duration>,
    activity: Option<Activity>,
    trail: Vec<ClientState>,
}

impl ClientTask {
    /// Create a task for `client` against `gate`.
    #[must_use]
    pub fn new(client: Client, gate: Arc<AdmissionGate>, stay: StayPolicy) -> Self {
        Self {
            client,
            gate,
            stay,
            patience: None,
            activity: None,
            trail: vec![ClientState::Arrived],
        }
    }

    /// Give up if not admitted within `patience`.
    #[must_use]
    pub fn with_patience(mut self, patience: Duration) -> Self {
        self.patience = Some(patience);
        self
    }

    /// Run `activity` while inside, after the stay.
    #[must_use]
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        self.trail.last().copied().unwrap_or(ClientState::Arrived)
    }

    fn advance(&mut self) {
        let current = self.state();
        debug_assert!(current.next().is_some(), "client {} advanced past Done", self.client.id);
        if let Some(next) = current.next() {
            self.trail.push(next);
        }
    }

    /// Run the whole lifecycle on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Timeout`] when a patience limit is set and the
    /// client is not admitted in time. The client never entered in that case.
    pub fn run(mut self) -> Result<ClientReport, GateError> {
        let Client { id, class } = self.client;
        let gate = Arc::clone(&self.gate);

        self.advance();
        debug!(client = id, %class, "wants to enter");
        let arrived = Instant::now();
        let permit = match self.patience {
            Some(patience) => gate.acquire_timeout(self.client, patience)?,
            None => gate.acquire(self.client),
        };
        let waited = arrived.elapsed();

        self.advance();
        let entry_occupancy = permit.entry_occupancy();
        info!(client = id, %class, occupancy = entry_occupancy, ?waited, "entered");

        let stayed = occupy(&permit, self.stay.sample(), self.activity.as_ref());
        let exit_occupancy = permit.release();
        self.advance();
        info!(client = id, %class, occupancy = exit_occupancy, ?stayed, "left");

        Ok(ClientReport {
            client: self.client,
            trail: self.trail,
            waited,
            stayed,
            entry_occupancy,
            exit_occupancy,
        })
    }
}

/// Hold the slot for `stay`. Only a live permit may be passed in.
fn occupy(permit: &AdmissionPermit<'_>, stay: Duration, activity: Option<&Activity>) -> Duration {
    debug!(client = permit.client().id, ?stay, "dancing");
    let started = Instant::now();
    thread::sleep(stay);
    if let Some(activity) = activity {
        activity.perform(permit.client());
    }
    started.elapsed()
}
