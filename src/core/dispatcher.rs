//! Dispatcher: one OS thread per client, joined before returning.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::client::{Activity, Client, ClientReport, ClientTask, StayPolicy};
use crate::core::gate::{AdmissionGate, GateSnapshot};
use crate::core::GateError;
use crate::util::serde::ClientClass;

/// Result of a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Reports of clients that got in, in manifest order.
    pub reports: Vec<ClientReport>,
    /// Clients that gave up waiting.
    pub abandoned: Vec<Client>,
    /// Gate counters after every client finished.
    pub final_snapshot: GateSnapshot,
}

impl RunSummary {
    /// Number of admitted clients of `class`.
    #[must_use]
    pub fn admitted(&self, class: ClientClass) -> usize {
        self.reports.iter().filter(|r| r.client.class == class).count()
    }

    /// Longest admission wait among clients of `class`.
    #[must_use]
    pub fn max_wait(&self, class: ClientClass) -> Duration {
        self.reports
            .iter()
            .filter(|r| r.client.class == class)
            .map(|r| r.waited)
            .max()
            .unwrap_or_default()
    }
}

/// Spawns client tasks against a shared gate.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    gate: Arc<AdmissionGate>,
    stay: StayPolicy,
    patience: Option<Duration>,
    activity: Option<Activity>,
}

impl Dispatcher {
    /// Create a dispatcher for `gate`.
    #[must_use]
    pub const fn new(gate: Arc<AdmissionGate>, stay: StayPolicy) -> Self {
        Self {
            gate,
            stay,
            patience: None,
            activity: None,
        }
    }

    /// Let every client give up after `patience` without admission.
    #[must_use]
    pub fn with_patience(mut self, patience: Option<Duration>) -> Self {
        self.patience = patience;
        self
    }

    /// Give every client `activity` to perform while inside.
    #[must_use]
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Gate used by this dispatcher.
    #[must_use]
    pub const fn gate(&self) -> &Arc<AdmissionGate> {
        &self.gate
    }

    /// Spawn one thread per client in order and wait for all of them.
    ///
    /// # Errors
    ///
    /// - [`GateError::ResourceCreation`] if a thread cannot be spawned. Clients
    ///   already started are joined first; nothing further is spawned.
    /// - [`GateError::ClientPanicked`] if a client thread panicked.
    pub fn run(&self, clients: Vec<Client>) -> Result<RunSummary, GateError> {
        info!(clients = clients.len(), capacity = self.gate.capacity(), "dispatching");

        let mut handles: Vec<(Client, JoinHandle<Result<ClientReport, GateError>>)> =
            Vec::with_capacity(clients.len());
        let mut spawn_failure = None;

        for client in clients {
            let mut task = ClientTask::new(client, Arc::clone(&self.gate), self.stay);
            if let Some(patience) = self.patience {
                task = task.with_patience(patience);
            }
            if let Some(activity) = &self.activity {
                task = task.with_activity(activity.clone());
            }
            match thread::Builder::new()
                .name(format!("client-{}", client.id))
                .spawn(move || task.run())
            {
                Ok(handle) => handles.push((client, handle)),
                Err(source) => {
                    error!(client = client.id, %source, "failed to spawn client thread");
                    spawn_failure = Some(GateError::ResourceCreation {
                        what: format!("thread for client {}", client.id),
                        source,
                    });
                    break;
                }
            }
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut abandoned = Vec::new();
        let mut failure = spawn_failure;
        for (client, handle) in handles {
            match handle.join() {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(GateError::Timeout { waited, .. })) => {
                    warn!(client = client.id, class = %client.class, ?waited, "gave up waiting");
                    abandoned.push(client);
                }
                Ok(Err(err)) => {
                    error!(client = client.id, error = %err, "client failed");
                    failure.get_or_insert(err);
                }
                Err(_) => {
                    error!(client = client.id, "client thread panicked");
                    failure.get_or_insert(GateError::ClientPanicked { id: client.id });
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        let final_snapshot = self.gate.snapshot();
        info!(
            admitted = reports.len(),
            abandoned = abandoned.len(),
            occupancy = final_snapshot.occupancy,
            "all clients finished"
        );
        Ok(RunSummary {
            reports,
            abandoned,
            final_snapshot,
        })
    }
}
