//! Error types for admission and dispatch operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::util::serde::{ClientClass, ClientId};

/// Errors produced by the gate, the dispatcher and their inputs.
#[derive(Debug, Error)]
pub enum GateError {
    /// An OS resource (thread, primitive) could not be created. Fatal for the run.
    #[error("failed to create {what}: {source}")]
    ResourceCreation {
        /// What was being created.
        what: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// Gate counters would leave their legal range.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// Manifest input could not be parsed.
    #[error("malformed manifest at entry {entry}: {reason}")]
    MalformedManifest {
        /// Zero-based token position (0 is the count).
        entry: usize,
        /// What was wrong.
        reason: String,
    },
    /// Configuration rejected by validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Input file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A client thread panicked before finishing.
    #[error("client {id} panicked")]
    ClientPanicked {
        /// Client that panicked.
        id: ClientId,
    },
    /// A bounded acquire expired before the client was admitted.
    #[error("client {id} ({class}) not admitted within {waited:?}")]
    Timeout {
        /// Client that gave up.
        id: ClientId,
        /// Its class.
        class: ClientClass,
        /// How long it waited.
        waited: Duration,
    },
}

impl GateError {
    /// Returns a short stable label (`snake_case`) for use in logs.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::ResourceCreation { .. } => "resource_creation",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::MalformedManifest { .. } => "malformed_manifest",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Io { .. } => "io",
            Self::ClientPanicked { .. } => "client_panicked",
            Self::Timeout { .. } => "timeout",
        }
    }

    /// Whether the run must stop when this error surfaces.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Timeout { .. })
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
