//! Builder wiring a gate and dispatcher from configuration.

use std::sync::Arc;

use crate::config::VenueConfig;
use crate::core::{AdmissionGate, Dispatcher, EventSink, GateError};

/// Builds an [`AdmissionGate`] and its [`Dispatcher`] from a [`VenueConfig`].
pub struct GateBuilder {
    config: VenueConfig,
    sink: Option<Box<dyn EventSink>>,
}

impl std::fmt::Debug for GateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateBuilder")
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl GateBuilder {
    /// Start from `config`.
    #[must_use]
    pub const fn new(config: VenueConfig) -> Self {
        Self { config, sink: None }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &VenueConfig {
        &self.config
    }

    /// Record gate events into `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Build the gate alone.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if the configuration does not validate.
    pub fn build_gate(self) -> Result<AdmissionGate, GateError> {
        self.config
            .validate()
            .map_err(|e| GateError::InvalidConfig(format!("config invalid: {e}")))?;
        let gate = AdmissionGate::new(self.config.capacity)?;
        Ok(match self.sink {
            Some(sink) => gate.with_boxed_sink(sink),
            None => gate,
        })
    }

    /// Build a dispatcher over a fresh shared gate.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if the configuration does not validate.
    pub fn build_dispatcher(self) -> Result<Dispatcher, GateError> {
        let stay = self.config.stay_policy();
        let patience = self.config.patience();
        let gate = Arc::new(self.build_gate()?);
        Ok(Dispatcher::new(gate, stay).with_patience(patience))
    }
}
