//! Builders to construct gates and dispatchers from configuration.

pub mod gate_builder;

pub use gate_builder::GateBuilder;
