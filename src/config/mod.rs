//! Configuration models for the venue and its clients.

pub mod venue;

pub use venue::VenueConfig;
