//! Input adapters.

pub mod manifest;

pub use manifest::{load_manifest, parse_manifest};
