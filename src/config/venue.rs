//! Venue configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::StayPolicy;

/// Environment variable holding the capacity.
pub const ENV_CAPACITY: &str = "VENUE_CAPACITY";
/// Environment variable holding the minimum stay in milliseconds.
pub const ENV_MIN_STAY_MS: &str = "VENUE_MIN_STAY_MS";
/// Environment variable holding the maximum stay in milliseconds.
pub const ENV_MAX_STAY_MS: &str = "VENUE_MAX_STAY_MS";
/// Environment variable holding the optional patience in milliseconds.
pub const ENV_PATIENCE_MS: &str = "VENUE_PATIENCE_MS";

/// Venue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    /// Maximum clients inside at once.
    pub capacity: u32,
    /// Shortest stay, milliseconds.
    pub min_stay_ms: u64,
    /// Longest stay, milliseconds.
    pub max_stay_ms: u64,
    /// Give up waiting after this many milliseconds. `None` waits forever.
    pub patience_ms: Option<u64>,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            min_stay_ms: 1_000,
            max_stay_ms: 3_000,
            patience_ms: None,
        }
    }
}

impl VenueConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.min_stay_ms > self.max_stay_ms {
            return Err(format!(
                "min_stay_ms ({}) must not exceed max_stay_ms ({})",
                self.min_stay_ms, self.max_stay_ms
            ));
        }
        if self.patience_ms == Some(0) {
            return Err("patience_ms must be greater than 0 when set".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg = Self::parse_json_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse configuration from a JSON string without validating.
    ///
    /// For layered loading, where later layers may still fix a bound this
    /// layer leaves inconsistent. Call [`validate`](Self::validate) once all
    /// layers are applied.
    pub fn parse_json_str(input: &str) -> Result<Self, String> {
        serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))
    }

    /// Override fields from `VENUE_*` environment variables.
    ///
    /// Unset variables keep the current value. The result is not validated,
    /// since a later layer may still override it.
    pub fn merge_env(self) -> Result<Self, String> {
        self.merge_with(|key| std::env::var(key).ok())
    }

    /// Same as [`merge_env`](Self::merge_env) with an injectable lookup.
    pub fn merge_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, String>
        where
            T::Err: std::fmt::Display,
        {
            raw.trim().parse().map_err(|e| format!("{key}: {e}"))
        }

        if let Some(raw) = lookup(ENV_CAPACITY) {
            self.capacity = parse(ENV_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MIN_STAY_MS) {
            self.min_stay_ms = parse(ENV_MIN_STAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_STAY_MS) {
            self.max_stay_ms = parse(ENV_MAX_STAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PATIENCE_MS) {
            self.patience_ms = Some(parse(ENV_PATIENCE_MS, &raw)?);
        }
        Ok(self)
    }

    /// Stay distribution implied by the bounds.
    #[must_use]
    pub const fn stay_policy(&self) -> StayPolicy {
        if self.min_stay_ms == self.max_stay_ms {
            StayPolicy::Fixed(Duration::from_millis(self.min_stay_ms))
        } else {
            StayPolicy::Uniform {
                min_ms: self.min_stay_ms,
                max_ms: self.max_stay_ms,
            }
        }
    }

    /// Patience as a duration.
    #[must_use]
    pub fn patience(&self) -> Option<Duration> {
        self.patience_ms.map(Duration::from_millis)
    }
}
