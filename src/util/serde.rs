//! Serializable value types shared across the crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Client identifier, assigned in manifest order.
pub type ClientId = u32;

/// Priority class of a visitor.
///
/// Ordering places [`ClientClass::Vip`] above [`ClientClass::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientClass {
    /// Regular visitor; admitted only when no VIP is waiting.
    Normal,
    /// Priority visitor; queues only on the capacity bound.
    Vip,
}

impl ClientClass {
    /// Map a manifest flag to a class. Zero is normal, anything else is VIP.
    #[must_use]
    pub const fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            Self::Normal
        } else {
            Self::Vip
        }
    }

    /// Whether this is the priority class.
    #[must_use]
    pub const fn is_vip(self) -> bool {
        matches!(self, Self::Vip)
    }

    /// Short stable label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Vip => "vip",
        }
    }
}

impl fmt::Display for ClientClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
