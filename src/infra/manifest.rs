//! Client manifest input.
//!
//! A manifest is a whitespace-separated list of integers: first the number of
//! clients `N`, then `N` class flags (`0` normal, anything else VIP). Clients
//! are numbered `0..N` in file order.

use std::path::Path;

use crate::core::{Client, GateError};
use crate::util::serde::{ClientClass, ClientId};

/// Parse manifest text into clients.
///
/// Tokens after the `N`th flag are ignored.
///
/// # Errors
///
/// Returns [`GateError::MalformedManifest`] when the count is missing,
/// negative or not an integer, when a flag is not an integer, or when fewer
/// than `N` flags follow.
pub fn parse_manifest(input: &str) -> Result<Vec<Client>, GateError> {
    let mut tokens = input.split_whitespace();

    let count = tokens.next().ok_or_else(|| GateError::MalformedManifest {
        entry: 0,
        reason: "missing client count".into(),
    })?;
    let count: ClientId = count.parse().map_err(|e| GateError::MalformedManifest {
        entry: 0,
        reason: format!("bad client count `{count}`: {e}"),
    })?;

    let mut clients = Vec::with_capacity(count.min(4096) as usize);
    for id in 0..count {
        let entry = id as usize + 1;
        let flag = tokens.next().ok_or_else(|| GateError::MalformedManifest {
            entry,
            reason: format!("missing entry for client {id}"),
        })?;
        let flag: i64 = flag.parse().map_err(|e| GateError::MalformedManifest {
            entry,
            reason: format!("bad class flag `{flag}` for client {id}: {e}"),
        })?;
        clients.push(Client::new(id, ClientClass::from_flag(flag)));
    }

    let extra = tokens.count();
    if extra > 0 {
        tracing::warn!(extra, "ignoring trailing manifest tokens");
    }
    Ok(clients)
}

/// Read and parse a manifest file.
///
/// # Errors
///
/// Returns [`GateError::Io`] if the file cannot be read, otherwise whatever
/// [`parse_manifest`] returns.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<Client>, GateError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| GateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&text)
}
