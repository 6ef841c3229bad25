// src/pipeline/diff.rs

//! Change detection between a stored snapshot and a fresh envelope.
//!
//! The stored snapshot is handled as plain JSON: it may come from an older
//! generator, so only the sigil, `seq` and `institutions` are looked at.

use serde_json::Value;

use crate::models::DiscoveryEnvelope;

/// A previously published discovery document.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    root: Value,
}

impl Snapshot {
    /// Parse stored bytes; anything unreadable counts as "no snapshot".
    pub fn parse(bytes: &[u8], sigil: &str) -> Option<Self> {
        let root: Value = match serde_json::from_slice(bytes) {
            Ok(root) => root,
            Err(e) => {
                log::warn!("Previous snapshot is not valid JSON, ignoring it: {e}");
                return None;
            }
        };
        if root.get(sigil).is_none() {
            log::warn!("Previous snapshot has no {sigil:?} key, ignoring it");
            return None;
        }
        Some(Self::from_value(root))
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    fn feed<'a>(&'a self, sigil: &str) -> Option<&'a Value> {
        self.root.get(sigil)
    }

    /// Sequence number of the snapshot, when it has a valid one.
    pub fn seq(&self, sigil: &str) -> Option<u64> {
        self.feed(sigil)?.get("seq")?.as_u64()
    }

    /// Institution list of the snapshot, when it is a list.
    pub fn institutions(&self, sigil: &str) -> Option<&Vec<Value>> {
        self.feed(sigil)?.get("institutions")?.as_array()
    }
}

/// Sequence number to continue from, if there is a usable snapshot.
pub fn previous_seq(previous: Option<&Snapshot>, sigil: &str) -> Option<u64> {
    previous.and_then(|snapshot| snapshot.seq(sigil))
}

/// Returns the previous `seq` when `current` has the same institutions as
/// `previous`, `None` when the new envelope must be published.
pub fn is_up_to_date(previous: Option<&Snapshot>, current: &DiscoveryEnvelope) -> Option<u64> {
    let previous = previous?;
    let sigil = current.sigil.as_str();
    let old = previous.institutions(sigil)?;
    let seq = previous.seq(sigil)?;

    let new = match serde_json::to_value(current.institutions()) {
        Ok(Value::Array(new)) => new,
        Ok(_) => return None,
        Err(e) => {
            log::warn!("Cannot compare institutions: {e}");
            return None;
        }
    };

    (*old == new).then_some(seq)
}
