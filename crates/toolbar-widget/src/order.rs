//! Toolbar order encoding and persistence.

use toolbar_ids::{ContainerId, WindowId};

use crate::{Result, host::OrderPersistence};

/// Persisted token standing in for an empty toolbar.
pub const EMPTY_SENTINEL: &str = "__empty";

/// Item separator in the persisted order string.
const SEPARATOR: char = ',';

/// Decode a persisted order string. The sentinel decodes to the empty order.
pub fn decode(raw: &str) -> Vec<String> {
    if raw == EMPTY_SENTINEL || raw.is_empty() {
        return Vec::new();
    }
    raw.split(SEPARATOR).map(str::to_string).collect()
}

/// Encode an order for persistence. The empty order encodes to the sentinel.
pub fn encode(items: &[String]) -> String {
    if items.is_empty() {
        EMPTY_SENTINEL.to_string()
    } else {
        items.join(",")
    }
}

/// Reads and writes toolbar orders through the persistence collaborator.
pub struct OrderStore<'a> {
    /// Backing persistence.
    persistence: &'a dyn OrderPersistence,
}

impl<'a> OrderStore<'a> {
    /// Wrap a persistence collaborator.
    pub fn new(persistence: &'a dyn OrderPersistence) -> Self {
        Self { persistence }
    }

    /// Current order of a toolbar. A missing value is the empty order.
    pub fn get_order(&self, window: WindowId, toolbar: &ContainerId) -> Vec<String> {
        self.persistence
            .load(window, toolbar)
            .map(|raw| decode(&raw))
            .unwrap_or_default()
    }

    /// Persist a toolbar order.
    pub fn set_order(&self, window: WindowId, toolbar: &ContainerId, items: &[String]) -> Result<()> {
        self.persistence.store(window, toolbar, &encode(items))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sentinel_means_empty() {
        assert!(decode(EMPTY_SENTINEL).is_empty());
        assert_eq!(encode(&[]), EMPTY_SENTINEL);
    }

    #[test]
    fn comma_separated_order() {
        assert_eq!(decode("back,forward,urlbar"), items(&["back", "forward", "urlbar"]));
        assert_eq!(encode(&items(&["a", "b"])), "a,b");
    }
}
