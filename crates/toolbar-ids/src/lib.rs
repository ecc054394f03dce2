//! Shared identifiers for windows, toolbars and toolbar widgets.
#![warn(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for a live top-level window.
///
/// The identifier is a plain value and never keeps the window alive. Once a
/// window closes, its id may still be held by bookkeeping but resolves to
/// nothing through the windowing layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(u64);

impl WindowId {
    /// Construct a window identifier from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for WindowId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win#{}", self.0)
    }
}

/// Element id of a toolbar container, stable across windows.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Construct a container id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContainerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContainerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendered element id of a toolbar widget.
///
/// This is the id that appears in toolbar orders, derived from the owning
/// namespace and the caller-supplied widget id as `widget:<namespace>-<id>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Derive the rendered element id for `id` within `namespace`.
    pub fn derive(namespace: &str, id: &str) -> Self {
        Self(format!("widget:{namespace}-{id}"))
    }

    /// Wrap an already-derived element id.
    pub fn from_element_id(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the element id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
