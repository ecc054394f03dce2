//! Window enumeration and listener bookkeeping.

use std::{collections::HashMap, sync::Arc};

use toolbar_ids::WindowId;
use tracing::trace;

use crate::host::{ListenTarget, Listener, ListenerId, Windowing};

/// Tracks the listeners one widget handle has registered with the windowing layer.
///
/// Every registration goes through the watcher so that teardown can remove
/// exactly what was added. Layout listeners are registered at most once per
/// window.
pub struct WindowWatcher {
    /// Windowing collaborator.
    windowing: Arc<dyn Windowing>,
    /// Handler for every event this watcher subscribes to.
    listener: Listener,
    /// Open/close registrations.
    lifecycle: Vec<ListenerId>,
    /// Layout-changed registrations keyed by window.
    layout: HashMap<WindowId, ListenerId>,
}

impl WindowWatcher {
    /// Create a watcher that routes every subscribed event to `listener`.
    pub fn new(windowing: Arc<dyn Windowing>, listener: Listener) -> Self {
        Self {
            windowing,
            listener,
            lifecycle: Vec::new(),
            layout: HashMap::new(),
        }
    }

    /// Browser windows currently open, always including the focused window.
    ///
    /// Private windows can be missing from the general enumeration while still
    /// being the active window.
    pub fn live_windows(&self) -> Vec<WindowId> {
        let mut windows = self.windowing.windows();
        if let Some(focused) = self.windowing.focused_window()
            && !windows.contains(&focused)
        {
            windows.push(focused);
        }
        windows.retain(|w| self.windowing.is_browser_window(*w));
        windows
    }

    /// Subscribe to window open and close notifications. Idempotent.
    pub fn watch_lifecycle(&mut self) {
        if !self.lifecycle.is_empty() {
            return;
        }
        for target in [ListenTarget::Open, ListenTarget::Close] {
            let id = self.windowing.add_listener(target, self.listener.clone());
            self.lifecycle.push(id);
        }
    }

    /// Subscribe to layout changes in `window`. Returns false when already subscribed.
    pub fn watch_layout(&mut self, window: WindowId) -> bool {
        if self.layout.contains_key(&window) {
            return false;
        }
        let id = self
            .windowing
            .add_listener(ListenTarget::LayoutChanged(window), self.listener.clone());
        self.layout.insert(window, id);
        trace!(%window, "watching layout");
        true
    }

    /// True when a layout listener is registered for `window`.
    #[must_use]
    pub fn is_watching_layout(&self, window: WindowId) -> bool {
        self.layout.contains_key(&window)
    }

    /// Drop bookkeeping for a closed window.
    pub fn forget_window(&mut self, window: WindowId) {
        if let Some(id) = self.layout.remove(&window) {
            self.windowing.remove_listener(id);
        }
    }

    /// Remove every registration. Returns how many listeners were removed.
    pub fn unwatch_all(&mut self) -> usize {
        let ids: Vec<ListenerId> = self
            .lifecycle
            .drain(..)
            .chain(self.layout.drain().map(|(_, id)| id))
            .collect();
        for id in &ids {
            self.windowing.remove_listener(*id);
        }
        ids.len()
    }
}
