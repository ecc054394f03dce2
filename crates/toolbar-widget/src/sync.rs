//! Keep the widget on its target toolbar in every browser window.
//!
//! A pass visits each window once unless `force_move` is set. In a visited
//! window the widget is inserted into the target toolbar when no toolbar holds
//! it yet. When another toolbar already holds it, the user's placement wins
//! unless `force_move` asks for the widget to be moved back.

use toolbar_ids::{ContainerId, WindowId};
use tracing::{debug, trace, warn};

use crate::{
    Error, PlacementConfig, Result,
    host::{ElementKind, Windowing},
    order::OrderStore,
};

/// Index of the first candidate present in `order`, scanning candidates in priority order.
pub fn insertion_index(order: &[String], candidates: &[String]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| order.iter().position(|item| item == c))
}

/// Insert `item` before the first present candidate, or append it.
pub fn insert_item(order: &mut Vec<String>, item: &str, candidates: &[String]) {
    match insertion_index(order, candidates) {
        Some(idx) => order.insert(idx, item.to_string()),
        None => order.push(item.to_string()),
    }
}

/// Drives placement passes over a set of windows.
pub struct PlacementSynchronizer<'a> {
    /// Document queries.
    windowing: &'a dyn Windowing,
    /// Order reads and writes.
    store: OrderStore<'a>,
}

impl<'a> PlacementSynchronizer<'a> {
    /// Create a synchronizer over the given collaborators.
    pub fn new(windowing: &'a dyn Windowing, store: OrderStore<'a>) -> Self {
        Self { windowing, store }
    }

    /// Run one pass over `windows`, returning how many windows had their target toolbar changed.
    ///
    /// Failures are per window: they are logged and the pass moves on.
    pub fn ensure_placement(&self, config: &mut PlacementConfig, windows: &[WindowId]) -> usize {
        let Some(target) = config.toolbar_id.clone() else {
            return 0;
        };
        let mut moved = 0;
        for &window in windows {
            if !config.force_move && config.processed.contains(&window) {
                trace!(%window, "placement already settled");
                continue;
            }
            config.processed.insert(window);
            match self.place_in_window(config, &target, window) {
                Ok(true) => moved += 1,
                Ok(false) => {}
                Err(err) => warn!(%window, toolbar = %target, "{err}"),
            }
        }
        moved
    }

    /// Place the widget in one window. Returns true when the target toolbar was written.
    fn place_in_window(
        &self,
        config: &PlacementConfig,
        target: &ContainerId,
        window: WindowId,
    ) -> Result<bool> {
        let widget = config.widget.as_str();
        for toolbar in self.windowing.toolbars(window) {
            let mut order = self.store.get_order(window, &toolbar);
            let Some(idx) = order.iter().position(|item| item == widget) else {
                continue;
            };
            if toolbar == *target || !config.force_move {
                trace!(%window, %toolbar, "widget already placed");
                return Ok(false);
            }
            // Resolve before removing so a missing target never strands the widget.
            self.resolve_target(window, target)?;
            order.remove(idx);
            self.store.set_order(window, &toolbar, &order)?;
            debug!(%window, from = %toolbar, to = %target, "moving widget");
            return self.insert(config, target, window).inspect_err(|_| {
                order.insert(idx, widget.to_string());
                if let Err(err) = self.store.set_order(window, &toolbar, &order) {
                    warn!(%window, %toolbar, "failed to restore widget: {err}");
                }
            });
        }
        self.resolve_target(window, target)?;
        self.insert(config, target, window)
    }

    /// Check that `target` names a toolbar in `window`.
    fn resolve_target(&self, window: WindowId, target: &ContainerId) -> Result<()> {
        match self.windowing.lookup(window, target) {
            Some(ElementKind::Toolbar) => Ok(()),
            Some(ElementKind::Other(tag)) => Err(Error::ContainerWrongType {
                id: target.clone(),
                tag,
            }),
            None => Err(Error::ContainerNotFound(target.clone())),
        }
    }

    /// Insert the widget into the target toolbar's order and persist it.
    fn insert(
        &self,
        config: &PlacementConfig,
        target: &ContainerId,
        window: WindowId,
    ) -> Result<bool> {
        let mut order = self.store.get_order(window, target);
        insert_item(&mut order, config.widget.as_str(), &config.insert_before);
        self.store.set_order(window, target, &order)?;
        debug!(%window, toolbar = %target, order = ?order, "widget inserted");
        Ok(true)
    }
}
