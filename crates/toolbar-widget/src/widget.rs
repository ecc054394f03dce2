//! The public widget handle.

use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use toolbar_ids::{ContainerId, WidgetId};
use tracing::{debug, trace};

use crate::{
    PlacementConfig, Result, SizeConfig, WidgetOptions,
    config::{validate_aspect_ratio, validate_height},
    host::{Collaborators, Listener, WindowEvent},
    order::OrderStore,
    size::{Measurement, negotiate},
    sync::PlacementSynchronizer,
    watcher::WindowWatcher,
};

/// Mutable state behind a widget handle.
struct WidgetState {
    /// Placement policy and processed windows.
    placement: PlacementConfig,
    /// Sizing policy.
    size: SizeConfig,
    /// Listener registrations.
    watcher: WindowWatcher,
}

/// State shared between the handle and the listeners it registers.
struct Shared {
    /// Rendered element id of the widget.
    widget: WidgetId,
    /// Collaborators the handle is wired to.
    collab: Collaborators,
    /// Configuration and bookkeeping.
    state: Mutex<WidgetState>,
    /// Set once by the first `destroy`.
    destroyed: AtomicBool,
}

/// Build the listener handed to the windowing layer. It holds the shared
/// state weakly so registered listeners never keep a dropped handle alive.
fn event_listener(shared: Weak<Shared>) -> Listener {
    Arc::new(move |event: WindowEvent| {
        if let Some(shared) = shared.upgrade() {
            shared.on_event(event);
        }
    })
}

impl Shared {
    /// True after `destroy`.
    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Run a placement pass over the live windows.
    fn place(&self, state: &mut WidgetState) -> usize {
        let windows = state.watcher.live_windows();
        let store = OrderStore::new(self.collab.persistence.as_ref());
        let sync = PlacementSynchronizer::new(self.collab.windowing.as_ref(), store);
        let moved = sync.ensure_placement(&mut state.placement, &windows);
        if moved > 0 {
            debug!(widget = %self.widget, moved, "placement pass");
        }
        moved
    }

    /// Negotiate the size of every rendered instance when sizing is active.
    /// Returns how many were sized.
    fn resize(&self, state: &mut WidgetState, mode: Measurement) -> usize {
        if state.size.active_height().is_none() {
            return 0;
        }
        self.refit(state, mode)
    }

    /// Negotiate every rendered instance at the configured height, zero included.
    fn refit(&self, state: &mut WidgetState, mode: Measurement) -> usize {
        if state.size.height.is_none() {
            return 0;
        }
        let mut sized = 0;
        for window in state.watcher.live_windows() {
            let negotiated = match self.collab.host.instance(window, &self.widget) {
                Some(mut instance) => negotiate(instance.as_mut(), &state.size, mode),
                None => continue,
            };
            if negotiated.is_some() {
                sized += 1;
            }
            if state.size.auto_shrink {
                state.watcher.watch_layout(window);
            }
        }
        sized
    }

    /// Dispatch a windowing notification.
    fn on_event(&self, event: WindowEvent) {
        if self.is_destroyed() {
            return;
        }
        trace!(widget = %self.widget, ?event, "window event");
        let mut state = self.state.lock();
        match event {
            WindowEvent::Opened(_) => {
                self.place(&mut state);
                self.resize(&mut state, Measurement::Live);
            }
            WindowEvent::Closed(window) => {
                state.placement.forget(window);
                state.watcher.forget_window(window);
            }
            WindowEvent::LayoutChanged(_) => {
                self.resize(&mut state, Measurement::Heuristic);
            }
        }
    }
}

/// A widget kept on a chosen toolbar in every browser window and sized to fit it.
///
/// Construct with [`ToolbarWidget::new`]. The handle listens for new windows
/// and layout changes until [`ToolbarWidget::destroy`] is called or the handle
/// is dropped.
pub struct ToolbarWidget {
    /// State shared with registered listeners.
    shared: Arc<Shared>,
}

impl ToolbarWidget {
    /// Validate `options`, place the widget in the open windows, create it through
    /// the widget host and start watching windows.
    ///
    /// Invalid numeric options fail before anything is touched.
    pub fn new(options: &WidgetOptions, collab: Collaborators) -> Result<Self> {
        let widget = WidgetId::derive(&collab.namespace.namespace(), &options.id);
        let (placement, size) = options.clone().into_configs(widget.clone())?;

        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let listener = event_listener(weak.clone());
            let watcher = WindowWatcher::new(collab.windowing.clone(), listener);
            Shared {
                widget: widget.clone(),
                collab: collab.clone(),
                state: Mutex::new(WidgetState {
                    placement,
                    size,
                    watcher,
                }),
                destroyed: AtomicBool::new(false),
            }
        });

        {
            let mut state = shared.state.lock();
            shared.place(&mut state);
        }
        collab.host.create(&widget, options);
        {
            let mut state = shared.state.lock();
            state.watcher.watch_lifecycle();
            shared.resize(&mut state, Measurement::Live);
        }
        debug!(widget = %widget, "toolbar widget created");
        Ok(Self { shared })
    }

    /// Rendered element id of the widget.
    #[must_use]
    pub fn widget_id(&self) -> &WidgetId {
        &self.shared.widget
    }

    /// Target toolbar.
    #[must_use]
    pub fn toolbar_id(&self) -> Option<ContainerId> {
        self.shared.state.lock().placement.toolbar_id.clone()
    }

    /// Change the target toolbar for future placement passes.
    pub fn set_toolbar_id(&self, toolbar: Option<ContainerId>) {
        self.shared.state.lock().placement.toolbar_id = toolbar;
    }

    /// Copy of the insertion candidates.
    #[must_use]
    pub fn insert_before(&self) -> Vec<String> {
        self.shared.state.lock().placement.insert_before.clone()
    }

    /// Replace the insertion candidates for future placement passes.
    pub fn set_insert_before(&self, candidates: Vec<String>) {
        self.shared.state.lock().placement.insert_before = candidates;
    }

    /// Whether placement passes revisit already processed windows.
    #[must_use]
    pub fn force_move(&self) -> bool {
        self.shared.state.lock().placement.force_move
    }

    /// Set the force-move policy. Takes effect on the next placement pass.
    pub fn set_force_move(&self, force_move: bool) {
        self.shared.state.lock().placement.force_move = force_move;
    }

    /// Target height.
    #[must_use]
    pub fn height(&self) -> Option<f64> {
        self.shared.state.lock().size.height
    }

    /// Set the target height and re-fit every rendered instance.
    ///
    /// Other items may still be rendered at an old size preference, so the
    /// re-fit uses the size class heuristic rather than a live measurement. A
    /// zero height is applied to the instances like any other.
    pub fn set_height(&self, height: f64) -> Result<()> {
        validate_height(height)?;
        let mut state = self.shared.state.lock();
        state.size.height = Some(height);
        if !self.shared.is_destroyed() {
            self.shared.refit(&mut state, Measurement::Heuristic);
        }
        Ok(())
    }

    /// Height-to-width ratio.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.shared.state.lock().size.aspect_ratio
    }

    /// Set the aspect ratio and re-fit every rendered instance.
    pub fn set_aspect_ratio(&self, ratio: f64) -> Result<()> {
        validate_aspect_ratio(ratio)?;
        let mut state = self.shared.state.lock();
        state.size.aspect_ratio = ratio;
        if !self.shared.is_destroyed() {
            self.shared.refit(&mut state, Measurement::Heuristic);
        }
        Ok(())
    }

    /// Whether the height may shrink to the toolbar's available space.
    #[must_use]
    pub fn auto_shrink(&self) -> bool {
        self.shared.state.lock().size.auto_shrink
    }

    /// Run a placement pass now. Returns how many windows were changed.
    pub fn ensure_placement(&self) -> usize {
        if self.shared.is_destroyed() {
            return 0;
        }
        let mut state = self.shared.state.lock();
        self.shared.place(&mut state)
    }

    /// Re-fit every rendered instance now. Returns how many instances were sized.
    pub fn renegotiate(&self, mode: Measurement) -> usize {
        if self.shared.is_destroyed() {
            return 0;
        }
        let mut state = self.shared.state.lock();
        self.shared.resize(&mut state, mode)
    }

    /// True once [`ToolbarWidget::destroy`] has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.shared.is_destroyed()
    }

    /// Remove every listener and destroy the underlying widget.
    ///
    /// Only the first call has an effect. A notification already being handled
    /// runs to completion.
    pub fn destroy(&self) {
        if self.shared.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        let removed = self.shared.state.lock().watcher.unwatch_all();
        self.shared.collab.host.destroy(&self.shared.widget);
        debug!(widget = %self.shared.widget, removed, "toolbar widget destroyed");
    }
}

impl Drop for ToolbarWidget {
    fn drop(&mut self) {
        self.destroy();
    }
}
