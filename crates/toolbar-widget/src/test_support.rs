//! In-memory collaborators for tests and the scenario harness.
//!
//! [`FakeDesktop`] implements every collaborator trait over a single
//! mutex-guarded model of windows, toolbars and rendered widget instances. It
//! journals calls so tests can assert on side effects, and can be told to fail
//! order writes for chosen windows.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use toolbar_ids::{ContainerId, WidgetId, WindowId};

use crate::{
    PersistError, WidgetOptions,
    host::{
        BoxMetrics, ElementKind, ListenTarget, Listener, ListenerId, OrderPersistence,
        RenderedWidget, WidgetHost, WindowEvent, Windowing,
    },
    order::{decode, encode},
};

/// Default rendered box for toolbars created by the fake.
const DEFAULT_TOOLBAR_BOX: BoxMetrics = BoxMetrics {
    height: 30.0,
    padding_top: 2.0,
    padding_bottom: 2.0,
};

/// Style state of one rendered widget instance.
#[derive(Clone, Debug, PartialEq)]
pub struct FakeInstance {
    /// Whether the instance has its content frame.
    pub content: bool,
    /// Widget minimum height.
    pub min_height: Option<f64>,
    /// Widget minimum width.
    pub min_width: Option<f64>,
    /// Content height.
    pub content_height: Option<f64>,
    /// Content height cap.
    pub content_max_height: Option<f64>,
    /// Content width.
    pub content_width: Option<f64>,
    /// Ancestor element ids, nearest first.
    pub ancestors: Vec<String>,
}

impl Default for FakeInstance {
    fn default() -> Self {
        Self {
            content: true,
            min_height: None,
            min_width: None,
            content_height: None,
            content_max_height: None,
            content_width: None,
            ancestors: Vec::new(),
        }
    }
}

impl FakeInstance {
    /// Instance rendered directly inside `toolbar`.
    pub fn in_toolbar(toolbar: &str) -> Self {
        Self {
            ancestors: vec![toolbar.to_string()],
            ..Self::default()
        }
    }

    /// Height the content currently occupies.
    fn occupied_height(&self) -> f64 {
        match (self.content_height, self.content_max_height) {
            (Some(h), Some(cap)) => h.min(cap),
            (Some(h), None) => h,
            (None, cap) => cap.unwrap_or(0.0),
        }
    }
}

/// One toolbar in a fake window.
#[derive(Clone, Debug)]
struct FakeToolbar {
    /// Element id.
    id: ContainerId,
    /// Raw persisted order.
    order: Option<String>,
    /// Rendered box before widget content is accounted for.
    base: BoxMetrics,
    /// Icon size class attribute.
    size_class: Option<String>,
    /// Fail every order write to this toolbar.
    fail_store: bool,
}

/// One fake top-level window.
#[derive(Clone, Debug)]
struct FakeWindow {
    /// Identifier.
    id: WindowId,
    /// Whether this is a browser window.
    browser: bool,
    /// Private windows are hidden from general enumeration.
    private: bool,
    /// Toolbars in document order.
    toolbars: Vec<FakeToolbar>,
    /// Non-toolbar elements, id to tag name.
    elements: HashMap<String, String>,
    /// Rendered widget instances keyed by element id.
    instances: HashMap<String, FakeInstance>,
    /// Fail every order write in this window.
    fail_store: bool,
}

impl FakeWindow {
    /// Look up a toolbar by id.
    fn toolbar(&self, id: &str) -> Option<&FakeToolbar> {
        self.toolbars.iter().find(|t| t.id.as_str() == id)
    }

    /// Look up a toolbar by id, mutably.
    fn toolbar_mut(&mut self, id: &str) -> Option<&mut FakeToolbar> {
        self.toolbars.iter_mut().find(|t| t.id.as_str() == id)
    }
}

/// Everything behind the fake's lock.
#[derive(Default)]
struct DesktopState {
    /// Next raw window id.
    next_window: u64,
    /// Open windows in opening order.
    windows: Vec<FakeWindow>,
    /// Focused window.
    focused: Option<WindowId>,
    /// Registered listeners.
    listeners: Vec<(ListenerId, ListenTarget, Listener)>,
    /// Next raw listener id.
    next_listener: u64,
    /// Widgets created and not yet destroyed.
    created: HashSet<String>,
    /// Options passed to the most recent `create`.
    last_options: Option<WidgetOptions>,
    /// Call journal.
    calls: Vec<String>,
}

impl DesktopState {
    /// Look up a window.
    fn window(&self, id: WindowId) -> Option<&FakeWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Look up a window mutably.
    fn window_mut(&mut self, id: WindowId) -> Option<&mut FakeWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Append to the call journal.
    fn note(&mut self, call: &str) {
        self.calls.push(call.to_string());
    }
}

/// In-memory windowing, persistence and widget host.
#[derive(Default)]
pub struct FakeDesktop {
    /// Model state.
    state: Mutex<DesktopState>,
}

impl FakeDesktop {
    /// An empty desktop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a browser window without notifying listeners. Toolbars are given as
    /// `(id, comma-separated order)`; an empty order string is an empty toolbar.
    pub fn add_window(&self, toolbars: &[(&str, &str)]) -> WindowId {
        self.insert_window(toolbars, false)
    }

    /// Add a private browser window, hidden from general enumeration.
    pub fn add_private_window(&self, toolbars: &[(&str, &str)]) -> WindowId {
        self.insert_window(toolbars, true)
    }

    /// Shared body of the window constructors.
    fn insert_window(&self, toolbars: &[(&str, &str)], private: bool) -> WindowId {
        let mut st = self.state.lock();
        st.next_window += 1;
        let id = WindowId::new(st.next_window);
        st.windows.push(FakeWindow {
            id,
            browser: true,
            private,
            toolbars: toolbars
                .iter()
                .map(|(tb, order)| FakeToolbar {
                    id: ContainerId::from(*tb),
                    order: Some(encode(&decode(order))),
                    base: DEFAULT_TOOLBAR_BOX,
                    size_class: None,
                    fail_store: false,
                })
                .collect(),
            elements: HashMap::new(),
            instances: HashMap::new(),
            fail_store: false,
        });
        id
    }

    /// Add a window and notify open listeners.
    pub fn open_window(&self, toolbars: &[(&str, &str)]) -> WindowId {
        let id = self.add_window(toolbars);
        self.notify_opened(id);
        id
    }

    /// Add a private window, focus it, and notify open listeners.
    pub fn open_private_window(&self, toolbars: &[(&str, &str)]) -> WindowId {
        let id = self.add_private_window(toolbars);
        self.set_focused(Some(id));
        self.notify_opened(id);
        id
    }

    /// Notify open listeners about a window added earlier.
    pub fn notify_opened(&self, id: WindowId) {
        self.dispatch(ListenTarget::Open, WindowEvent::Opened(id));
    }

    /// Close a window, drop its listeners, and notify close listeners.
    pub fn close_window(&self, id: WindowId) {
        {
            let mut st = self.state.lock();
            st.windows.retain(|w| w.id != id);
            st.listeners
                .retain(|(_, target, _)| *target != ListenTarget::LayoutChanged(id));
            if st.focused == Some(id) {
                st.focused = None;
            }
        }
        self.dispatch(ListenTarget::Close, WindowEvent::Closed(id));
    }

    /// Notify layout listeners of a window.
    pub fn change_layout(&self, id: WindowId) {
        self.dispatch(ListenTarget::LayoutChanged(id), WindowEvent::LayoutChanged(id));
    }

    /// Invoke listeners for `target` outside the lock.
    fn dispatch(&self, target: ListenTarget, event: WindowEvent) {
        let listeners: Vec<Listener> = self
            .state
            .lock()
            .listeners
            .iter()
            .filter(|(_, t, _)| *t == target)
            .map(|(_, _, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Set the focused window.
    pub fn set_focused(&self, id: Option<WindowId>) {
        self.state.lock().focused = id;
    }

    /// Mark a window as browser or non-browser.
    pub fn set_browser(&self, id: WindowId, browser: bool) {
        if let Some(w) = self.state.lock().window_mut(id) {
            w.browser = browser;
        }
    }

    /// Add a non-toolbar element.
    pub fn add_element(&self, id: WindowId, element: &str, tag: &str) {
        if let Some(w) = self.state.lock().window_mut(id) {
            w.elements.insert(element.to_string(), tag.to_string());
        }
    }

    /// Overwrite a toolbar order as if the user had rearranged it.
    pub fn set_order(&self, id: WindowId, toolbar: &str, order: &str) {
        if let Some(tb) = self
            .state
            .lock()
            .window_mut(id)
            .and_then(|w| w.toolbar_mut(toolbar))
        {
            tb.order = Some(encode(&decode(order)));
        }
    }

    /// Raw persisted order of a toolbar.
    pub fn raw_order(&self, id: WindowId, toolbar: &str) -> Option<String> {
        let st = self.state.lock();
        st.window(id)
            .and_then(|w| w.toolbar(toolbar))
            .and_then(|tb| tb.order.clone())
    }

    /// Decoded order of a toolbar.
    pub fn order(&self, id: WindowId, toolbar: &str) -> Vec<String> {
        self.raw_order(id, toolbar)
            .map(|raw| decode(&raw))
            .unwrap_or_default()
    }

    /// Make order writes in a window fail.
    pub fn set_fail_store(&self, id: WindowId, fail: bool) {
        if let Some(w) = self.state.lock().window_mut(id) {
            w.fail_store = fail;
        }
    }

    /// Make order writes to one toolbar fail.
    pub fn set_fail_store_toolbar(&self, id: WindowId, toolbar: &str, fail: bool) {
        if let Some(tb) = self
            .state
            .lock()
            .window_mut(id)
            .and_then(|w| w.toolbar_mut(toolbar))
        {
            tb.fail_store = fail;
        }
    }

    /// Set a toolbar's rendered box.
    pub fn set_toolbar_box(&self, id: WindowId, toolbar: &str, metrics: BoxMetrics) {
        if let Some(tb) = self
            .state
            .lock()
            .window_mut(id)
            .and_then(|w| w.toolbar_mut(toolbar))
        {
            tb.base = metrics;
        }
    }

    /// Set a toolbar's icon size class.
    pub fn set_size_class(&self, id: WindowId, toolbar: &str, class: Option<&str>) {
        if let Some(tb) = self
            .state
            .lock()
            .window_mut(id)
            .and_then(|w| w.toolbar_mut(toolbar))
        {
            tb.size_class = class.map(str::to_string);
        }
    }

    /// Set a toolbar's icon size class in every window.
    pub fn set_size_class_everywhere(&self, toolbar: &str, class: Option<&str>) {
        let mut st = self.state.lock();
        for w in &mut st.windows {
            if let Some(tb) = w.toolbar_mut(toolbar) {
                tb.size_class = class.map(str::to_string);
            }
        }
    }

    /// Install a rendered instance explicitly.
    pub fn place_instance(&self, id: WindowId, widget: &str, instance: FakeInstance) {
        if let Some(w) = self.state.lock().window_mut(id) {
            w.instances.insert(widget.to_string(), instance);
        }
    }

    /// Current style state of a rendered instance.
    pub fn instance_state(&self, id: WindowId, widget: &str) -> Option<FakeInstance> {
        let st = self.state.lock();
        st.window(id).and_then(|w| w.instances.get(widget).cloned())
    }

    /// Number of listeners registered for `target`.
    pub fn listener_count(&self, target: ListenTarget) -> usize {
        self.state
            .lock()
            .listeners
            .iter()
            .filter(|(_, t, _)| *t == target)
            .count()
    }

    /// True if the journal contains `call`.
    pub fn calls_contains(&self, call: &str) -> bool {
        self.state.lock().calls.iter().any(|c| c == call)
    }

    /// Number of journal entries equal to `call`.
    pub fn count_calls(&self, call: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// True while `widget` is created and not destroyed.
    pub fn is_created(&self, widget: &str) -> bool {
        self.state.lock().created.contains(widget)
    }

    /// Options passed to the most recent `create`.
    pub fn last_options(&self) -> Option<WidgetOptions> {
        self.state.lock().last_options.clone()
    }

    /// Ids of every open window, private ones included.
    pub fn all_windows(&self) -> Vec<WindowId> {
        self.state.lock().windows.iter().map(|w| w.id).collect()
    }

    /// Toolbar ids and decoded orders of a window.
    pub fn toolbar_orders(&self, id: WindowId) -> Vec<(String, Vec<String>)> {
        let st = self.state.lock();
        st.window(id)
            .map(|w| {
                w.toolbars
                    .iter()
                    .map(|tb| {
                        let order = tb.order.as_deref().map(decode).unwrap_or_default();
                        (tb.id.to_string(), order)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Windowing for FakeDesktop {
    fn windows(&self) -> Vec<WindowId> {
        self.state
            .lock()
            .windows
            .iter()
            .filter(|w| !w.private)
            .map(|w| w.id)
            .collect()
    }

    fn focused_window(&self) -> Option<WindowId> {
        self.state.lock().focused
    }

    fn is_browser_window(&self, window: WindowId) -> bool {
        self.state.lock().window(window).is_some_and(|w| w.browser)
    }

    fn toolbars(&self, window: WindowId) -> Vec<ContainerId> {
        self.state
            .lock()
            .window(window)
            .map(|w| w.toolbars.iter().map(|t| t.id.clone()).collect())
            .unwrap_or_default()
    }

    fn lookup(&self, window: WindowId, id: &ContainerId) -> Option<ElementKind> {
        let st = self.state.lock();
        let w = st.window(window)?;
        if w.toolbar(id.as_str()).is_some() {
            return Some(ElementKind::Toolbar);
        }
        w.elements
            .get(id.as_str())
            .map(|tag| ElementKind::Other(tag.clone()))
    }

    fn add_listener(&self, target: ListenTarget, listener: Listener) -> ListenerId {
        let mut st = self.state.lock();
        st.next_listener += 1;
        let id = ListenerId(st.next_listener);
        st.listeners.push((id, target, listener));
        st.note("add_listener");
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        let mut st = self.state.lock();
        st.listeners.retain(|(lid, _, _)| *lid != id);
        st.note("remove_listener");
    }
}

impl OrderPersistence for FakeDesktop {
    fn load(&self, window: WindowId, toolbar: &ContainerId) -> Option<String> {
        let st = self.state.lock();
        st.window(window)
            .and_then(|w| w.toolbar(toolbar.as_str()))
            .and_then(|tb| tb.order.clone())
    }

    fn store(
        &self,
        window: WindowId,
        toolbar: &ContainerId,
        encoded: &str,
    ) -> Result<(), PersistError> {
        let mut st = self.state.lock();
        st.note("store");
        let w = st
            .window_mut(window)
            .ok_or_else(|| PersistError::new(format!("{window} is closed")))?;
        if w.fail_store {
            return Err(PersistError::new(format!("{window} rejected write")));
        }
        let tb = w
            .toolbar_mut(toolbar.as_str())
            .ok_or_else(|| PersistError::new(format!("no toolbar {toolbar} in {window}")))?;
        if tb.fail_store {
            return Err(PersistError::new(format!("{toolbar} in {window} rejected write")));
        }
        tb.order = Some(encoded.to_string());
        Ok(())
    }
}

impl WidgetHost for FakeDesktop {
    fn create(&self, widget: &WidgetId, options: &WidgetOptions) {
        let mut st = self.state.lock();
        st.note("create");
        st.created.insert(widget.as_str().to_string());
        st.last_options = Some(options.clone());
    }

    fn instance(
        &self,
        window: WindowId,
        widget: &WidgetId,
    ) -> Option<Box<dyn RenderedWidget + '_>> {
        let mut st = self.state.lock();
        let created = st.created.contains(widget.as_str());
        let w = st.window_mut(window)?;
        let key = widget.as_str();
        if !w.instances.contains_key(key) && created {
            // Render lazily into whichever toolbar lists the widget.
            let host = w
                .toolbars
                .iter()
                .find(|tb| {
                    tb.order
                        .as_deref()
                        .is_some_and(|raw| decode(raw).iter().any(|item| item == key))
                })
                .map(|tb| tb.id.to_string())?;
            w.instances
                .insert(key.to_string(), FakeInstance::in_toolbar(&host));
        }
        let inst = w.instances.get(key)?.clone();
        Some(Box::new(FakeInstanceRef {
            desk: self,
            window,
            widget: key.to_string(),
            inst,
        }))
    }

    fn destroy(&self, widget: &WidgetId) {
        let mut st = self.state.lock();
        st.note("destroy");
        st.created.remove(widget.as_str());
    }
}

/// Working copy of an instance, written back to the desktop on drop.
struct FakeInstanceRef<'a> {
    /// Owning desktop.
    desk: &'a FakeDesktop,
    /// Window holding the instance.
    window: WindowId,
    /// Widget element id.
    widget: String,
    /// Working copy.
    inst: FakeInstance,
}

impl Drop for FakeInstanceRef<'_> {
    fn drop(&mut self) {
        let mut st = self.desk.state.lock();
        if let Some(w) = st.window_mut(self.window) {
            w.instances.insert(self.widget.clone(), self.inst.clone());
        }
    }
}

impl RenderedWidget for FakeInstanceRef<'_> {
    fn has_content(&self) -> bool {
        self.inst.content
    }

    fn min_height(&self) -> Option<f64> {
        self.inst.min_height
    }

    fn set_min_height(&mut self, px: f64) {
        self.inst.min_height = Some(px);
    }

    fn min_width(&self) -> Option<f64> {
        self.inst.min_width
    }

    fn set_min_width(&mut self, px: f64) {
        self.inst.min_width = Some(px);
    }

    fn set_content_height(&mut self, px: f64) {
        self.inst.content_height = Some(px);
    }

    fn set_content_max_height(&mut self, px: f64) {
        self.inst.content_max_height = Some(px);
    }

    fn set_content_width(&mut self, px: f64) {
        self.inst.content_width = Some(px);
    }

    fn ancestors(&self) -> Vec<String> {
        self.inst.ancestors.clone()
    }

    fn measure(&self, element: &str) -> Option<BoxMetrics> {
        let st = self.desk.state.lock();
        let base = st.window(self.window)?.toolbar(element)?.base;
        let content = if self.inst.ancestors.iter().any(|a| a == element) {
            self.inst.occupied_height() + base.padding_top + base.padding_bottom
        } else {
            0.0
        };
        Some(BoxMetrics {
            height: base.height.max(content),
            ..base
        })
    }

    fn size_class(&self, element: &str) -> Option<String> {
        let st = self.desk.state.lock();
        st.window(self.window)?.toolbar(element)?.size_class.clone()
    }
}
