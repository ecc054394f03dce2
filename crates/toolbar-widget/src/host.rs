//! Collaborator seams: windowing, persistence, widget hosting and id namespaces.
//!
//! Everything the crate needs from the surrounding application is expressed
//! as a trait here. Production code adapts these to the real browser chrome;
//! tests use [`crate::test_support::FakeDesktop`].

use std::sync::Arc;

use toolbar_ids::{ContainerId, WidgetId, WindowId};

use crate::{PersistError, WidgetOptions};

/// Kind of element an id resolves to inside a window's document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A toolbar container holding an ordered item set.
    Toolbar,
    /// Any other element, carrying its tag name.
    Other(String),
}

/// Notifications a listener can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenTarget {
    /// A top-level window finished opening.
    Open,
    /// A top-level window closed.
    Close,
    /// Toolbar layout of one window changed (customization, icon size preference).
    LayoutChanged(WindowId),
}

/// Event payload delivered to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowEvent {
    /// A window opened.
    Opened(WindowId),
    /// A window closed.
    Closed(WindowId),
    /// The toolbar layout of a window changed.
    LayoutChanged(WindowId),
}

/// Opaque handle returned by [`Windowing::add_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked synchronously by the windowing layer.
pub type Listener = Arc<dyn Fn(WindowEvent) + Send + Sync>;

/// Windowing collaborator: window enumeration, document queries and notifications.
pub trait Windowing: Send + Sync {
    /// General window enumeration. Private windows may be missing.
    fn windows(&self) -> Vec<WindowId>;
    /// The currently focused window, if any.
    fn focused_window(&self) -> Option<WindowId>;
    /// True when the window is a browser window (the kind that carries toolbars).
    fn is_browser_window(&self, window: WindowId) -> bool;
    /// Every toolbar in the window's document, in document order.
    fn toolbars(&self, window: WindowId) -> Vec<ContainerId>;
    /// Resolve an element id in the window's document.
    fn lookup(&self, window: WindowId, id: &ContainerId) -> Option<ElementKind>;
    /// Register a listener.
    fn add_listener(&self, target: ListenTarget, listener: Listener) -> ListenerId;
    /// Remove a previously registered listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// Persistence collaborator for toolbar orders.
pub trait OrderPersistence: Send + Sync {
    /// Raw persisted order string for a toolbar, if any.
    fn load(&self, window: WindowId, toolbar: &ContainerId) -> Option<String>;
    /// Durably store a raw order string.
    fn store(
        &self,
        window: WindowId,
        toolbar: &ContainerId,
        encoded: &str,
    ) -> Result<(), PersistError>;
}

/// Rendered box height and vertical padding of an element, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BoxMetrics {
    /// Computed height.
    pub height: f64,
    /// Computed top padding.
    pub padding_top: f64,
    /// Computed bottom padding.
    pub padding_bottom: f64,
}

impl BoxMetrics {
    /// Height available to children.
    #[must_use]
    pub fn inner_height(&self) -> f64 {
        self.height - self.padding_top - self.padding_bottom
    }
}

/// One rendered instance of the widget inside one window.
pub trait RenderedWidget {
    /// True when the instance has its content frame.
    fn has_content(&self) -> bool;
    /// Minimum height of the widget element.
    fn min_height(&self) -> Option<f64>;
    /// Set the minimum height of the widget element.
    fn set_min_height(&mut self, px: f64);
    /// Minimum width of the widget element.
    fn min_width(&self) -> Option<f64>;
    /// Set the minimum width of the widget element.
    fn set_min_width(&mut self, px: f64);
    /// Set the content height.
    fn set_content_height(&mut self, px: f64);
    /// Set the content height cap.
    fn set_content_max_height(&mut self, px: f64);
    /// Set the content width.
    fn set_content_width(&mut self, px: f64);
    /// Element ids of the widget's ancestors, nearest parent first.
    fn ancestors(&self) -> Vec<String>;
    /// Measure an element's rendered box with the instance's current styles applied.
    fn measure(&self, element: &str) -> Option<BoxMetrics>;
    /// Discrete icon size class of an element (`small`, `large`, ...).
    fn size_class(&self, element: &str) -> Option<String>;
}

/// Widget-hosting collaborator.
pub trait WidgetHost: Send + Sync {
    /// Create the underlying widget. Unknown options are the host's to interpret.
    fn create(&self, widget: &WidgetId, options: &WidgetOptions);
    /// The widget's rendered instance in a window, if it has one.
    fn instance(&self, window: WindowId, widget: &WidgetId)
    -> Option<Box<dyn RenderedWidget + '_>>;
    /// Tear the underlying widget down.
    fn destroy(&self, widget: &WidgetId);
}

/// Provider for the namespace that prefixes rendered widget ids.
pub trait IdNamespace: Send + Sync {
    /// The namespace string.
    fn namespace(&self) -> String;
}

/// Fixed namespace, used as the default and in tests.
#[derive(Clone, Debug)]
pub struct StaticNamespace(pub String);

impl Default for StaticNamespace {
    fn default() -> Self {
        Self("testID".to_string())
    }
}

impl IdNamespace for StaticNamespace {
    fn namespace(&self) -> String {
        self.0.clone()
    }
}

/// The full set of collaborators a widget handle is wired to.
#[derive(Clone)]
pub struct Collaborators {
    /// Windowing layer.
    pub windowing: Arc<dyn Windowing>,
    /// Order persistence.
    pub persistence: Arc<dyn OrderPersistence>,
    /// Widget host.
    pub host: Arc<dyn WidgetHost>,
    /// Id namespace provider.
    pub namespace: Arc<dyn IdNamespace>,
}

impl Collaborators {
    /// Wire every seam to a single object implementing all collaborator traits.
    pub fn from_single<T>(all: Arc<T>) -> Self
    where
        T: Windowing + OrderPersistence + WidgetHost + 'static,
    {
        Self {
            windowing: all.clone(),
            persistence: all.clone(),
            host: all,
            namespace: Arc::new(StaticNamespace::default()),
        }
    }

    /// Replace the namespace provider.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Arc<dyn IdNamespace>) -> Self {
        self.namespace = namespace;
        self
    }
}
