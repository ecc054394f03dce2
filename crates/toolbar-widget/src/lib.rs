//! toolbar-widget: keep a widget on a chosen toolbar in every browser window.
//!
//! A [`ToolbarWidget`] inserts its widget into the target toolbar's persisted
//! item order in each window it sees, respecting the user's later
//! rearrangements unless asked to force the widget back. Rendered instances
//! are sized to a target height, optionally shrunk to what the toolbar offers.
//!
//! The surrounding application is reached only through the traits in
//! [`host`]. [`test_support::FakeDesktop`] implements all of them in memory.
#![warn(missing_docs)]

pub mod config;
mod error;
pub mod host;
pub mod order;
pub mod size;
pub mod sync;
pub mod test_support;
pub mod watcher;
mod widget;

pub use config::{InsertBefore, PlacementConfig, SizeConfig, WidgetOptions};
pub use error::{Error, PersistError, Result};
pub use host::{
    Collaborators, IdNamespace, OrderPersistence, RenderedWidget, StaticNamespace, WidgetHost,
    Windowing,
};
pub use size::Measurement;
pub use toolbar_ids::{ContainerId, WidgetId, WindowId};
pub use widget::ToolbarWidget;
