//! Scenario files and their replay against [`FakeDesktop`].
//!
//! A scenario lists the windows open before the widget is built, the widget's
//! options, and a sequence of steps. Windows are referred to by index in
//! opening order, counting both initial windows and those opened by steps.
//!
//! ```ron
//! #![enable(implicit_some)]
//! (
//!     windows: [(toolbars: [("nav-bar", "back,urlbar,home")])],
//!     widget: (id: "clock", toolbarID: "nav-bar", insertbefore: "home", height: 24),
//!     steps: [OpenWindow((toolbars: [("nav-bar", "back,home")])), ChangeLayout(0)],
//! )
//! ```

use std::{fs, path::Path, sync::Arc};

use serde::Deserialize;
use toolbar_ids::WindowId;
use toolbar_widget::{
    Collaborators, ContainerId, Measurement, StaticNamespace, ToolbarWidget, WidgetOptions,
    host::BoxMetrics, test_support::FakeDesktop,
};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One window to open.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowSpec {
    /// Toolbars as `(id, comma-separated order)`.
    #[serde(default)]
    pub toolbars: Vec<(String, String)>,
    /// Hide the window from general enumeration.
    #[serde(default)]
    pub private: bool,
    /// Focus the window once it is open.
    #[serde(default)]
    pub focused: bool,
}

/// One scripted step.
#[derive(Debug, Clone, Deserialize)]
pub enum Step {
    /// Open a window and notify listeners.
    OpenWindow(WindowSpec),
    /// Close the window with this index.
    CloseWindow(usize),
    /// Fire a layout change in the window with this index.
    ChangeLayout(usize),
    /// Set a toolbar's icon size class.
    SetSizeClass {
        /// Window index.
        window: usize,
        /// Toolbar id.
        toolbar: String,
        /// New class, or none to clear it.
        class: Option<String>,
    },
    /// Set a toolbar's rendered box.
    SetToolbarBox {
        /// Window index.
        window: usize,
        /// Toolbar id.
        toolbar: String,
        /// Box height.
        height: f64,
        /// Top and bottom padding.
        padding: f64,
    },
    /// Rearrange a toolbar as a user would.
    SetOrder {
        /// Window index.
        window: usize,
        /// Toolbar id.
        toolbar: String,
        /// Comma-separated order.
        order: String,
    },
    /// Change the widget's target height.
    SetHeight(f64),
    /// Change the widget's aspect ratio.
    SetAspectRatio(f64),
    /// Change the force-move policy.
    SetForceMove(bool),
    /// Change the target toolbar.
    SetToolbar(Option<String>),
    /// Run a placement pass now.
    EnsurePlacement,
    /// Re-fit instances using the size class heuristic.
    Renegotiate,
    /// Tear the widget down.
    Destroy,
}

/// A complete scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Namespace for the widget id.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Windows open before the widget is built.
    #[serde(default)]
    pub windows: Vec<WindowSpec>,
    /// Widget options.
    pub widget: WidgetOptions,
    /// Steps replayed after construction.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse a scenario from RON text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }
}

/// Final state of one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowReport {
    /// Index in opening order.
    pub index: usize,
    /// Toolbar ids and their orders.
    pub toolbars: Vec<(String, Vec<String>)>,
    /// Content height of the widget's rendered instance, if sized.
    pub widget_height: Option<f64>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Rendered widget id.
    pub widget: String,
    /// Windows still open, in opening order.
    pub windows: Vec<WindowReport>,
    /// Whether the widget was destroyed by a step.
    pub destroyed: bool,
}

impl Report {
    /// Human-readable rendering, one toolbar per line.
    pub fn render(&self) -> String {
        let mut out = format!("widget {}", self.widget);
        if self.destroyed {
            out.push_str(" (destroyed)");
        }
        out.push('\n');
        for w in &self.windows {
            match w.widget_height {
                Some(h) => out.push_str(&format!("window #{} height={h}\n", w.index)),
                None => out.push_str(&format!("window #{}\n", w.index)),
            }
            for (toolbar, order) in &w.toolbars {
                out.push_str(&format!("  {toolbar}: {}\n", order.join(",")));
            }
        }
        out
    }
}

/// Replay state: the desktop and the window index table.
struct Replay {
    /// In-memory collaborators.
    desk: Arc<FakeDesktop>,
    /// Window ids in opening order.
    opened: Vec<WindowId>,
}

impl Replay {
    /// Open a window without notifying listeners.
    fn add(&mut self, spec: &WindowSpec) -> WindowId {
        let toolbars: Vec<(&str, &str)> = spec
            .toolbars
            .iter()
            .map(|(id, order)| (id.as_str(), order.as_str()))
            .collect();
        let id = if spec.private {
            self.desk.add_private_window(&toolbars)
        } else {
            self.desk.add_window(&toolbars)
        };
        if spec.focused {
            self.desk.set_focused(Some(id));
        }
        self.opened.push(id);
        id
    }

    /// Resolve a window index used by step `step`.
    fn window(&self, step: usize, index: usize) -> Result<WindowId> {
        self.opened
            .get(index)
            .copied()
            .ok_or(Error::UnknownWindow { step, index })
    }
}

/// Replay `scenario` and report the final toolbar state.
pub fn run(scenario: &Scenario) -> Result<Report> {
    let desk = Arc::new(FakeDesktop::new());
    let mut replay = Replay {
        desk: desk.clone(),
        opened: Vec::new(),
    };
    for spec in &scenario.windows {
        replay.add(spec);
    }

    let mut collab = Collaborators::from_single(desk.clone());
    if let Some(ns) = &scenario.namespace {
        collab = collab.with_namespace(Arc::new(StaticNamespace(ns.clone())));
    }
    let widget = ToolbarWidget::new(&scenario.widget, collab)?;
    info!(widget = %widget.widget_id(), windows = replay.opened.len(), "widget built");

    for (step, action) in scenario.steps.iter().enumerate() {
        debug!(step, ?action, "replaying step");
        apply(&mut replay, &widget, step, action)?;
    }

    let live = desk.all_windows();
    let windows = replay
        .opened
        .iter()
        .enumerate()
        .filter(|(_, id)| live.contains(*id))
        .map(|(index, id)| WindowReport {
            index,
            toolbars: desk.toolbar_orders(*id),
            widget_height: desk
                .instance_state(*id, widget.widget_id().as_str())
                .and_then(|i| i.content_height),
        })
        .collect();
    Ok(Report {
        widget: widget.widget_id().to_string(),
        windows,
        destroyed: widget.is_destroyed(),
    })
}

/// Apply one step.
fn apply(replay: &mut Replay, widget: &ToolbarWidget, step: usize, action: &Step) -> Result<()> {
    match action {
        Step::OpenWindow(spec) => {
            let id = replay.add(spec);
            replay.desk.notify_opened(id);
        }
        Step::CloseWindow(index) => {
            let id = replay.window(step, *index)?;
            replay.desk.close_window(id);
        }
        Step::ChangeLayout(index) => {
            let id = replay.window(step, *index)?;
            replay.desk.change_layout(id);
        }
        Step::SetSizeClass {
            window,
            toolbar,
            class,
        } => {
            let id = replay.window(step, *window)?;
            replay.desk.set_size_class(id, toolbar, class.as_deref());
        }
        Step::SetToolbarBox {
            window,
            toolbar,
            height,
            padding,
        } => {
            let id = replay.window(step, *window)?;
            let metrics = BoxMetrics {
                height: *height,
                padding_top: *padding,
                padding_bottom: *padding,
            };
            replay.desk.set_toolbar_box(id, toolbar, metrics);
        }
        Step::SetOrder {
            window,
            toolbar,
            order,
        } => {
            let id = replay.window(step, *window)?;
            replay.desk.set_order(id, toolbar, order);
        }
        Step::SetHeight(h) => widget.set_height(*h)?,
        Step::SetAspectRatio(r) => widget.set_aspect_ratio(*r)?,
        Step::SetForceMove(f) => widget.set_force_move(*f),
        Step::SetToolbar(t) => widget.set_toolbar_id(t.as_deref().map(ContainerId::from)),
        Step::EnsurePlacement => {
            let moved = widget.ensure_placement();
            info!(step, moved, "placement pass");
        }
        Step::Renegotiate => {
            let sized = widget.renegotiate(Measurement::Heuristic);
            info!(step, sized, "renegotiated");
        }
        Step::Destroy => widget.destroy(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
        #![enable(implicit_some)]
        (
            windows: [(toolbars: [("nav-bar", "back,urlbar,home"), ("addon-bar", "")])],
            widget: (id: "clock", toolbarID: "nav-bar", insertbefore: "home", height: 24),
            steps: [
                OpenWindow((toolbars: [("nav-bar", "back,home")])),
                SetSizeClass(window: 1, toolbar: "nav-bar", class: "small"),
                ChangeLayout(1),
            ],
        )
    "#;

    #[test]
    fn basic_scenario_places_and_sizes() {
        let report = run(&Scenario::parse(BASIC).unwrap()).unwrap();
        assert_eq!(report.widget, "widget:testID-clock");
        assert_eq!(report.windows.len(), 2);
        let first = &report.windows[0];
        assert_eq!(
            first.toolbars[0].1,
            vec!["back", "urlbar", "widget:testID-clock", "home"]
        );
        assert!(first.toolbars[1].1.is_empty());
        // Only the second window's toolbar reports a size class.
        assert_eq!(first.widget_height, Some(24.0));
        assert_eq!(report.windows[1].widget_height, Some(19.0));
        assert!(!report.destroyed);
    }

    #[test]
    fn closed_windows_are_not_reported() {
        let text = r#"
            #![enable(implicit_some)]
            (
                windows: [(toolbars: [("nav-bar", "a")]), (toolbars: [("nav-bar", "b")])],
                widget: (id: "w", toolbarID: "nav-bar"),
                steps: [CloseWindow(0), Destroy],
            )
        "#;
        let report = run(&Scenario::parse(text).unwrap()).unwrap();
        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].index, 1);
        assert!(report.destroyed);
        assert!(report.render().contains("(destroyed)"));
    }

    #[test]
    fn unknown_window_index_fails() {
        let text = r#"(widget: (id: "w"), steps: [ChangeLayout(3)])"#;
        let err = run(&Scenario::parse(text).unwrap()).unwrap_err();
        assert!(matches!(err, Error::UnknownWindow { step: 0, index: 3 }));
    }

    #[test]
    fn invalid_height_step_fails() {
        let text = r#"(widget: (id: "w"), steps: [SetHeight(-2.0)])"#;
        let err = run(&Scenario::parse(text).unwrap()).unwrap_err();
        assert!(matches!(err, Error::Widget(_)));
    }

    #[test]
    fn custom_namespace_prefixes_widget_id() {
        let text = r#"(namespace: Some("jid1"), widget: (id: "w"))"#;
        let report = run(&Scenario::parse(text).unwrap()).unwrap();
        assert_eq!(report.widget, "widget:jid1-w");
    }

    #[test]
    fn shipped_scenario_replays() {
        let scenario = Scenario::parse(include_str!("../scenarios/clock.ron")).unwrap();
        let report = run(&scenario).unwrap();
        let indexes: Vec<usize> = report.windows.iter().map(|w| w.index).collect();
        assert_eq!(indexes, vec![0, 1]);
        assert_eq!(report.windows[0].widget_height, Some(19.0));
        let second = &report.windows[1].toolbars;
        assert_eq!(
            second[0].1,
            vec!["back-button", "widget:testID-clock", "urlbar-container"]
        );
        assert_eq!(second[1].1, vec!["status-bar"]);
    }

    #[test]
    fn set_height_refits_without_measuring() {
        let text = r#"
            #![enable(implicit_some)]
            (
                windows: [(toolbars: [("nav-bar", "a")])],
                widget: (id: "w", toolbarID: "nav-bar", height: 40),
                steps: [
                    SetToolbarBox(window: 0, toolbar: "nav-bar", height: 26.0, padding: 3.0),
                    SetHeight(30.0),
                ],
            )
        "#;
        let report = run(&Scenario::parse(text).unwrap()).unwrap();
        // SetHeight re-fits heuristically; without a size class the target stands.
        assert_eq!(report.windows[0].widget_height, Some(30.0));
    }

    #[test]
    fn malformed_scenario_is_a_parse_error() {
        assert!(matches!(
            Scenario::parse("(windows: 3)"),
            Err(Error::Scenario(_))
        ));
    }
}
