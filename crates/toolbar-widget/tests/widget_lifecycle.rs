use std::sync::Arc;

use toolbar_widget::{
    Collaborators, ContainerId, Error, InsertBefore, Measurement, ToolbarWidget, WidgetOptions,
    host::ListenTarget, test_support::FakeDesktop,
};

fn options(height: Option<f64>) -> WidgetOptions {
    WidgetOptions {
        toolbar_id: Some(ContainerId::from("nav-bar")),
        insert_before: InsertBefore::One("home".into()),
        height,
        label: Some("Clock".into()),
        ..WidgetOptions::new("clock")
    }
}

fn build(desk: &Arc<FakeDesktop>, opts: &WidgetOptions) -> ToolbarWidget {
    ToolbarWidget::new(opts, Collaborators::from_single(desk.clone())).unwrap()
}

#[test]
fn construction_places_widget_in_every_window() {
    let desk = Arc::new(FakeDesktop::new());
    let a = desk.add_window(&[("nav-bar", "back,home")]);
    let b = desk.add_window(&[("nav-bar", "home,back")]);
    let w = build(&desk, &options(None));
    let id = w.widget_id().as_str().to_string();
    assert_eq!(id, "widget:testID-clock");
    assert_eq!(desk.order(a, "nav-bar"), vec!["back", id.as_str(), "home"]);
    assert_eq!(desk.order(b, "nav-bar"), vec![id.as_str(), "home", "back"]);
    assert!(desk.is_created(&id));
    assert_eq!(
        desk.last_options().and_then(|o| o.label).as_deref(),
        Some("Clock")
    );
    assert_eq!(desk.listener_count(ListenTarget::Open), 1);
    assert_eq!(desk.listener_count(ListenTarget::Close), 1);
}

#[test]
fn invalid_height_creates_nothing() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    let err = ToolbarWidget::new(&options(Some(-1.0)), Collaborators::from_single(desk.clone()))
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidArgument { field: "height", .. }));
    assert_eq!(
        err.to_string(),
        "ToolbarWidget.height should be a non-negative number. Got -1"
    );
    assert!(!desk.calls_contains("create"));
    assert!(!desk.calls_contains("add_listener"));
    assert_eq!(desk.order(win, "nav-bar"), vec!["back", "home"]);
}

#[test]
fn invalid_aspect_ratio_is_rejected() {
    let desk = Arc::new(FakeDesktop::new());
    let opts = WidgetOptions {
        aspect_ratio: Some(f64::NAN),
        ..options(Some(20.0))
    };
    let err = ToolbarWidget::new(&opts, Collaborators::from_single(desk.clone()))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::InvalidArgument {
            field: "aspectRatio",
            ..
        }
    ));
}

#[test]
fn destroy_twice_tears_down_once() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    let w = build(&desk, &options(Some(24.0)));
    assert_eq!(desk.listener_count(ListenTarget::LayoutChanged(win)), 1);

    w.destroy();
    w.destroy();
    assert!(w.is_destroyed());
    assert_eq!(desk.count_calls("destroy"), 1);
    assert_eq!(desk.count_calls("remove_listener"), 3);
    assert_eq!(desk.listener_count(ListenTarget::Open), 0);
    assert_eq!(desk.listener_count(ListenTarget::Close), 0);
    assert_eq!(desk.listener_count(ListenTarget::LayoutChanged(win)), 0);
    assert!(!desk.is_created(w.widget_id().as_str()));
}

#[test]
fn dropping_the_handle_destroys() {
    let desk = Arc::new(FakeDesktop::new());
    desk.add_window(&[("nav-bar", "back,home")]);
    {
        let _w = build(&desk, &options(None));
        assert_eq!(desk.listener_count(ListenTarget::Open), 1);
    }
    assert_eq!(desk.count_calls("destroy"), 1);
    assert_eq!(desk.listener_count(ListenTarget::Open), 0);
}

#[test]
fn drop_after_destroy_does_nothing_more() {
    let desk = Arc::new(FakeDesktop::new());
    desk.add_window(&[("nav-bar", "")]);
    let w = build(&desk, &options(None));
    w.destroy();
    drop(w);
    assert_eq!(desk.count_calls("destroy"), 1);
}

#[test]
fn construction_sizes_live_instances() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    // Default toolbar box: 30px tall with 2px padding, 26px inside.
    let w = build(&desk, &options(Some(40.0)));
    let inst = desk.instance_state(win, w.widget_id().as_str()).unwrap();
    assert_eq!(inst.content_height, Some(26.0));
    assert_eq!(inst.content_max_height, Some(26.0));
}

#[test]
fn zero_height_leaves_instances_alone() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    let w = build(&desk, &options(Some(0.0)));
    let height = desk
        .instance_state(win, w.widget_id().as_str())
        .and_then(|i| i.content_height);
    assert_eq!(height, None);
    assert_eq!(desk.listener_count(ListenTarget::LayoutChanged(win)), 0);
}

#[test]
fn set_height_renegotiates() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    let w = build(&desk, &options(Some(20.0)));
    let id = w.widget_id().as_str().to_string();
    assert_eq!(desk.instance_state(win, &id).unwrap().content_height, Some(20.0));

    w.set_height(10.0).unwrap();
    assert_eq!(w.height(), Some(10.0));
    assert_eq!(desk.instance_state(win, &id).unwrap().content_height, Some(10.0));

    assert!(w.set_height(-5.0).is_err());
    assert_eq!(w.height(), Some(10.0));
}

#[test]
fn set_height_zero_collapses_instances() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    let w = build(&desk, &options(Some(20.0)));
    let id = w.widget_id().as_str().to_string();
    assert_eq!(desk.instance_state(win, &id).unwrap().content_height, Some(20.0));

    w.set_height(0.0).unwrap();
    assert_eq!(w.height(), Some(0.0));
    let inst = desk.instance_state(win, &id).unwrap();
    assert_eq!(inst.content_height, Some(0.0));
    assert_eq!(inst.content_max_height, Some(0.0));

    // Automatic passes stay off at zero height.
    assert_eq!(w.renegotiate(Measurement::Heuristic), 0);
}

#[test]
fn set_aspect_ratio_without_height_changes_nothing() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    let w = build(&desk, &options(None));
    w.set_aspect_ratio(2.0).unwrap();
    let width = desk
        .instance_state(win, w.widget_id().as_str())
        .and_then(|i| i.content_width);
    assert_eq!(width, None);
}

#[test]
fn set_aspect_ratio_sets_width() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    let w = build(&desk, &options(Some(20.0)));
    w.set_aspect_ratio(0.5).unwrap();
    assert_eq!(w.aspect_ratio(), 0.5);
    let inst = desk.instance_state(win, w.widget_id().as_str()).unwrap();
    assert_eq!(inst.content_width, Some(40.0));
}

#[test]
fn without_auto_shrink_no_layout_listener() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home")]);
    let opts = WidgetOptions {
        auto_shrink: Some(false),
        ..options(Some(40.0))
    };
    let w = build(&desk, &opts);
    assert!(!w.auto_shrink());
    assert_eq!(desk.listener_count(ListenTarget::LayoutChanged(win)), 0);
    let inst = desk.instance_state(win, w.widget_id().as_str()).unwrap();
    assert_eq!(inst.content_height, Some(40.0));
}

#[test]
fn json_options_drive_construction() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back,home,menu")]);
    let opts = WidgetOptions::from_json(
        r#"{"id": "clock", "toolbarID": "nav-bar", "insertbefore": ["missing", "menu"], "contentURL": "data:text/html,hi"}"#,
    )
    .unwrap();
    let w = build(&desk, &opts);
    assert_eq!(
        desk.order(win, "nav-bar"),
        vec!["back", "home", w.widget_id().as_str(), "menu"]
    );
    assert_eq!(w.insert_before(), vec!["missing".to_string(), "menu".to_string()]);
    assert_eq!(
        desk.last_options().and_then(|o| o.content_url).as_deref(),
        Some("data:text/html,hi")
    );
}

#[test]
fn missing_toolbar_still_constructs() {
    let desk = Arc::new(FakeDesktop::new());
    let win = desk.add_window(&[("nav-bar", "back")]);
    let opts = WidgetOptions {
        toolbar_id: Some(ContainerId::from("nope")),
        ..options(None)
    };
    let w = build(&desk, &opts);
    assert_eq!(desk.order(win, "nav-bar"), vec!["back"]);
    assert!(desk.is_created(w.widget_id().as_str()));
}
