//! Height and width negotiation between a widget instance and its toolbar.
//!
//! The widget asks for a target height. With auto-shrink on, the height is
//! capped by the space the toolbar actually offers. That space is measured
//! live when the toolbar's height can be trusted, and guessed from the
//! toolbar's icon size class when it cannot (right after the icon size
//! preference changed, other items may still be rendered at the old size).

use tracing::debug;

use crate::{SizeConfig, host::RenderedWidget};

/// Ceiling for toolbars showing small icons.
pub const SMALL_ICON_CEILING: f64 = 19.0;
/// Ceiling for toolbars showing large icons.
pub const LARGE_ICON_CEILING: f64 = 33.0;
/// Content cap used while measuring when the widget has no minimum height.
pub const PROBE_HEIGHT: f64 = 16.0;
/// Id prefix of the element wrapping items while the toolbar is being customized.
const WRAPPER_PREFIX: &str = "wrapper-";

/// How the available toolbar height is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measurement {
    /// Measure the rendered toolbar. Valid on first layout.
    Live,
    /// Map the toolbar's icon size class to a fixed ceiling.
    Heuristic,
}

/// Discrete toolbar icon size classes with a known ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeClass {
    /// `small` icons.
    Small,
    /// `large` icons.
    Large,
}

impl SizeClass {
    /// Parse the toolbar's size class attribute. Unknown classes yield `None`.
    #[must_use]
    pub fn from_attr(attr: &str) -> Option<Self> {
        match attr {
            "small" => Some(Self::Small),
            "large" => Some(Self::Large),
            _ => None,
        }
    }

    /// Fixed height ceiling for this class.
    #[must_use]
    pub fn ceiling(self) -> f64 {
        match self {
            Self::Small => SMALL_ICON_CEILING,
            Self::Large => LARGE_ICON_CEILING,
        }
    }
}

/// Outcome of a negotiation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Negotiated {
    /// Height applied to the content.
    pub height: f64,
    /// Width applied to the content, when an aspect ratio is set.
    pub width: Option<f64>,
}

/// Resolve the element whose height bounds the widget.
fn host_toolbar(instance: &dyn RenderedWidget) -> Option<String> {
    let mut ancestors = instance.ancestors().into_iter();
    let parent = ancestors.next()?;
    if parent.starts_with(WRAPPER_PREFIX) {
        ancestors.next()
    } else {
        Some(parent)
    }
}

/// Height the toolbar offers the widget, if it can be determined.
fn available_height(instance: &mut dyn RenderedWidget, mode: Measurement) -> Option<f64> {
    let toolbar = host_toolbar(instance)?;
    match mode {
        Measurement::Live => {
            // Shrink our own content first so it does not prop the toolbar up.
            let probe = instance.min_height().unwrap_or(PROBE_HEIGHT);
            instance.set_content_max_height(probe);
            instance.measure(&toolbar).map(|m| m.inner_height())
        }
        Measurement::Heuristic => instance
            .size_class(&toolbar)
            .as_deref()
            .and_then(SizeClass::from_attr)
            .map(SizeClass::ceiling),
    }
}

/// Fit one instance to `size`. Returns `None` when no height is configured or
/// the instance has no content to size. A zero height is applied as is.
pub fn negotiate(
    instance: &mut dyn RenderedWidget,
    size: &SizeConfig,
    mode: Measurement,
) -> Option<Negotiated> {
    let target = size.height?;
    if !instance.has_content() {
        return None;
    }
    if instance.min_height().is_some_and(|min| min > target) {
        instance.set_min_height(target);
    }

    let mut height = target;
    if size.auto_shrink
        && let Some(ceiling) = available_height(instance, mode)
        && ceiling > 0.0
        && ceiling < height
    {
        height = ceiling;
    }
    instance.set_content_height(height);
    instance.set_content_max_height(height);

    let width = (size.aspect_ratio > 0.0).then(|| height / size.aspect_ratio);
    if let Some(w) = width {
        instance.set_content_width(w);
        if instance.min_width().is_some_and(|min| min > w) {
            instance.set_min_width(w);
        }
    }
    debug!(target_height = target, height, ?width, ?mode, "negotiated widget size");
    Some(Negotiated { height, width })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BoxMetrics;

    /// Stand-alone instance whose toolbar height follows the content cap.
    #[derive(Default)]
    struct Probe {
        content: bool,
        min_height: Option<f64>,
        min_width: Option<f64>,
        height: Option<f64>,
        max_height: Option<f64>,
        width: Option<f64>,
        ancestors: Vec<String>,
        toolbar_floor: f64,
        padding: f64,
        size_class: Option<String>,
    }

    impl Probe {
        fn in_toolbar(floor: f64, padding: f64) -> Self {
            Self {
                content: true,
                ancestors: vec!["nav-bar".into()],
                toolbar_floor: floor,
                padding,
                ..Self::default()
            }
        }
    }

    impl RenderedWidget for Probe {
        fn has_content(&self) -> bool {
            self.content
        }
        fn min_height(&self) -> Option<f64> {
            self.min_height
        }
        fn set_min_height(&mut self, px: f64) {
            self.min_height = Some(px);
        }
        fn min_width(&self) -> Option<f64> {
            self.min_width
        }
        fn set_min_width(&mut self, px: f64) {
            self.min_width = Some(px);
        }
        fn set_content_height(&mut self, px: f64) {
            self.height = Some(px);
        }
        fn set_content_max_height(&mut self, px: f64) {
            self.max_height = Some(px);
        }
        fn set_content_width(&mut self, px: f64) {
            self.width = Some(px);
        }
        fn ancestors(&self) -> Vec<String> {
            self.ancestors.clone()
        }
        fn measure(&self, element: &str) -> Option<BoxMetrics> {
            (element == "nav-bar").then(|| {
                let content = match (self.height, self.max_height) {
                    (Some(h), Some(m)) => h.min(m),
                    (Some(h), None) => h,
                    (None, m) => m.unwrap_or(0.0),
                };
                BoxMetrics {
                    height: self.toolbar_floor.max(content + 2.0 * self.padding),
                    padding_top: self.padding,
                    padding_bottom: self.padding,
                }
            })
        }
        fn size_class(&self, element: &str) -> Option<String> {
            (element == "nav-bar").then(|| self.size_class.clone()).flatten()
        }
    }

    fn cfg(height: f64) -> SizeConfig {
        SizeConfig {
            height: Some(height),
            ..SizeConfig::default()
        }
    }

    #[test]
    fn live_measurement_caps_height() {
        let mut p = Probe::in_toolbar(26.0, 3.0);
        let out = negotiate(&mut p, &cfg(30.0), Measurement::Live).unwrap();
        assert_eq!(out.height, 20.0);
        assert_eq!(p.height, Some(20.0));
        assert_eq!(p.max_height, Some(20.0));
    }

    #[test]
    fn live_measurement_ignores_own_stale_height() {
        let mut p = Probe::in_toolbar(26.0, 3.0);
        // A previous negotiation left the content tall enough to stretch the toolbar.
        p.height = Some(40.0);
        p.max_height = Some(40.0);
        let out = negotiate(&mut p, &cfg(30.0), Measurement::Live).unwrap();
        assert_eq!(out.height, 20.0);
    }

    #[test]
    fn large_size_class_ceiling() {
        let mut p = Probe::in_toolbar(80.0, 0.0);
        p.size_class = Some("large".into());
        let out = negotiate(&mut p, &cfg(50.0), Measurement::Heuristic).unwrap();
        assert_eq!(out.height, LARGE_ICON_CEILING);
    }

    #[test]
    fn small_size_class_ceiling() {
        let mut p = Probe::in_toolbar(80.0, 0.0);
        p.size_class = Some("small".into());
        let out = negotiate(&mut p, &cfg(50.0), Measurement::Heuristic).unwrap();
        assert_eq!(out.height, SMALL_ICON_CEILING);
    }

    #[test]
    fn unknown_size_class_keeps_target() {
        let mut p = Probe::in_toolbar(10.0, 0.0);
        p.size_class = Some("medium".into());
        let out = negotiate(&mut p, &cfg(50.0), Measurement::Heuristic).unwrap();
        assert_eq!(out.height, 50.0);
    }

    #[test]
    fn ceiling_above_target_keeps_target() {
        let mut p = Probe::in_toolbar(60.0, 0.0);
        let out = negotiate(&mut p, &cfg(24.0), Measurement::Live).unwrap();
        assert_eq!(out.height, 24.0);
    }

    #[test]
    fn without_auto_shrink_target_is_applied() {
        let mut p = Probe::in_toolbar(10.0, 0.0);
        let size = SizeConfig {
            auto_shrink: false,
            ..cfg(30.0)
        };
        let out = negotiate(&mut p, &size, Measurement::Live).unwrap();
        assert_eq!(out.height, 30.0);
    }

    #[test]
    fn stale_minimum_is_lowered() {
        let mut p = Probe::in_toolbar(60.0, 0.0);
        p.min_height = Some(32.0);
        negotiate(&mut p, &cfg(24.0), Measurement::Live).unwrap();
        assert_eq!(p.min_height, Some(24.0));
    }

    #[test]
    fn aspect_ratio_derives_width() {
        let mut p = Probe::in_toolbar(60.0, 0.0);
        p.min_width = Some(40.0);
        let size = SizeConfig {
            aspect_ratio: 0.5,
            ..cfg(16.0)
        };
        let out = negotiate(&mut p, &size, Measurement::Live).unwrap();
        assert_eq!(out.width, Some(32.0));
        assert_eq!(p.width, Some(32.0));
        assert_eq!(p.min_width, Some(32.0));
    }

    #[test]
    fn zero_aspect_ratio_leaves_width_alone() {
        let mut p = Probe::in_toolbar(60.0, 0.0);
        let out = negotiate(&mut p, &cfg(100.0), Measurement::Live).unwrap();
        assert_eq!(out.width, None);
        assert_eq!(p.width, None);
    }

    #[test]
    fn customization_wrapper_measures_grandparent() {
        let mut p = Probe::in_toolbar(26.0, 3.0);
        p.ancestors = vec!["wrapper-w".into(), "nav-bar".into()];
        let out = negotiate(&mut p, &cfg(30.0), Measurement::Live).unwrap();
        assert_eq!(out.height, 20.0);
    }

    #[test]
    fn zero_height_collapses_content() {
        let mut p = Probe::in_toolbar(26.0, 3.0);
        p.min_height = Some(12.0);
        let size = SizeConfig {
            aspect_ratio: 2.0,
            ..cfg(0.0)
        };
        let out = negotiate(&mut p, &size, Measurement::Heuristic).unwrap();
        assert_eq!(out.height, 0.0);
        assert_eq!(p.height, Some(0.0));
        assert_eq!(p.min_height, Some(0.0));
        assert_eq!(p.width, Some(0.0));
    }

    #[test]
    fn missing_content_is_untouched() {
        let mut p = Probe::in_toolbar(26.0, 3.0);
        p.content = false;
        p.min_height = Some(50.0);
        assert!(negotiate(&mut p, &cfg(30.0), Measurement::Live).is_none());
        assert_eq!(p.min_height, Some(50.0));
        assert_eq!(p.height, None);
    }
}
