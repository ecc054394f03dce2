//! Widget options and the owned placement/sizing configuration derived from them.

use std::{collections::HashSet, fmt, result::Result as StdResult};

use serde::{
    Deserialize, Deserializer,
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
};
use toolbar_ids::{ContainerId, WidgetId, WindowId};

use crate::{Error, Result};

/// One id or an ordered list of ids, as accepted by `insertbefore`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InsertBefore {
    /// A single candidate.
    One(String),
    /// Candidates in priority order.
    Many(Vec<String>),
}

impl Default for InsertBefore {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl InsertBefore {
    /// Flatten into a priority-ordered list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

/// Construction options for a toolbar widget.
///
/// Keys follow the camelCase spelling used by callers, e.g.
/// `{"id": "clock", "toolbarID": "nav-bar", "insertbefore": ["home-button"], "height": 24}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    /// Caller-chosen widget id, namespaced before use.
    pub id: String,
    /// Toolbar the widget should live on.
    #[serde(rename = "toolbarID", default)]
    pub toolbar_id: Option<ContainerId>,
    /// Items to insert the widget before, in priority order.
    #[serde(rename = "insertbefore", default)]
    pub insert_before: InsertBefore,
    /// Re-evaluate placement in already processed windows.
    #[serde(default)]
    pub force_move: bool,
    /// Target height in pixels.
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    /// Allow the height to shrink to the toolbar's available space. Defaults to true.
    #[serde(default)]
    pub auto_shrink: Option<bool>,
    /// Height-to-width ratio; zero leaves the width alone.
    #[serde(default, deserialize_with = "lenient_number")]
    pub aspect_ratio: Option<f64>,
    /// Widget label, interpreted by the widget host.
    #[serde(default)]
    pub label: Option<String>,
    /// Widget content location, interpreted by the widget host.
    #[serde(rename = "contentURL", default)]
    pub content_url: Option<String>,
    /// Widget tooltip, interpreted by the widget host.
    #[serde(default)]
    pub tooltip: Option<String>,
}

impl WidgetOptions {
    /// Options for `id` with every other key at its default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Decode options from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Options(e.to_string()))
    }

    /// Decode options from RON.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Options(e.to_string()))
    }

    /// Validate numeric options and split into owned placement and sizing configs.
    pub fn into_configs(self, widget: WidgetId) -> Result<(PlacementConfig, SizeConfig)> {
        if let Some(h) = self.height {
            validate_height(h)?;
        }
        if let Some(r) = self.aspect_ratio {
            validate_aspect_ratio(r)?;
        }
        let placement = PlacementConfig {
            widget,
            toolbar_id: self.toolbar_id,
            insert_before: self.insert_before.into_vec(),
            force_move: self.force_move,
            processed: HashSet::new(),
        };
        let size = SizeConfig {
            height: self.height,
            auto_shrink: self.auto_shrink != Some(false),
            aspect_ratio: self.aspect_ratio.unwrap_or(0.0),
        };
        Ok((placement, size))
    }
}

/// Accept any scalar where a number is expected; non-numbers become NaN so that
/// validation reports them as invalid arguments rather than decode failures.
fn lenient_number<'de, D>(deserializer: D) -> StdResult<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    /// Visitor mapping scalars onto `Option<f64>`.
    struct Lenient;

    impl<'de> Visitor<'de> for Lenient {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> StdResult<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> StdResult<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> StdResult<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, _v: &str) -> StdResult<Self::Value, E> {
            Ok(Some(f64::NAN))
        }

        fn visit_bool<E: de::Error>(self, _v: bool) -> StdResult<Self::Value, E> {
            Ok(Some(f64::NAN))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> StdResult<Self::Value, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(Some(f64::NAN))
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> StdResult<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(Some(f64::NAN))
        }

        fn visit_none<E: de::Error>(self) -> StdResult<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> StdResult<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, d: D2) -> StdResult<Self::Value, D2::Error>
        where
            D2: Deserializer<'de>,
        {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(Lenient)
}

/// True for finite, non-negative numbers.
fn is_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Validate a target height.
pub fn validate_height(height: f64) -> Result<f64> {
    if is_non_negative(height) {
        Ok(height)
    } else {
        Err(Error::invalid("height", height))
    }
}

/// Validate an aspect ratio.
pub fn validate_aspect_ratio(ratio: f64) -> Result<f64> {
    if is_non_negative(ratio) {
        Ok(ratio)
    } else {
        Err(Error::invalid("aspectRatio", ratio))
    }
}

/// Where the widget goes and which windows have already been handled.
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    /// Rendered element id of the widget.
    pub widget: WidgetId,
    /// Target toolbar. Placement is skipped entirely when unset.
    pub toolbar_id: Option<ContainerId>,
    /// Insertion candidates in priority order.
    pub insert_before: Vec<String>,
    /// Re-evaluate already processed windows.
    pub force_move: bool,
    /// Windows a placement pass has already visited.
    pub processed: HashSet<WindowId>,
}

impl PlacementConfig {
    /// Forget a window, e.g. after it closed.
    pub fn forget(&mut self, window: WindowId) {
        self.processed.remove(&window);
    }
}

/// Height and width policy for rendered instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeConfig {
    /// Target height in pixels, if sizing was requested.
    pub height: Option<f64>,
    /// Allow shrinking to the toolbar's available height.
    pub auto_shrink: bool,
    /// Height-to-width ratio; zero leaves the width alone.
    pub aspect_ratio: f64,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            height: None,
            auto_shrink: true,
            aspect_ratio: 0.0,
        }
    }
}

impl SizeConfig {
    /// The target height when sizing is active. A zero height disables sizing.
    #[must_use]
    pub fn active_height(&self) -> Option<f64> {
        self.height.filter(|h| *h > 0.0)
    }
}
