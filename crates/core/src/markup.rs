//! The payload a viewport tool reports when a markup is completed.
//!
//! Viewport tools hand over loosely-shaped JSON. [`MarkupData::from_value`]
//! lifts the parts the pipeline cares about into typed fields and never
//! fails: anything absent or malformed becomes `None` / empty.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::{normalize_points, MarkupPayload, Point3D};
use crate::stats::{extract_roi_stats, extract_scalar_value, CachedStats, RoiStats, ScalarValue};

/// Line and text-box styling carried by an annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_dash: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<bool>,
    /// Text-box display flags, e.g. `{"hasShadow": true}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_box: Option<IndexMap<String, bool>>,
}

impl AnnotationStyle {
    pub fn is_empty(&self) -> bool {
        self.line_width.is_none()
            && self.line_dash.is_none()
            && self.shadow.is_none()
            && self.text_box.is_none()
    }
}

/// Tool-internal data of a completed markup.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupData {
    pub handles: MarkupPayload,
    /// `handles.textBox.text`, read before the layout is classified.
    pub text_box_text: Option<String>,
    pub cached_stats: CachedStats,
    pub text: Option<String>,
    pub label: Option<String>,
    pub style: Option<AnnotationStyle>,
    pub color: Option<String>,
}

impl Default for MarkupData {
    fn default() -> Self {
        Self {
            handles: MarkupPayload::NamedHandles(IndexMap::new()),
            text_box_text: None,
            cached_stats: CachedStats::new(),
            text: None,
            label: None,
            style: None,
            color: None,
        }
    }
}

impl MarkupData {
    /// Read markup data from the raw tool payload.
    ///
    /// Recognised keys: `handles`, `cachedStats`, `text`, `label`, `styles`
    /// and `color`. Empty strings count as absent.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let handles_raw = value.get("handles");

        let handles = handles_raw
            .and_then(MarkupPayload::from_value)
            .unwrap_or_else(|| MarkupPayload::NamedHandles(IndexMap::new()));

        let text_box_text = handles_raw
            .and_then(|h| h.get("textBox"))
            .and_then(|tb| non_empty_str(tb, "text"));

        let cached_stats = value
            .get("cachedStats")
            .and_then(serde_json::Value::as_object)
            .map(|stats| stats.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let style = value
            .get("styles")
            .and_then(|s| serde_json::from_value::<AnnotationStyle>(s.clone()).ok())
            .filter(|s| !s.is_empty());

        Self {
            handles,
            text_box_text,
            cached_stats,
            text: non_empty_str(value, "text"),
            label: non_empty_str(value, "label"),
            style,
            color: non_empty_str(value, "color"),
        }
    }

    /// Canonical points of this markup, see [`normalize_points`].
    pub fn points(&self) -> Vec<Point3D> {
        normalize_points(&self.handles)
    }

    pub fn scalar_value(&self) -> Option<ScalarValue> {
        extract_scalar_value(&self.cached_stats)
    }

    pub fn roi_stats(&self) -> Option<RoiStats> {
        extract_roi_stats(&self.cached_stats)
    }

    /// Annotation text: `text`, then the text box, then `label`.
    pub fn extract_text(&self) -> Option<String> {
        self.text
            .clone()
            .or_else(|| self.text_box_text.clone())
            .or_else(|| self.label.clone())
    }
}

impl<'de> Deserialize<'de> for MarkupData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn non_empty_str(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
