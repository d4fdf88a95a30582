//! Value/Statistic Extractor.
//!
//! Tools cache their computed results per image in a map keyed by the image
//! locator. This module reads a single scalar `(value, unit)` and the
//! region-of-interest statistics out of that map, and builds the inverse
//! entry when a record is restored.
//!
//! Extraction never fails: absent or malformed fields degrade to `None`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Unit attached to a length-like result.
pub const UNIT_LENGTH: &str = "mm";

/// Unit attached to an angle-like result.
pub const UNIT_ANGLE: &str = "°";

/// Unit attached to an area-like result.
pub const UNIT_AREA: &str = "mm²";

/// Scalar lookup order: the first field present in an entry wins.
const SCALAR_FIELDS: &[(&str, &str)] = &[
    ("length", UNIT_LENGTH),
    ("angle", UNIT_ANGLE),
    ("area", UNIT_AREA),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-image cached results, keyed by image locator, in insertion order.
pub type CachedStats = IndexMap<String, serde_json::Value>;

/// Region-of-interest statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiStats {
    pub mean: f64,
    #[serde(default)]
    pub std_dev: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perimeter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_count: Option<i64>,
}

/// A single measured quantity with its physical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarValue {
    pub value: f64,
    pub unit: &'static str,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Read ROI statistics from the first entry whose `mean` is numeric.
///
/// `stdDev` falls back to `Std` and `area` to `areaUnit` when the first is
/// missing or zero; other missing numeric fields become `0`.
pub fn extract_roi_stats(cached: &CachedStats) -> Option<RoiStats> {
    cached.values().find_map(|entry| {
        let mean = number(entry, "mean")?;
        Some(RoiStats {
            mean,
            std_dev: first_nonzero(entry, &["stdDev", "Std"]).unwrap_or(0.0),
            min: number(entry, "min").unwrap_or(0.0),
            max: number(entry, "max").unwrap_or(0.0),
            area: first_nonzero(entry, &["area", "areaUnit"]).unwrap_or(0.0),
            perimeter: number(entry, "perimeter"),
            pixel_count: entry.get("pixelCount").and_then(serde_json::Value::as_i64),
        })
    })
}

/// Find the first scalar result: entries in order, and within an entry
/// length before angle before area.
pub fn extract_scalar_value(cached: &CachedStats) -> Option<ScalarValue> {
    cached.values().find_map(|entry| {
        SCALAR_FIELDS.iter().find_map(|(field, unit)| {
            number(entry, field).map(|value| ScalarValue { value, unit: *unit })
        })
    })
}

fn number(entry: &serde_json::Value, field: &str) -> Option<f64> {
    entry.get(field).and_then(serde_json::Value::as_f64)
}

fn first_nonzero(entry: &serde_json::Value, fields: &[&str]) -> Option<f64> {
    fields
        .iter()
        .filter_map(|field| number(entry, field))
        .find(|value| *value != 0.0)
}

// ---------------------------------------------------------------------------
// Restoration
// ---------------------------------------------------------------------------

/// Rebuild the cached-results map for a restored measurement.
///
/// ROI statistics are written first; a stored scalar is then written under
/// the field matching its unit. Unknown units are ignored. Returns an empty
/// map when there is nothing to restore.
pub fn cached_stats_for_restore(
    locator: &str,
    roi_stats: Option<&RoiStats>,
    value: Option<f64>,
    unit: Option<&str>,
) -> CachedStats {
    let mut entry = serde_json::Map::new();

    if let Some(stats) = roi_stats {
        entry.insert("mean".into(), stats.mean.into());
        entry.insert("stdDev".into(), stats.std_dev.into());
        entry.insert("min".into(), stats.min.into());
        entry.insert("max".into(), stats.max.into());
        entry.insert("area".into(), stats.area.into());
    }

    if let (Some(value), Some(unit)) = (value, unit) {
        if let Some((field, _)) = SCALAR_FIELDS.iter().find(|(_, u)| *u == unit) {
            entry.insert((*field).into(), value.into());
        }
    }

    let mut cached = CachedStats::new();
    if !entry.is_empty() {
        cached.insert(locator.to_string(), serde_json::Value::Object(entry));
    }
    cached
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
