//! Handle layouts and the Geometry Normalizer.
//!
//! A viewport tool reports its control points in one of two layouts:
//!
//! - **array style**: `{"points": [[x, y, z], ...]}`, used by ROI tools
//!   and anything drawn as a path;
//! - **named style**: `{"start": [x, y, z], "end": [x, y, z], ...}`, where
//!   every entry that is not bookkeeping is a point.
//!
//! [`MarkupPayload`] is the closed variant over those two layouts and
//! [`normalize_points`] flattens either one into an ordered `Vec<Point3D>`.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Key under which array-style layouts store their coordinate list.
pub const POINTS_KEY: &str = "points";

/// Named-handle keys that carry bookkeeping rather than geometry.
pub const RESERVED_HANDLE_KEYS: &[&str] = &["textBox", "activeHandleIndex"];

// ---------------------------------------------------------------------------
// Point3D
// ---------------------------------------------------------------------------

/// A point in the viewport's image-plane space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Read a point from a coordinate slice. At least `x` and `y` are
    /// required; a missing `z` becomes `0`.
    pub fn from_coords(coords: &[f64]) -> Option<Self> {
        match coords {
            [x, y] => Some(Self::new(*x, *y, 0.0)),
            [x, y, z, ..] => Some(Self::new(*x, *y, *z)),
            _ => None,
        }
    }

    /// The `[x, y, z]` triple the viewport expects in array-style layouts.
    pub fn to_coords(self) -> Vec<f64> {
        vec![self.x, self.y, self.z]
    }
}

// ---------------------------------------------------------------------------
// Handle layouts
// ---------------------------------------------------------------------------

/// One entry of a named-handle layout.
///
/// Coordinates are numeric arrays; anything else (a text-box object, an
/// active-handle index) is kept verbatim so it can be inspected later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandleValue {
    Coords(Vec<f64>),
    Other(serde_json::Value),
}

/// The tool-internal handle structure, tagged by layout.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupPayload {
    /// `{"points": [[x, y, z], ...]}` in array order.
    ArrayPoints(Vec<Vec<f64>>),
    /// Named handles in their original iteration order.
    NamedHandles(IndexMap<String, HandleValue>),
}

impl MarkupPayload {
    /// Build the array-style layout from canonical points.
    pub fn from_points(points: &[Point3D]) -> Self {
        Self::ArrayPoints(points.iter().map(|p| p.to_coords()).collect())
    }

    /// Classify a raw handles object.
    ///
    /// An array-valued `points` field selects the array layout; any other
    /// object is a named layout. Array elements that are not numeric
    /// arrays are dropped. Returns `None` when `value` is not an object.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;

        if let Some(serde_json::Value::Array(items)) = object.get(POINTS_KEY) {
            let points = items.iter().filter_map(coords_from_value).collect();
            return Some(Self::ArrayPoints(points));
        }

        let handles = object
            .iter()
            .map(|(key, value)| {
                let entry = match coords_from_value(value) {
                    Some(coords) => HandleValue::Coords(coords),
                    None => HandleValue::Other(value.clone()),
                };
                (key.clone(), entry)
            })
            .collect();
        Some(Self::NamedHandles(handles))
    }

    /// Look up a non-geometry entry (e.g. `textBox`) in a named layout.
    pub fn named(&self, key: &str) -> Option<&serde_json::Value> {
        match self {
            Self::ArrayPoints(_) => None,
            Self::NamedHandles(handles) => match handles.get(key) {
                Some(HandleValue::Other(value)) => Some(value),
                _ => None,
            },
        }
    }
}

impl Serialize for MarkupPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::ArrayPoints(points) => {
                let mut map = IndexMap::with_capacity(1);
                map.insert(POINTS_KEY, points);
                map.serialize(serializer)
            }
            Self::NamedHandles(handles) => handles.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MarkupPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_value(&value).ok_or_else(|| D::Error::custom("handles must be a JSON object"))
    }
}

/// Read a numeric array. Non-numeric elements reject the whole entry.
fn coords_from_value(value: &serde_json::Value) -> Option<Vec<f64>> {
    value
        .as_array()?
        .iter()
        .map(serde_json::Value::as_f64)
        .collect()
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Flatten a handle layout into ordered canonical points.
///
/// Array layouts are consumed in array order. Named layouts are consumed in
/// iteration order, skipping [`RESERVED_HANDLE_KEYS`] and entries that are
/// not coordinates. Coordinates with fewer than two components are
/// skipped. An empty result means the markup has nothing to persist.
pub fn normalize_points(payload: &MarkupPayload) -> Vec<Point3D> {
    match payload {
        MarkupPayload::ArrayPoints(points) => points
            .iter()
            .filter_map(|coords| Point3D::from_coords(coords))
            .collect(),
        MarkupPayload::NamedHandles(handles) => handles
            .iter()
            .filter(|(key, _)| !RESERVED_HANDLE_KEYS.contains(&key.as_str()))
            .filter_map(|(_, value)| match value {
                HandleValue::Coords(coords) => Point3D::from_coords(coords),
                HandleValue::Other(_) => None,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
