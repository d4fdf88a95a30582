//! Serialized-string boundary for the backend schema.
//!
//! The backend stores geometry, ROI statistics and annotation style as JSON
//! text columns (`pointsJson`, `roiStatsJson`, `styleJson`). These functions
//! are the only place those strings are produced or read, and every failure
//! is reported as a [`BlobError`] naming the field.

use crate::geometry::Point3D;
use crate::markup::AnnotationStyle;
use crate::stats::RoiStats;

pub const POINTS_FIELD: &str = "pointsJson";
pub const ROI_STATS_FIELD: &str = "roiStatsJson";
pub const STYLE_FIELD: &str = "styleJson";

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Failed to encode {field}: {source}")]
    Encode {
        field: &'static str,
        source: serde_json::Error,
    },

    #[error("Failed to decode {field}: {source}")]
    Decode {
        field: &'static str,
        source: serde_json::Error,
    },

    #[error("Failed to decode {field}: {reason}")]
    Shape {
        field: &'static str,
        reason: String,
    },
}

impl BlobError {
    /// The backend field the failure belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Encode { field, .. } | Self::Decode { field, .. } | Self::Shape { field, .. } => {
                *field
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// Encode points as a JSON array of `{x, y, z}` objects.
pub fn encode_points(points: &[Point3D]) -> Result<String, BlobError> {
    serde_json::to_string(points).map_err(|source| BlobError::Encode {
        field: POINTS_FIELD,
        source,
    })
}

/// Decode a `pointsJson` string. A missing `z` becomes `0`.
pub fn decode_points(raw: &str) -> Result<Vec<Point3D>, BlobError> {
    serde_json::from_str(raw).map_err(|source| BlobError::Decode {
        field: POINTS_FIELD,
        source,
    })
}

// ---------------------------------------------------------------------------
// ROI statistics
// ---------------------------------------------------------------------------

pub fn encode_roi_stats(stats: &RoiStats) -> Result<String, BlobError> {
    serde_json::to_string(stats).map_err(|source| BlobError::Encode {
        field: ROI_STATS_FIELD,
        source,
    })
}

/// Decode a `roiStatsJson` string.
///
/// `Std` is accepted for `stdDev` and `areaUnit` for `area` (first present
/// wins); missing numeric fields other than `mean` default to `0`.
pub fn decode_roi_stats(raw: &str) -> Result<RoiStats, BlobError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| BlobError::Decode {
            field: ROI_STATS_FIELD,
            source,
        })?;

    let object = value.as_object().ok_or_else(|| BlobError::Shape {
        field: ROI_STATS_FIELD,
        reason: "expected a JSON object".to_string(),
    })?;

    let mean = first_number(object, &["mean"]).ok_or_else(|| BlobError::Shape {
        field: ROI_STATS_FIELD,
        reason: "missing numeric mean".to_string(),
    })?;

    Ok(RoiStats {
        mean,
        std_dev: first_number(object, &["stdDev", "Std"]).unwrap_or(0.0),
        min: first_number(object, &["min"]).unwrap_or(0.0),
        max: first_number(object, &["max"]).unwrap_or(0.0),
        area: first_number(object, &["area", "areaUnit"]).unwrap_or(0.0),
        perimeter: first_number(object, &["perimeter"]),
        pixel_count: object.get("pixelCount").and_then(serde_json::Value::as_i64),
    })
}

fn first_number(
    object: &serde_json::Map<String, serde_json::Value>,
    keys: &[&str],
) -> Option<f64> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(serde_json::Value::as_f64))
}

// ---------------------------------------------------------------------------
// Annotation style
// ---------------------------------------------------------------------------

pub fn encode_style(style: &AnnotationStyle) -> Result<String, BlobError> {
    serde_json::to_string(style).map_err(|source| BlobError::Encode {
        field: STYLE_FIELD,
        source,
    })
}

pub fn decode_style(raw: &str) -> Result<AnnotationStyle, BlobError> {
    serde_json::from_str(raw).map_err(|source| BlobError::Decode {
        field: STYLE_FIELD,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn points_encode_as_objects() {
        let raw = encode_points(&[Point3D::new(10.0, 20.0, 0.0)]).unwrap();
        assert_eq!(raw, r#"[{"x":10.0,"y":20.0,"z":0.0}]"#);
        assert_eq!(decode_points(&raw).unwrap(), vec![Point3D::new(10.0, 20.0, 0.0)]);
    }

    #[test]
    fn points_decode_without_z() {
        let points = decode_points(r#"[{"x":1,"y":2}]"#).unwrap();
        assert_eq!(points, vec![Point3D::new(1.0, 2.0, 0.0)]);
    }

    #[test]
    fn malformed_points_report_field() {
        let err = decode_points("[{\"x\":1}").unwrap_err();
        assert_matches!(err, BlobError::Decode { field: POINTS_FIELD, .. });
        assert!(err.to_string().starts_with("Failed to decode pointsJson"));
    }

    #[test]
    fn roi_stats_alternate_keys() {
        let stats = decode_roi_stats(r#"{"mean":5,"Std":1.5,"areaUnit":12}"#).unwrap();
        assert_eq!(stats.std_dev, 1.5);
        assert_eq!(stats.area, 12.0);
        assert_eq!(stats.min, 0.0);
    }

    #[test]
    fn roi_stats_primary_key_wins() {
        let stats = decode_roi_stats(r#"{"mean":5,"stdDev":2,"Std":9}"#).unwrap();
        assert_eq!(stats.std_dev, 2.0);
    }

    #[test]
    fn roi_stats_shape_errors() {
        assert_matches!(
            decode_roi_stats("[1,2]"),
            Err(BlobError::Shape { field: ROI_STATS_FIELD, .. })
        );
        assert_matches!(decode_roi_stats(r#"{"min":1}"#), Err(BlobError::Shape { .. }));
        assert_matches!(decode_roi_stats("nope"), Err(BlobError::Decode { .. }));
    }

    #[test]
    fn roi_stats_encode_then_decode() {
        let stats = RoiStats {
            mean: 120.5,
            std_dev: 15.2,
            min: 80.0,
            max: 200.0,
            area: 706.5,
            perimeter: Some(94.2),
            pixel_count: Some(700),
        };
        assert_eq!(decode_roi_stats(&encode_roi_stats(&stats).unwrap()).unwrap(), stats);
    }

    #[test]
    fn style_decode_error_is_typed() {
        let err = decode_style(r#"{"lineWidth":"wide"}"#).unwrap_err();
        assert_eq!(err.field(), STYLE_FIELD);
    }
}
