//! Backend wire schema.
//!
//! The backend keeps geometry, ROI statistics and style in JSON text
//! columns. Rows coming back are decoded best-effort: a blob that fails to
//! decode is logged and replaced by an empty / absent value so the rest of
//! the record survives. Bodies going out are encoded the same way.
//!
//! List envelopes keep their rows as raw JSON and decode them one at a
//! time, so a single malformed row is skipped instead of failing the list.

use radmark_core::blob::{self, BlobError};
use radmark_core::{
    Annotation, AnnotationStyle, AnnotationType, CreateAnnotation, CreateMeasurement, KeyImage,
    Measurement, MeasurementType, Point3D, RecordId, RoiStats, Timestamp, UpdateAnnotation,
    UpdateMeasurement,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

fn default_visible() -> bool {
    true
}

/// Log a blob failure and fall back to `None`.
fn best_effort<T>(result: Result<T, BlobError>, record_id: Option<RecordId>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                record_id = ?record_id,
                field = e.field(),
                error = %e,
                "Dropping undecodable blob field",
            );
            None
        }
    }
}

/// Decode each row on its own, logging and skipping the ones that fail.
fn decode_rows<R, T>(rows: Vec<serde_json::Value>, kind: &'static str) -> Vec<T>
where
    R: DeserializeOwned,
    T: From<R>,
{
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned();
            match serde_json::from_value::<R>(row) {
                Ok(row) => Some(T::from(row)),
                Err(e) => {
                    tracing::warn!(
                        kind,
                        record_id = ?id,
                        error = %e,
                        "Skipping undecodable row",
                    );
                    None
                }
            }
        })
        .collect()
}

fn decode_points(raw: Option<&str>, id: RecordId) -> Vec<Point3D> {
    raw.and_then(|raw| best_effort(blob::decode_points(raw), Some(id)))
        .unwrap_or_default()
}

fn encode_points(points: &[Point3D]) -> Option<String> {
    best_effort(blob::encode_points(points), None)
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// A measurement as the backend returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRow {
    pub id: RecordId,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub image_id: Option<String>,
    pub frame_index: Option<u32>,
    pub measurement_type: MeasurementType,
    pub tool_name: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub points_json: Option<String>,
    pub roi_stats_json: Option<String>,
    pub color: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<MeasurementRow> for Measurement {
    fn from(row: MeasurementRow) -> Self {
        let points = decode_points(row.points_json.as_deref(), row.id);
        let roi_stats = row
            .roi_stats_json
            .as_deref()
            .and_then(|raw| best_effort(blob::decode_roi_stats(raw), Some(row.id)));

        Self {
            id: row.id,
            study_instance_uid: row.study_instance_uid,
            series_instance_uid: row.series_instance_uid,
            sop_instance_uid: row.sop_instance_uid,
            image_id: row.image_id,
            frame_index: row.frame_index.unwrap_or(0),
            measurement_type: row.measurement_type,
            tool_name: row.tool_name,
            label: row.label,
            value: row.value,
            unit: row.unit,
            points,
            roi_stats,
            color: row.color,
            visible: row.visible,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request body for `POST /measurements`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementBody<'a> {
    pub study_instance_uid: &'a str,
    pub series_instance_uid: &'a str,
    pub sop_instance_uid: &'a str,
    pub image_id: Option<&'a str>,
    pub frame_index: u32,
    pub measurement_type: MeasurementType,
    pub tool_name: &'a str,
    pub label: Option<&'a str>,
    pub value: Option<f64>,
    pub unit: Option<&'a str>,
    pub points_json: Option<String>,
    pub roi_stats_json: Option<String>,
    pub color: Option<&'a str>,
    pub visible: bool,
    pub created_by: Option<&'a str>,
}

impl<'a> From<&'a CreateMeasurement> for MeasurementBody<'a> {
    fn from(input: &'a CreateMeasurement) -> Self {
        Self {
            study_instance_uid: &input.study_instance_uid,
            series_instance_uid: &input.series_instance_uid,
            sop_instance_uid: &input.sop_instance_uid,
            image_id: input.image_id.as_deref(),
            frame_index: input.frame_index,
            measurement_type: input.measurement_type,
            tool_name: &input.tool_name,
            label: input.label.as_deref(),
            value: input.value,
            unit: input.unit.as_deref(),
            points_json: encode_points(&input.points),
            roi_stats_json: encode_roi_stats(input.roi_stats.as_ref()),
            color: input.color.as_deref(),
            visible: input.visible,
            created_by: input.created_by.as_deref(),
        }
    }
}

/// Request body for `PUT /measurements/{id}`. Absent fields are left
/// unchanged by the backend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi_stats_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'a str>,
    pub visible: bool,
}

impl<'a> From<&'a UpdateMeasurement> for MeasurementPatch<'a> {
    fn from(input: &'a UpdateMeasurement) -> Self {
        Self {
            label: input.label.as_deref(),
            value: input.value,
            points_json: input.points.as_deref().and_then(encode_points),
            roi_stats_json: encode_roi_stats(input.roi_stats.as_ref()),
            color: input.color.as_deref(),
            visible: input.visible,
        }
    }
}

fn encode_roi_stats(stats: Option<&RoiStats>) -> Option<String> {
    stats.and_then(|stats| best_effort(blob::encode_roi_stats(stats), None))
}

/// `{studyInstanceUid|seriesInstanceUid|sopInstanceUid, count, measurements}`.
#[derive(Debug, Deserialize)]
pub struct MeasurementList {
    pub measurements: Vec<serde_json::Value>,
}

impl MeasurementList {
    pub fn into_records(self) -> Vec<Measurement> {
        decode_rows::<MeasurementRow, _>(self.measurements, "measurement")
    }
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

/// An annotation as the backend returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRow {
    pub id: RecordId,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub image_id: Option<String>,
    pub frame_index: Option<u32>,
    pub annotation_type: AnnotationType,
    pub tool_name: String,
    pub text: Option<String>,
    pub points_json: Option<String>,
    pub style_json: Option<String>,
    pub color: Option<String>,
    pub font_size: Option<i32>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AnnotationRow> for Annotation {
    fn from(row: AnnotationRow) -> Self {
        let points = decode_points(row.points_json.as_deref(), row.id);
        let style = row
            .style_json
            .as_deref()
            .and_then(|raw| best_effort(blob::decode_style(raw), Some(row.id)));

        Self {
            id: row.id,
            study_instance_uid: row.study_instance_uid,
            series_instance_uid: row.series_instance_uid,
            sop_instance_uid: row.sop_instance_uid,
            image_id: row.image_id,
            frame_index: row.frame_index.unwrap_or(0),
            annotation_type: row.annotation_type,
            tool_name: row.tool_name,
            text: row.text,
            points,
            style,
            color: row.color,
            font_size: row.font_size,
            visible: row.visible,
            locked: row.locked,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request body for `POST /annotations`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationBody<'a> {
    pub study_instance_uid: &'a str,
    pub series_instance_uid: &'a str,
    pub sop_instance_uid: &'a str,
    pub image_id: Option<&'a str>,
    pub frame_index: u32,
    pub annotation_type: AnnotationType,
    pub tool_name: &'a str,
    pub text: Option<&'a str>,
    pub points_json: Option<String>,
    pub style_json: Option<String>,
    pub color: Option<&'a str>,
    pub font_size: Option<i32>,
    pub visible: bool,
    pub locked: bool,
    pub created_by: Option<&'a str>,
}

impl<'a> From<&'a CreateAnnotation> for AnnotationBody<'a> {
    fn from(input: &'a CreateAnnotation) -> Self {
        Self {
            study_instance_uid: &input.study_instance_uid,
            series_instance_uid: &input.series_instance_uid,
            sop_instance_uid: &input.sop_instance_uid,
            image_id: input.image_id.as_deref(),
            frame_index: input.frame_index,
            annotation_type: input.annotation_type,
            tool_name: &input.tool_name,
            text: input.text.as_deref(),
            points_json: encode_points(&input.points),
            style_json: encode_style(input.style.as_ref()),
            color: input.color.as_deref(),
            font_size: input.font_size,
            visible: input.visible,
            locked: input.locked,
            created_by: input.created_by.as_deref(),
        }
    }
}

/// Request body for `PUT /annotations/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i32>,
    pub visible: bool,
    pub locked: bool,
}

impl<'a> From<&'a UpdateAnnotation> for AnnotationPatch<'a> {
    fn from(input: &'a UpdateAnnotation) -> Self {
        Self {
            text: input.text.as_deref(),
            points_json: input.points.as_deref().and_then(encode_points),
            style_json: encode_style(input.style.as_ref()),
            color: input.color.as_deref(),
            font_size: input.font_size,
            visible: input.visible,
            locked: input.locked,
        }
    }
}

fn encode_style(style: Option<&AnnotationStyle>) -> Option<String> {
    style.and_then(|style| best_effort(blob::encode_style(style), None))
}

/// `{…Uid, count, annotations}`.
#[derive(Debug, Deserialize)]
pub struct AnnotationList {
    pub annotations: Vec<serde_json::Value>,
}

impl AnnotationList {
    pub fn into_records(self) -> Vec<Annotation> {
        decode_rows::<AnnotationRow, _>(self.annotations, "annotation")
    }
}

// ---------------------------------------------------------------------------
// Key images
// ---------------------------------------------------------------------------

/// `{…Uid, count, keyImages}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyImageList {
    pub key_images: Vec<serde_json::Value>,
}

impl KeyImageList {
    pub fn into_records(self) -> Vec<KeyImage> {
        decode_rows::<KeyImage, _>(self.key_images, "key image")
    }
}

/// Response of `GET /key-images/check`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyImageCheck {
    pub is_key_image: bool,
}
