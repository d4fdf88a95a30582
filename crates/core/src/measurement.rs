//! Measurement record and DTOs.

use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;
use crate::locator::ImageLocator;
use crate::stats::RoiStats;
use crate::tool::MeasurementType;
use crate::types::{RecordId, Timestamp};

/// A persisted quantitative markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: RecordId,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub image_id: Option<String>,
    pub frame_index: u32,
    pub measurement_type: MeasurementType,
    pub tool_name: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub points: Vec<Point3D>,
    pub roi_stats: Option<RoiStats>,
    pub color: Option<String>,
    pub visible: bool,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Measurement {
    /// Locator of the frame this measurement was drawn on.
    pub fn locator(&self, base: &str) -> ImageLocator {
        ImageLocator::new(
            base,
            &self.study_instance_uid,
            &self.series_instance_uid,
            &self.sop_instance_uid,
            self.frame_index,
        )
    }
}

/// DTO for creating a new measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeasurement {
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub image_id: Option<String>,
    pub frame_index: u32,
    pub measurement_type: MeasurementType,
    pub tool_name: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub points: Vec<Point3D>,
    pub roi_stats: Option<RoiStats>,
    pub color: Option<String>,
    pub visible: bool,
    pub created_by: Option<String>,
}

/// DTO for updating a measurement.
///
/// `None` leaves a field unchanged; `visible` is always written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeasurement {
    pub label: Option<String>,
    pub value: Option<f64>,
    pub points: Option<Vec<Point3D>>,
    pub roi_stats: Option<RoiStats>,
    pub color: Option<String>,
    pub visible: bool,
}
