//! Annotation record and DTOs.

use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;
use crate::locator::ImageLocator;
use crate::markup::AnnotationStyle;
use crate::tool::AnnotationType;
use crate::types::{RecordId, Timestamp};

/// A persisted qualitative markup.
///
/// A locked annotation still accepts visibility toggles; rejecting geometry
/// edits on it is up to the editing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: RecordId,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub image_id: Option<String>,
    pub frame_index: u32,
    pub annotation_type: AnnotationType,
    pub tool_name: String,
    pub text: Option<String>,
    pub points: Vec<Point3D>,
    pub style: Option<AnnotationStyle>,
    pub color: Option<String>,
    pub font_size: Option<i32>,
    pub visible: bool,
    pub locked: bool,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Annotation {
    /// Locator of the frame this annotation was drawn on.
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

/// DTO for creating a new annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnotation {
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub image_id: Option<String>,
    pub frame_index: u32,
    pub annotation_type: AnnotationType,
    pub tool_name: String,
    pub text: Option<String>,
    pub points: Vec<Point3D>,
    pub style: Option<AnnotationStyle>,
    pub color: Option<String>,
    pub font_size: Option<i32>,
    pub visible: bool,
    pub locked: bool,
    pub created_by: Option<String>,
}

/// DTO for updating an annotation.
///
/// `None` leaves a field unchanged; `visible` and `locked` are always
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnotation {
    pub text: Option<String>,
    pub points: Option<Vec<Point3D>>,
    pub style: Option<AnnotationStyle>,
    pub color: Option<String>,
    pub font_size: Option<i32>,
    pub visible: bool,
    pub locked: bool,
}
