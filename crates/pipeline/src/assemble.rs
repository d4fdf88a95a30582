//! Canonical record assembly from a completed markup.
//!
//! Everything here is synchronous. A markup that yields no points produces
//! `None` and is dropped by the caller.

use radmark_core::{
    AnnotationTool, CreateAnnotation, CreateMeasurement, MarkupData, MeasurementTool,
    ParsedLocator,
};

/// The frame a markup was drawn on, resolved from the study context and the
/// event's locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTarget {
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub frame_index: u32,
    /// The locator exactly as the viewport reported it.
    pub image_id: String,
}

impl FrameTarget {
    pub fn new(
        study_instance_uid: &str,
        series_instance_uid: &str,
        image_locator: &str,
        parsed: ParsedLocator,
    ) -> Self {
        Self {
            study_instance_uid: study_instance_uid.to_string(),
            series_instance_uid: series_instance_uid.to_string(),
            sop_instance_uid: parsed.sop_instance_uid,
            frame_index: parsed.frame_index,
            image_id: image_locator.to_string(),
        }
    }
}

/// Build a measurement create request.
pub fn measurement(
    tool: MeasurementTool,
    target: &FrameTarget,
    data: &MarkupData,
) -> Option<CreateMeasurement> {
    let points = data.points();
    if points.is_empty() {
        return None;
    }

    let (value, unit) = match data.scalar_value() {
        Some(scalar) => (Some(scalar.value), Some(scalar.unit.to_string())),
        None => (None, None),
    };

    Some(CreateMeasurement {
        study_instance_uid: target.study_instance_uid.clone(),
        series_instance_uid: target.series_instance_uid.clone(),
        sop_instance_uid: target.sop_instance_uid.clone(),
        image_id: Some(target.image_id.clone()),
        frame_index: target.frame_index,
        measurement_type: tool.measurement_type(),
        tool_name: tool.name().to_string(),
        label: data.label.clone(),
        value,
        unit,
        points,
        roi_stats: data.roi_stats(),
        color: data.color.clone(),
        visible: true,
        created_by: None,
    })
}

/// Build an annotation create request. Fresh annotations are never locked.
pub fn annotation(
    tool: AnnotationTool,
    target: &FrameTarget,
    data: &MarkupData,
) -> Option<CreateAnnotation> {
    let points = data.points();
    if points.is_empty() {
        return None;
    }

    Some(CreateAnnotation {
        study_instance_uid: target.study_instance_uid.clone(),
        series_instance_uid: target.series_instance_uid.clone(),
        sop_instance_uid: target.sop_instance_uid.clone(),
        image_id: Some(target.image_id.clone()),
        frame_index: target.frame_index,
        annotation_type: tool.annotation_type(),
        tool_name: tool.name().to_string(),
        text: data.extract_text(),
        points,
        style: data.style.clone(),
        color: data.color.clone(),
        font_size: None,
        visible: true,
        locked: false,
        created_by: None,
    })
}
