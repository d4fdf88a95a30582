//! Key-image record, DTOs and toggle outcome.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, Timestamp};

/// A frame flagged as significant, with the display state at marking time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyImage {
    pub id: RecordId,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub image_id: Option<String>,
    #[serde(default)]
    pub frame_index: u32,
    pub instance_number: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub window_width: Option<f64>,
    pub window_center: Option<f64>,
    pub thumbnail_path: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl KeyImage {
    pub fn key(&self) -> KeyImageKey {
        KeyImageKey {
            study_instance_uid: self.study_instance_uid.clone(),
            series_instance_uid: self.series_instance_uid.clone(),
            sop_instance_uid: self.sop_instance_uid.clone(),
            frame_index: self.frame_index,
        }
    }
}

/// The identity a key image is toggled on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyImageKey {
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub frame_index: u32,
}

/// Display state captured when a frame is marked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub image_id: Option<String>,
    pub instance_number: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub window_width: Option<f64>,
    pub window_center: Option<f64>,
}

/// DTO for creating a new key image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyImage {
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    pub image_id: Option<String>,
    pub frame_index: u32,
    pub instance_number: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub window_width: Option<f64>,
    pub window_center: Option<f64>,
    pub thumbnail_path: Option<String>,
    pub created_by: Option<String>,
}

impl CreateKeyImage {
    pub fn new(key: KeyImageKey, display: DisplayState) -> Self {
        Self {
            study_instance_uid: key.study_instance_uid,
            series_instance_uid: key.series_instance_uid,
            sop_instance_uid: key.sop_instance_uid,
            image_id: display.image_id,
            frame_index: key.frame_index,
            instance_number: display.instance_number,
            description: display.description,
            category: display.category,
            window_width: display.window_width,
            window_center: display.window_center,
            thumbnail_path: None,
            created_by: None,
        }
    }

    pub fn key(&self) -> KeyImageKey {
        KeyImageKey {
            study_instance_uid: self.study_instance_uid.clone(),
            series_instance_uid: self.series_instance_uid.clone(),
            sop_instance_uid: self.sop_instance_uid.clone(),
            frame_index: self.frame_index,
        }
    }
}

/// DTO for updating a key image. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKeyImage {
    pub description: Option<String>,
    pub category: Option<String>,
    pub window_width: Option<f64>,
    pub window_center: Option<f64>,
}

/// Which way a presence toggle went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

/// Result of toggling a key image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    pub is_key_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_image: Option<KeyImage>,
}

impl ToggleOutcome {
    pub fn added(key_image: KeyImage) -> Self {
        Self {
            action: ToggleAction::Added,
            is_key_image: true,
            key_image: Some(key_image),
        }
    }

    pub fn removed() -> Self {
        Self {
            action: ToggleAction::Removed,
            is_key_image: false,
            key_image: None,
        }
    }
}
