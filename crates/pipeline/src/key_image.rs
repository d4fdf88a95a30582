//! Key-Image Toggle: flip the presence of a key image on one frame.

use std::sync::Arc;

use radmark_client::{ApiError, KeyImageStore};
use radmark_core::{CreateKeyImage, DisplayState, KeyImageKey, ToggleOutcome};

pub struct KeyImageToggle {
    store: Arc<dyn KeyImageStore>,
}

impl KeyImageToggle {
    pub fn new(store: Arc<dyn KeyImageStore>) -> Self {
        Self { store }
    }

    /// Remove the key image at `key` if one exists, otherwise create one
    /// carrying `display`.
    ///
    /// Only an exact (study, series, instance, frame) match counts as
    /// existing; key images on other frames of the instance are untouched.
    pub async fn toggle(
        &self,
        key: &KeyImageKey,
        display: DisplayState,
    ) -> Result<ToggleOutcome, ApiError> {
        let existing: Vec<_> = self
            .store
            .list_by_instance(&key.sop_instance_uid)
            .await?
            .into_iter()
            .filter(|key_image| key_image.key() == *key)
            .collect();

        if existing.is_empty() {
            let created = self.store.create(&CreateKeyImage::new(key.clone(), display)).await?;
            tracing::info!(
                key_image_id = %created.id,
                sop_uid = %key.sop_instance_uid,
                frame_index = key.frame_index,
                "Key image added",
            );
            return Ok(ToggleOutcome::added(created));
        }

        for key_image in &existing {
            self.store.delete(key_image.id).await?;
        }
        tracing::info!(
            sop_uid = %key.sop_instance_uid,
            frame_index = key.frame_index,
            removed = existing.len(),
            "Key image removed",
        );
        Ok(ToggleOutcome::removed())
    }

    /// Whether a key image exists at `key`.
    pub async fn is_key_image(&self, key: &KeyImageKey) -> Result<bool, ApiError> {
        let key_images = self.store.list_by_instance(&key.sop_instance_uid).await?;
        Ok(key_images.iter().any(|key_image| key_image.key() == *key))
    }
}
