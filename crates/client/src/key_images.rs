//! Key-image endpoints (`/key-images`).

use radmark_core::{CreateKeyImage, KeyImage, RecordId, ToggleOutcome, UpdateKeyImage};

use crate::api::{ApiError, CountResponse, MarkupApi};
use crate::wire::{KeyImageCheck, KeyImageList};

impl MarkupApi {
    /// `POST /key-images`. The backend rejects a second key image for the
    /// same instance and frame with a `400`.
    pub async fn create_key_image(&self, input: &CreateKeyImage) -> Result<KeyImage, ApiError> {
        let response = self
            .http()
            .post(self.url("/key-images"))
            .json(input)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `POST /key-images/toggle`: server-side presence flip.
    pub async fn toggle_key_image(
        &self,
        input: &CreateKeyImage,
    ) -> Result<ToggleOutcome, ApiError> {
        let response = self
            .http()
            .post(self.url("/key-images/toggle"))
            .json(input)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /key-images/{id}`. Returns `None` on `404`.
    pub async fn get_key_image(&self, id: RecordId) -> Result<Option<KeyImage>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/key-images/{id}")))
            .send()
            .await?;

        Self::parse_optional(response).await
    }

    /// `PUT /key-images/{id}`.
    pub async fn update_key_image(
        &self,
        id: RecordId,
        input: &UpdateKeyImage,
    ) -> Result<KeyImage, ApiError> {
        let response = self
            .http()
            .put(self.url(&format!("/key-images/{id}")))
            .json(input)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `DELETE /key-images/{id}`.
    pub async fn delete_key_image(&self, id: RecordId) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/key-images/{id}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `GET /key-images/study/{studyUid}?category=`.
    pub async fn list_key_images_by_study(
        &self,
        study_uid: &str,
        category: Option<&str>,
    ) -> Result<Vec<KeyImage>, ApiError> {
        let mut request = self
            .http()
            .get(self.url(&format!("/key-images/study/{study_uid}")));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }

        let response = request.send().await?;
        let list: KeyImageList = Self::parse_response(response).await?;
        Ok(list.into_records())
    }

    /// `GET /key-images/series/{seriesUid}`.
    pub async fn list_key_images_by_series(
        &self,
        series_uid: &str,
    ) -> Result<Vec<KeyImage>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/key-images/series/{series_uid}")))
            .send()
            .await?;

        let list: KeyImageList = Self::parse_response(response).await?;
        Ok(list.into_records())
    }

    /// `GET /key-images/instance/{sopUid}`: every frame of the instance.
    pub async fn list_key_images_by_instance(
        &self,
        sop_uid: &str,
    ) -> Result<Vec<KeyImage>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/key-images/instance/{sop_uid}")))
            .send()
            .await?;

        let list: KeyImageList = Self::parse_response(response).await?;
        Ok(list.into_records())
    }

    /// `GET /key-images/check?sopInstanceUid=&frameIndex=`.
    pub async fn is_key_image(&self, sop_uid: &str, frame_index: u32) -> Result<bool, ApiError> {
        let response = self
            .http()
            .get(self.url("/key-images/check"))
            .query(&[
                ("sopInstanceUid", sop_uid.to_string()),
                ("frameIndex", frame_index.to_string()),
            ])
            .send()
            .await?;

        let body: KeyImageCheck = Self::parse_response(response).await?;
        Ok(body.is_key_image)
    }

    /// `DELETE /key-images/instance/{sopUid}?frameIndex=`.
    pub async fn delete_key_image_by_instance(
        &self,
        sop_uid: &str,
        frame_index: u32,
    ) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/key-images/instance/{sop_uid}")))
            .query(&[("frameIndex", frame_index)])
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `DELETE /key-images/study/{studyUid}`.
    pub async fn delete_key_images_by_study(&self, study_uid: &str) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/key-images/study/{study_uid}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `GET /key-images/study/{studyUid}/count`.
    pub async fn count_key_images_by_study(&self, study_uid: &str) -> Result<i64, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/key-images/study/{study_uid}/count")))
            .send()
            .await?;

        let body: CountResponse = Self::parse_response(response).await?;
        Ok(body.count)
    }
}
