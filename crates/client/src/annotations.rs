//! Annotation endpoints (`/annotations`).

use radmark_core::{Annotation, CreateAnnotation, RecordId, UpdateAnnotation};

use crate::api::{ApiError, CountResponse, MarkupApi};
use crate::wire::{AnnotationBody, AnnotationList, AnnotationPatch, AnnotationRow};

fn into_annotations(list: AnnotationList) -> Vec<Annotation> {
    list.into_records()
}

impl MarkupApi {
    /// `POST /annotations`.
    pub async fn create_annotation(
        &self,
        input: &CreateAnnotation,
    ) -> Result<Annotation, ApiError> {
        let response = self
            .http()
            .post(self.url("/annotations"))
            .json(&AnnotationBody::from(input))
            .send()
            .await?;

        let row: AnnotationRow = Self::parse_response(response).await?;
        Ok(row.into())
    }

    /// `GET /annotations/{id}`. Returns `None` on `404`.
    pub async fn get_annotation(&self, id: RecordId) -> Result<Option<Annotation>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/annotations/{id}")))
            .send()
            .await?;

        let row: Option<AnnotationRow> = Self::parse_optional(response).await?;
        Ok(row.map(Annotation::from))
    }

    /// `PUT /annotations/{id}`.
    pub async fn update_annotation(
        &self,
        id: RecordId,
        input: &UpdateAnnotation,
    ) -> Result<Annotation, ApiError> {
        let response = self
            .http()
            .put(self.url(&format!("/annotations/{id}")))
            .json(&AnnotationPatch::from(input))
            .send()
            .await?;

        let row: AnnotationRow = Self::parse_response(response).await?;
        Ok(row.into())
    }

    /// `DELETE /annotations/{id}`.
    pub async fn delete_annotation(&self, id: RecordId) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/annotations/{id}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `GET /annotations/study/{studyUid}?visibleOnly=`.
    pub async fn list_annotations_by_study(
        &self,
        study_uid: &str,
        visible_only: bool,
    ) -> Result<Vec<Annotation>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/annotations/study/{study_uid}")))
            .query(&[("visibleOnly", visible_only)])
            .send()
            .await?;

        let list: AnnotationList = Self::parse_response(response).await?;
        Ok(into_annotations(list))
    }

    /// `GET /annotations/series/{seriesUid}`.
    pub async fn list_annotations_by_series(
        &self,
        series_uid: &str,
    ) -> Result<Vec<Annotation>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/annotations/series/{series_uid}")))
            .send()
            .await?;

        let list: AnnotationList = Self::parse_response(response).await?;
        Ok(into_annotations(list))
    }

    /// `GET /annotations/instance/{sopUid}?frameIndex=`. Without a frame
    /// index every frame of the instance is returned.
    pub async fn list_annotations_by_instance(
        &self,
        sop_uid: &str,
        frame_index: Option<u32>,
    ) -> Result<Vec<Annotation>, ApiError> {
        let mut request = self
            .http()
            .get(self.url(&format!("/annotations/instance/{sop_uid}")));
        if let Some(frame_index) = frame_index {
            request = request.query(&[("frameIndex", frame_index)]);
        }

        let response = request.send().await?;
        let list: AnnotationList = Self::parse_response(response).await?;
        Ok(into_annotations(list))
    }

    /// `POST /annotations/{id}/toggle-visibility`.
    pub async fn toggle_annotation_visibility(
        &self,
        id: RecordId,
    ) -> Result<Annotation, ApiError> {
        let response = self
            .http()
            .post(self.url(&format!("/annotations/{id}/toggle-visibility")))
            .send()
            .await?;

        let row: AnnotationRow = Self::parse_response(response).await?;
        Ok(row.into())
    }

    /// `DELETE /annotations/study/{studyUid}`.
    pub async fn delete_annotations_by_study(&self, study_uid: &str) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/annotations/study/{study_uid}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `DELETE /annotations/series/{seriesUid}`.
    pub async fn delete_annotations_by_series(&self, series_uid: &str) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/annotations/series/{series_uid}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `DELETE /annotations/instance/{sopUid}`.
    pub async fn delete_annotations_by_instance(&self, sop_uid: &str) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/annotations/instance/{sop_uid}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `GET /annotations/study/{studyUid}/count`.
    pub async fn count_annotations_by_study(&self, study_uid: &str) -> Result<i64, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/annotations/study/{study_uid}/count")))
            .send()
            .await?;

        let body: CountResponse = Self::parse_response(response).await?;
        Ok(body.count)
    }

    /// `POST /annotations/{id}/toggle-lock`.
    pub async fn toggle_annotation_lock(&self, id: RecordId) -> Result<Annotation, ApiError> {
        let response = self
            .http()
            .post(self.url(&format!("/annotations/{id}/toggle-lock")))
            .send()
            .await?;

        let row: AnnotationRow = Self::parse_response(response).await?;
        Ok(row.into())
    }
}
