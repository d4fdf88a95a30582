//! Measurement endpoints (`/measurements`).

use radmark_core::{CreateMeasurement, Measurement, RecordId, UpdateMeasurement};

use crate::api::{ApiError, CountResponse, MarkupApi};
use crate::wire::{MeasurementBody, MeasurementList, MeasurementPatch, MeasurementRow};

fn into_measurements(list: MeasurementList) -> Vec<Measurement> {
    list.into_records()
}

impl MarkupApi {
    /// `POST /measurements`.
    pub async fn create_measurement(
        &self,
        input: &CreateMeasurement,
    ) -> Result<Measurement, ApiError> {
        let response = self
            .http()
            .post(self.url("/measurements"))
            .json(&MeasurementBody::from(input))
            .send()
            .await?;

        let row: MeasurementRow = Self::parse_response(response).await?;
        Ok(row.into())
    }

    /// `GET /measurements/{id}`. Returns `None` on `404`.
    pub async fn get_measurement(&self, id: RecordId) -> Result<Option<Measurement>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/measurements/{id}")))
            .send()
            .await?;

        let row: Option<MeasurementRow> = Self::parse_optional(response).await?;
        Ok(row.map(Measurement::from))
    }

    /// `PUT /measurements/{id}`.
    pub async fn update_measurement(
        &self,
        id: RecordId,
        input: &UpdateMeasurement,
    ) -> Result<Measurement, ApiError> {
        let response = self
            .http()
            .put(self.url(&format!("/measurements/{id}")))
            .json(&MeasurementPatch::from(input))
            .send()
            .await?;

        let row: MeasurementRow = Self::parse_response(response).await?;
        Ok(row.into())
    }

    /// `DELETE /measurements/{id}`.
    pub async fn delete_measurement(&self, id: RecordId) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/measurements/{id}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `GET /measurements/study/{studyUid}?visibleOnly=`.
    pub async fn list_measurements_by_study(
        &self,
        study_uid: &str,
        visible_only: bool,
    ) -> Result<Vec<Measurement>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/measurements/study/{study_uid}")))
            .query(&[("visibleOnly", visible_only)])
            .send()
            .await?;

        let list: MeasurementList = Self::parse_response(response).await?;
        Ok(into_measurements(list))
    }

    /// `GET /measurements/series/{seriesUid}`.
    pub async fn list_measurements_by_series(
        &self,
        series_uid: &str,
    ) -> Result<Vec<Measurement>, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/measurements/series/{series_uid}")))
            .send()
            .await?;

        let list: MeasurementList = Self::parse_response(response).await?;
        Ok(into_measurements(list))
    }

    /// `GET /measurements/instance/{sopUid}?frameIndex=`. Without a frame
    /// index every frame of the instance is returned.
    pub async fn list_measurements_by_instance(
        &self,
        sop_uid: &str,
        frame_index: Option<u32>,
    ) -> Result<Vec<Measurement>, ApiError> {
        let mut request = self
            .http()
            .get(self.url(&format!("/measurements/instance/{sop_uid}")));
        if let Some(frame_index) = frame_index {
            request = request.query(&[("frameIndex", frame_index)]);
        }

        let response = request.send().await?;
        let list: MeasurementList = Self::parse_response(response).await?;
        Ok(into_measurements(list))
    }

    /// `POST /measurements/{id}/toggle-visibility`.
    pub async fn toggle_measurement_visibility(
        &self,
        id: RecordId,
    ) -> Result<Measurement, ApiError> {
        let response = self
            .http()
            .post(self.url(&format!("/measurements/{id}/toggle-visibility")))
            .send()
            .await?;

        let row: MeasurementRow = Self::parse_response(response).await?;
        Ok(row.into())
    }

    /// `DELETE /measurements/study/{studyUid}`.
    pub async fn delete_measurements_by_study(&self, study_uid: &str) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/measurements/study/{study_uid}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `DELETE /measurements/series/{seriesUid}`.
    pub async fn delete_measurements_by_series(&self, series_uid: &str) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/measurements/series/{series_uid}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `DELETE /measurements/instance/{sopUid}`.
    pub async fn delete_measurements_by_instance(&self, sop_uid: &str) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/measurements/instance/{sop_uid}")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// `GET /measurements/study/{studyUid}/count`.
    pub async fn count_measurements_by_study(&self, study_uid: &str) -> Result<i64, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/measurements/study/{study_uid}/count")))
            .send()
            .await?;

        let body: CountResponse = Self::parse_response(response).await?;
        Ok(body.count)
    }
}
