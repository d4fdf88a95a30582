//! Persistence seams consumed by the pipeline.
//!
//! The capture, restore and key-image paths only need a handful of
//! operations per record kind. They depend on these traits rather than on
//! [`MarkupApi`] directly so the pipeline can run against any store.

use async_trait::async_trait;
use radmark_core::{
    Annotation, CreateAnnotation, CreateKeyImage, CreateMeasurement, KeyImage, Measurement,
    RecordId,
};

use crate::api::{ApiError, MarkupApi};

/// Measurement persistence.
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    async fn create(&self, input: &CreateMeasurement) -> Result<Measurement, ApiError>;

    /// Every measurement of a study, visible or not.
    async fn list_by_study(&self, study_uid: &str) -> Result<Vec<Measurement>, ApiError>;
}

/// Annotation persistence.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    async fn create(&self, input: &CreateAnnotation) -> Result<Annotation, ApiError>;

    /// Every annotation of a study, visible or not.
    async fn list_by_study(&self, study_uid: &str) -> Result<Vec<Annotation>, ApiError>;
}

/// Key-image persistence.
#[async_trait]
pub trait KeyImageStore: Send + Sync {
    /// Key images on any frame of an instance.
    async fn list_by_instance(&self, sop_uid: &str) -> Result<Vec<KeyImage>, ApiError>;

    async fn create(&self, input: &CreateKeyImage) -> Result<KeyImage, ApiError>;

    async fn delete(&self, id: RecordId) -> Result<(), ApiError>;
}

#[async_trait]
impl MeasurementStore for MarkupApi {
    async fn create(&self, input: &CreateMeasurement) -> Result<Measurement, ApiError> {
        self.create_measurement(input).await
    }

    async fn list_by_study(&self, study_uid: &str) -> Result<Vec<Measurement>, ApiError> {
        self.list_measurements_by_study(study_uid, false).await
    }
}

#[async_trait]
impl AnnotationStore for MarkupApi {
    async fn create(&self, input: &CreateAnnotation) -> Result<Annotation, ApiError> {
        self.create_annotation(input).await
    }

    async fn list_by_study(&self, study_uid: &str) -> Result<Vec<Annotation>, ApiError> {
        self.list_annotations_by_study(study_uid, false).await
    }
}

#[async_trait]
impl KeyImageStore for MarkupApi {
    async fn list_by_instance(&self, sop_uid: &str) -> Result<Vec<KeyImage>, ApiError> {
        self.list_key_images_by_instance(sop_uid).await
    }

    async fn create(&self, input: &CreateKeyImage) -> Result<KeyImage, ApiError> {
        self.create_key_image(input).await
    }

    async fn delete(&self, id: RecordId) -> Result<(), ApiError> {
        self.delete_key_image(id).await
    }
}
