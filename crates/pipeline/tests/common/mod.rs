#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use radmark_client::{AnnotationStore, ApiError, KeyImageStore, MeasurementStore};
use radmark_core::{
    Annotation, AnnotationType, CreateAnnotation, CreateKeyImage, CreateMeasurement, KeyImage,
    MarkupData, Measurement, MeasurementType, Point3D, RecordId,
};
use radmark_pipeline::{CaptureCallbacks, PipelineConfig, ReadinessPolicy, SessionDeps};
use radmark_viewport::{MarkupCompleted, MarkupEventBus, ReadyWatch, RecordingViewport};
use serde_json::Value;

pub const STUDY: &str = "ST1";
pub const SERIES: &str = "SE1";
pub const LOCATOR: &str = "wadors:/api/wado/studies/ST1/series/SE1/instances/SOP1/frames/1";

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory backend implementing every store trait.
///
/// `fail_next_creates(n)` makes the next `n` create calls fail with a 503;
/// `fail_*_queries` makes the study list queries fail.
#[derive(Default)]
pub struct MemoryStore {
    measurements: Mutex<Vec<Measurement>>,
    annotations: Mutex<Vec<Annotation>>,
    key_images: Mutex<Vec<KeyImage>>,
    failing_creates: AtomicUsize,
    create_calls: AtomicUsize,
    create_delay: Mutex<Option<Duration>>,
    fail_measurement_queries: AtomicBool,
    fail_annotation_queries: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

fn unavailable() -> ApiError {
    ApiError::ApiError {
        status: 503,
        body: "backend unavailable".to_string(),
    }
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_creates(&self, n: usize) {
        self.failing_creates.store(n, Ordering::SeqCst);
    }

    pub fn delay_creates(&self, delay: Duration) {
        *lock(&self.create_delay) = Some(delay);
    }

    pub fn fail_measurement_queries(&self) {
        self.fail_measurement_queries.store(true, Ordering::SeqCst);
    }

    pub fn fail_annotation_queries(&self) {
        self.fail_annotation_queries.store(true, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn measurements(&self) -> Vec<Measurement> {
        lock(&self.measurements).clone()
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        lock(&self.annotations).clone()
    }

    pub fn key_images(&self) -> Vec<KeyImage> {
        lock(&self.key_images).clone()
    }

    pub fn insert_measurement(&self, measurement: Measurement) {
        lock(&self.measurements).push(measurement);
    }

    pub fn insert_annotation(&self, annotation: Annotation) {
        lock(&self.annotations).push(annotation);
    }

    pub fn insert_key_image(&self, key_image: KeyImage) {
        lock(&self.key_images).push(key_image);
    }

    /// Count the call, apply the delay and consume one injected failure.
    async fn begin_create(&self) -> Result<(), ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.create_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failing_creates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match failing {
            Ok(_) => Err(unavailable()),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl MeasurementStore for MemoryStore {
    async fn create(&self, input: &CreateMeasurement) -> Result<Measurement, ApiError> {
        self.begin_create().await?;
        let now = Utc::now();
        let measurement = Measurement {
            id: RecordId::new_v4(),
            study_instance_uid: input.study_instance_uid.clone(),
            series_instance_uid: input.series_instance_uid.clone(),
            sop_instance_uid: input.sop_instance_uid.clone(),
            image_id: input.image_id.clone(),
            frame_index: input.frame_index,
            measurement_type: input.measurement_type,
            tool_name: input.tool_name.clone(),
            label: input.label.clone(),
            value: input.value,
            unit: input.unit.clone(),
            points: input.points.clone(),
            roi_stats: input.roi_stats.clone(),
            color: input.color.clone(),
            visible: input.visible,
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.measurements).push(measurement.clone());
        Ok(measurement)
    }

    async fn list_by_study(&self, study_uid: &str) -> Result<Vec<Measurement>, ApiError> {
        if self.fail_measurement_queries.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self
            .measurements()
            .into_iter()
            .filter(|m| m.study_instance_uid == study_uid)
            .collect())
    }
}

#[async_trait]
impl AnnotationStore for MemoryStore {
    async fn create(&self, input: &CreateAnnotation) -> Result<Annotation, ApiError> {
        self.begin_create().await?;
        let now = Utc::now();
        let annotation = Annotation {
            id: RecordId::new_v4(),
            study_instance_uid: input.study_instance_uid.clone(),
            series_instance_uid: input.series_instance_uid.clone(),
            sop_instance_uid: input.sop_instance_uid.clone(),
            image_id: input.image_id.clone(),
            frame_index: input.frame_index,
            annotation_type: input.annotation_type,
            tool_name: input.tool_name.clone(),
            text: input.text.clone(),
            points: input.points.clone(),
            style: input.style.clone(),
            color: input.color.clone(),
            font_size: input.font_size,
            visible: input.visible,
            locked: input.locked,
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.annotations).push(annotation.clone());
        Ok(annotation)
    }

    async fn list_by_study(&self, study_uid: &str) -> Result<Vec<Annotation>, ApiError> {
        if self.fail_annotation_queries.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self
            .annotations()
            .into_iter()
            .filter(|a| a.study_instance_uid == study_uid)
            .collect())
    }
}

#[async_trait]
impl KeyImageStore for MemoryStore {
    async fn list_by_instance(&self, sop_uid: &str) -> Result<Vec<KeyImage>, ApiError> {
        Ok(self
            .key_images()
            .into_iter()
            .filter(|k| k.sop_instance_uid == sop_uid)
            .collect())
    }

    async fn create(&self, input: &CreateKeyImage) -> Result<KeyImage, ApiError> {
        self.begin_create().await?;
        let now = Utc::now();
        let key_image = KeyImage {
            id: RecordId::new_v4(),
            study_instance_uid: input.study_instance_uid.clone(),
            series_instance_uid: input.series_instance_uid.clone(),
            sop_instance_uid: input.sop_instance_uid.clone(),
            image_id: input.image_id.clone(),
            frame_index: input.frame_index,
            instance_number: input.instance_number,
            description: input.description.clone(),
            category: input.category.clone(),
            window_width: input.window_width,
            window_center: input.window_center,
            thumbnail_path: input.thumbnail_path.clone(),
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.key_images).push(key_image.clone());
        Ok(key_image)
    }

    async fn delete(&self, id: RecordId) -> Result<(), ApiError> {
        let mut key_images = lock(&self.key_images);
        let before = key_images.len();
        key_images.retain(|k| k.id != id);
        if key_images.len() == before {
            return Err(ApiError::NotFound(format!("KeyImage {id}")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Readiness policy with short intervals so tests stay fast.
pub fn fast_policy() -> ReadinessPolicy {
    ReadinessPolicy {
        poll_interval: Duration::from_millis(10),
        max_polls: 5,
        fallback_delay: Duration::from_millis(10),
    }
}

pub fn deps(
    bus: Arc<MarkupEventBus>,
    store: Arc<MemoryStore>,
    viewport: Arc<RecordingViewport>,
    readiness: Option<ReadyWatch>,
) -> SessionDeps {
    SessionDeps {
        bus,
        measurements: store.clone(),
        annotations: store,
        viewport,
        readiness,
        callbacks: CaptureCallbacks::default(),
        config: PipelineConfig {
            readiness: fast_policy(),
            ..PipelineConfig::default()
        },
    }
}

/// A completion event on [`LOCATOR`] with raw tool data.
pub fn event(markup_uid: &str, tool_kind: &str, data: Value) -> MarkupCompleted {
    MarkupCompleted::new(markup_uid, tool_kind, MarkupData::from_value(&data), LOCATOR)
}

pub fn length_event(markup_uid: &str) -> MarkupCompleted {
    event(
        markup_uid,
        "Length",
        serde_json::json!({
            "handles": {"start": [10, 20, 0], "end": [50, 20, 0]},
            "cachedStats": {LOCATOR: {"length": 40.0}}
        }),
    )
}

pub fn stored_measurement(tool_name: &str, points: Vec<Point3D>, visible: bool) -> Measurement {
    let now = Utc::now();
    Measurement {
        id: RecordId::new_v4(),
        study_instance_uid: STUDY.to_string(),
        series_instance_uid: SERIES.to_string(),
        sop_instance_uid: "SOP1".to_string(),
        image_id: Some(LOCATOR.to_string()),
        frame_index: 0,
        measurement_type: MeasurementType::Length,
        tool_name: tool_name.to_string(),
        label: None,
        value: None,
        unit: None,
        points,
        roi_stats: None,
        color: None,
        visible,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn stored_annotation(tool_name: &str, points: Vec<Point3D>, visible: bool) -> Annotation {
    let now = Utc::now();
    Annotation {
        id: RecordId::new_v4(),
        study_instance_uid: STUDY.to_string(),
        series_instance_uid: SERIES.to_string(),
        sop_instance_uid: "SOP1".to_string(),
        image_id: Some(LOCATOR.to_string()),
        frame_index: 0,
        annotation_type: AnnotationType::Arrow,
        tool_name: tool_name.to_string(),
        text: Some("note".to_string()),
        points,
        style: None,
        color: None,
        font_size: None,
        visible,
        locked: false,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn two_points() -> Vec<Point3D> {
    vec![Point3D::new(1.0, 2.0, 0.0), Point3D::new(3.0, 4.0, 0.0)]
}

/// Poll `condition` until it holds or one second passes.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
