//! Capture Listener.
//!
//! [`CaptureListener`] consumes [`MarkupCompleted`] events for one study,
//! turns each supported markup into a canonical record and persists it.
//! Each markup UID is persisted at most once per listener: UIDs are claimed
//! as in-flight before the create call, committed on success and released
//! on failure so a re-fired completion event can retry.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use radmark_client::{AnnotationStore, ApiError, MeasurementStore};
use radmark_core::tool::{self, ToolClass};
use radmark_core::{
    locator, Annotation, CreateAnnotation, CreateMeasurement, LocatorError, Measurement, RecordId,
};
use radmark_viewport::MarkupCompleted;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::assemble::{self, FrameTarget};

// ---------------------------------------------------------------------------
// Context and outcomes
// ---------------------------------------------------------------------------

/// The study (and currently selected series) a listener captures for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureContext {
    pub study_instance_uid: String,
    pub series_instance_uid: Option<String>,
}

impl CaptureContext {
    pub fn new(study_instance_uid: impl Into<String>) -> Self {
        Self {
            study_instance_uid: study_instance_uid.into(),
            series_instance_uid: None,
        }
    }

    pub fn with_series(mut self, series_instance_uid: impl Into<String>) -> Self {
        self.series_instance_uid = Some(series_instance_uid.into());
        self
    }
}

/// A record created from a captured markup.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedRecord {
    Measurement(Measurement),
    Annotation(Annotation),
}

impl CapturedRecord {
    pub fn id(&self) -> RecordId {
        match self {
            Self::Measurement(m) => m.id,
            Self::Annotation(a) => a.id,
        }
    }
}

/// Why an event did not lead to a create call.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The tool is in neither the measurement nor the annotation partition.
    UnsupportedTool,
    /// No series is selected.
    NoSeries,
    /// The markup was already persisted by this listener.
    AlreadyCaptured,
    /// A create call for the markup is still running.
    InFlight,
    BadLocator(LocatorError),
    /// The markup produced no points.
    NoPoints,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Persisted(CapturedRecord),
    Skipped(SkipReason),
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to persist {tool_kind} markup {markup_uid}: {source}")]
    Persist {
        markup_uid: String,
        tool_kind: String,
        source: ApiError,
    },
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

pub type SavedCallback = Arc<dyn Fn(&CapturedRecord) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&CaptureError) + Send + Sync>;

/// Optional hooks fired after each persistence attempt.
#[derive(Clone, Default)]
pub struct CaptureCallbacks {
    pub on_saved: Option<SavedCallback>,
    pub on_error: Option<ErrorCallback>,
}

// ---------------------------------------------------------------------------
// CaptureListener
// ---------------------------------------------------------------------------

#[derive(Default)]
struct DedupState {
    captured: HashSet<String>,
    in_flight: HashSet<String>,
}

enum PendingCreate {
    Measurement(CreateMeasurement),
    Annotation(CreateAnnotation),
}

/// A claimed markup, ready to be persisted.
struct PendingCapture {
    markup_uid: String,
    tool_kind: String,
    create: PendingCreate,
}

/// Per-study capture state. Dropping the listener discards its dedup set.
pub struct CaptureListener {
    study_instance_uid: String,
    series_instance_uid: Mutex<Option<String>>,
    measurements: Arc<dyn MeasurementStore>,
    annotations: Arc<dyn AnnotationStore>,
    callbacks: CaptureCallbacks,
    dedup: Mutex<DedupState>,
}

impl CaptureListener {
    pub fn new(
        context: CaptureContext,
        measurements: Arc<dyn MeasurementStore>,
        annotations: Arc<dyn AnnotationStore>,
    ) -> Self {
        Self {
            study_instance_uid: context.study_instance_uid,
            series_instance_uid: Mutex::new(context.series_instance_uid),
            measurements,
            annotations,
            callbacks: CaptureCallbacks::default(),
            dedup: Mutex::new(DedupState::default()),
        }
    }

    pub fn with_callbacks(mut self, callbacks: CaptureCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn study_instance_uid(&self) -> &str {
        &self.study_instance_uid
    }

    /// Change the selected series. The dedup set is kept.
    pub fn select_series(&self, series_instance_uid: Option<String>) {
        *lock(&self.series_instance_uid) = series_instance_uid;
    }

    /// Whether `markup_uid` has been persisted by this listener.
    pub fn is_captured(&self, markup_uid: &str) -> bool {
        lock(&self.dedup).captured.contains(markup_uid)
    }

    pub fn captured_count(&self) -> usize {
        lock(&self.dedup).captured.len()
    }

    /// Handle one completion event end to end.
    ///
    /// Skips are reported as `Ok(CaptureOutcome::Skipped)`; only a failed
    /// create call is an error.
    pub async fn capture(&self, event: &MarkupCompleted) -> Result<CaptureOutcome, CaptureError> {
        match self.prepare(event) {
            Ok(pending) => self.persist(pending).await.map(CaptureOutcome::Persisted),
            Err(reason) => Ok(CaptureOutcome::Skipped(reason)),
        }
    }

    /// Consume events until the bus closes or `cancel` fires.
    ///
    /// Events are classified and claimed in arrival order; each create call
    /// then runs on its own task, so calls for distinct markups may finish
    /// out of order. Cancelling does not abort running create calls.
    pub async fn run(
        self: Arc<Self>,
        mut receiver: broadcast::Receiver<MarkupCompleted>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(
                        study_uid = %self.study_instance_uid,
                        "Capture listener cancelled",
                    );
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        if let Ok(pending) = self.prepare(&event) {
                            let listener = Arc::clone(&self);
                            tokio::spawn(async move {
                                // Failures are logged and reported by `persist`.
                                let _ = listener.persist(pending).await;
                            });
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            skipped = n,
                            study_uid = %self.study_instance_uid,
                            "Capture listener lagged, some markups were not captured",
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Markup bus closed, capture listener shutting down");
                        break;
                    }
                },
            }
        }
    }

    /// Classify, extract and claim. Never suspends.
    fn prepare(&self, event: &MarkupCompleted) -> Result<PendingCapture, SkipReason> {
        let result = self.try_prepare(event);
        if let Err(reason) = &result {
            tracing::debug!(
                markup_uid = %event.markup_uid,
                tool_kind = %event.tool_kind,
                reason = ?reason,
                "Markup not captured",
            );
        }
        result
    }

    fn try_prepare(&self, event: &MarkupCompleted) -> Result<PendingCapture, SkipReason> {
        let class = tool::classify(&event.tool_kind);
        if class == ToolClass::Unsupported {
            return Err(SkipReason::UnsupportedTool);
        }

        let series = lock(&self.series_instance_uid)
            .clone()
            .filter(|uid| !uid.is_empty())
            .ok_or(SkipReason::NoSeries)?;

        if self.is_captured(&event.markup_uid) {
            return Err(SkipReason::AlreadyCaptured);
        }

        let parsed = locator::parse(&event.image_locator).map_err(SkipReason::BadLocator)?;
        let target = FrameTarget::new(
            &self.study_instance_uid,
            &series,
            &event.image_locator,
            parsed,
        );

        let create = match class {
            ToolClass::Measurement(tool) => assemble::measurement(tool, &target, &event.data)
                .map(PendingCreate::Measurement),
            ToolClass::Annotation(tool) => assemble::annotation(tool, &target, &event.data)
                .map(PendingCreate::Annotation),
            ToolClass::Unsupported => None,
        }
        .ok_or(SkipReason::NoPoints)?;

        let mut dedup = lock(&self.dedup);
        if dedup.captured.contains(&event.markup_uid) {
            return Err(SkipReason::AlreadyCaptured);
        }
        if !dedup.in_flight.insert(event.markup_uid.clone()) {
            return Err(SkipReason::InFlight);
        }

        Ok(PendingCapture {
            markup_uid: event.markup_uid.clone(),
            tool_kind: event.tool_kind.clone(),
            create,
        })
    }

    async fn persist(&self, pending: PendingCapture) -> Result<CapturedRecord, CaptureError> {
        let result = match &pending.create {
            PendingCreate::Measurement(input) => self
                .measurements
                .create(input)
                .await
                .map(CapturedRecord::Measurement),
            PendingCreate::Annotation(input) => self
                .annotations
                .create(input)
                .await
                .map(CapturedRecord::Annotation),
        };

        let PendingCapture {
            markup_uid,
            tool_kind,
            ..
        } = pending;

        match result {
            Ok(record) => {
                {
                    let mut dedup = lock(&self.dedup);
                    dedup.in_flight.remove(&markup_uid);
                    dedup.captured.insert(markup_uid.clone());
                }
                tracing::info!(
                    markup_uid = %markup_uid,
                    tool_kind = %tool_kind,
                    record_id = %record.id(),
                    study_uid = %self.study_instance_uid,
                    "Markup persisted",
                );
                if let Some(on_saved) = &self.callbacks.on_saved {
                    on_saved(&record);
                }
                Ok(record)
            }
            Err(source) => {
                lock(&self.dedup).in_flight.remove(&markup_uid);
                tracing::error!(
                    error = %source,
                    markup_uid = %markup_uid,
                    tool_kind = %tool_kind,
                    study_uid = %self.study_instance_uid,
                    "Failed to persist markup",
                );
                let err = CaptureError::Persist {
                    markup_uid,
                    tool_kind,
                    source,
                };
                if let Some(on_error) = &self.callbacks.on_error {
                    on_error(&err);
                }
                Err(err)
            }
        }
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
