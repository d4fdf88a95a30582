//! Per-study session.
//!
//! A [`StudySession`] owns the capture listener and dedup set of one open
//! study. Opening a different study means closing this session and opening
//! a new one, which starts from an empty dedup set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use radmark_client::{AnnotationStore, MeasurementStore};
use radmark_viewport::{MarkupEventBus, ReadyWatch, Viewport};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::capture::{CaptureCallbacks, CaptureContext, CaptureListener};
use crate::config::PipelineConfig;
use crate::restore::{RestoreError, RestoreReport, Restorer};

/// Collaborators shared by every session of a viewer.
#[derive(Clone)]
pub struct SessionDeps {
    pub bus: Arc<MarkupEventBus>,
    pub measurements: Arc<dyn MeasurementStore>,
    pub annotations: Arc<dyn AnnotationStore>,
    pub viewport: Arc<dyn Viewport>,
    /// The viewport's readiness signal, when it exposes one.
    pub readiness: Option<ReadyWatch>,
    pub callbacks: CaptureCallbacks,
    pub config: PipelineConfig,
}

pub struct StudySession {
    listener: Arc<CaptureListener>,
    restorer: Restorer,
    restored: AtomicBool,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl StudySession {
    /// Subscribe a fresh capture listener to the bus and start its loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(context: CaptureContext, deps: &SessionDeps) -> Self {
        let listener = Arc::new(
            CaptureListener::new(
                context,
                Arc::clone(&deps.measurements),
                Arc::clone(&deps.annotations),
            )
            .with_callbacks(deps.callbacks.clone()),
        );

        let cancel = CancellationToken::new();
        let receiver = deps.bus.subscribe();
        let task = tokio::spawn(Arc::clone(&listener).run(receiver, cancel.clone()));

        let mut restorer = Restorer::new(
            Arc::clone(&deps.measurements),
            Arc::clone(&deps.annotations),
            Arc::clone(&deps.viewport),
            deps.config.locator_base.clone(),
        )
        .with_policy(deps.config.readiness.clone());
        if let Some(readiness) = &deps.readiness {
            restorer = restorer.with_readiness(readiness.clone());
        }

        tracing::info!(study_uid = %listener.study_instance_uid(), "Study session opened");

        Self {
            listener,
            restorer,
            restored: AtomicBool::new(false),
            cancel,
            task: Some(task),
        }
    }

    pub fn study_instance_uid(&self) -> &str {
        self.listener.study_instance_uid()
    }

    pub fn listener(&self) -> &CaptureListener {
        &self.listener
    }

    pub fn select_series(&self, series_instance_uid: Option<String>) {
        self.listener.select_series(series_instance_uid);
    }

    /// Restore the study's stored markup into the viewport.
    ///
    /// Runs at most once per session: later calls return `None`, even when
    /// the first attempt failed.
    pub async fn restore(&self) -> Option<Result<RestoreReport, RestoreError>> {
        if self.restored.swap(true, Ordering::SeqCst) {
            tracing::debug!(
                study_uid = %self.study_instance_uid(),
                "Study already restored, skipping",
            );
            return None;
        }
        Some(self.restorer.restore(self.study_instance_uid()).await)
    }

    /// Stop capturing. Create calls already running are not aborted.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Capture loop ended abnormally");
            }
        }
        tracing::info!(study_uid = %self.study_instance_uid(), "Study session closed");
    }
}

impl Drop for StudySession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
