//! Restorer: rebuild viewport markup from a study's stored records.
//!
//! Both record kinds are fetched concurrently. Invisible records are never
//! inserted. A record that cannot be rebuilt (unknown tool, too few points,
//! refused by the viewport) is logged and reported, and restoration moves on
//! to the next one.

use std::sync::Arc;

use radmark_client::{AnnotationStore, MeasurementStore};
use radmark_core::stats::cached_stats_for_restore;
use radmark_core::tool;
use radmark_core::{
    Annotation, CachedStats, CoreError, MarkupPayload, Measurement, RecordId,
};
use radmark_viewport::{InsertMarkup, ReadyWatch, Viewport, ViewportError};
use serde::Serialize;

use crate::config::ReadinessPolicy;

/// Prefix of the markup UID given to restored records.
pub const RESTORED_UID_PREFIX: &str = "restored-";

pub fn restored_uid(id: RecordId) -> String {
    format!("{RESTORED_UID_PREFIX}{id}")
}

// ---------------------------------------------------------------------------
// Errors and report
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("Viewport not ready after {polls} polls, nothing restored")]
    ViewportNotReady { polls: u32 },
}

/// Why a single record could not be restored.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Unknown tool or too few stored points.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Viewport(#[from] ViewportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Measurement,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreFailure {
    pub record_id: RecordId,
    pub kind: RecordKind,
    pub tool_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFailure {
    pub kind: RecordKind,
    pub reason: String,
}

/// Summary of one restoration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub study_instance_uid: String,
    /// Markup UIDs handed to the viewport, in insertion order.
    pub inserted: Vec<String>,
    pub skipped_invisible: usize,
    pub failed: Vec<RestoreFailure>,
    pub query_failures: Vec<QueryFailure>,
}

impl RestoreReport {
    fn new(study_instance_uid: &str) -> Self {
        Self {
            study_instance_uid: study_instance_uid.to_string(),
            inserted: Vec::new(),
            skipped_invisible: 0,
            failed: Vec::new(),
            query_failures: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reconstruction
// ---------------------------------------------------------------------------

/// Build the insert command for a stored measurement.
pub fn measurement_command(
    measurement: &Measurement,
    locator_base: &str,
) -> Result<InsertMarkup, RecordError> {
    let tool = tool::measurement_tool(&measurement.tool_name)?;
    let points = tool.cardinality().restorable(tool.name(), &measurement.points)?;
    let image_locator = measurement.locator(locator_base).to_string();

    let cached_stats = cached_stats_for_restore(
        &image_locator,
        measurement.roi_stats.as_ref(),
        measurement.value,
        measurement.unit.as_deref(),
    );

    Ok(InsertMarkup {
        markup_uid: restored_uid(measurement.id),
        tool_kind: tool.name().to_string(),
        image_locator,
        handles: MarkupPayload::from_points(points),
        cached_stats,
        text: None,
        label: measurement.label.clone(),
        style: None,
        color: measurement.color.clone(),
        visible: true,
        locked: false,
    })
}

/// Build the insert command for a stored annotation.
pub fn annotation_command(
    annotation: &Annotation,
    locator_base: &str,
) -> Result<InsertMarkup, RecordError> {
    let tool = tool::annotation_tool(&annotation.tool_name)?;
    let points = tool.cardinality().restorable(tool.name(), &annotation.points)?;

    Ok(InsertMarkup {
        markup_uid: restored_uid(annotation.id),
        tool_kind: tool.name().to_string(),
        image_locator: annotation.locator(locator_base).to_string(),
        handles: MarkupPayload::from_points(points),
        cached_stats: CachedStats::new(),
        text: annotation.text.clone(),
        label: annotation.text.clone(),
        style: annotation.style.clone(),
        color: annotation.color.clone(),
        visible: true,
        locked: annotation.locked,
    })
}

// ---------------------------------------------------------------------------
// Restorer
// ---------------------------------------------------------------------------

pub struct Restorer {
    measurements: Arc<dyn MeasurementStore>,
    annotations: Arc<dyn AnnotationStore>,
    viewport: Arc<dyn Viewport>,
    readiness: Option<ReadyWatch>,
    policy: ReadinessPolicy,
    locator_base: String,
}

impl Restorer {
    pub fn new(
        measurements: Arc<dyn MeasurementStore>,
        annotations: Arc<dyn AnnotationStore>,
        viewport: Arc<dyn Viewport>,
        locator_base: impl Into<String>,
    ) -> Self {
        Self {
            measurements,
            annotations,
            viewport,
            readiness: None,
            policy: ReadinessPolicy::default(),
            locator_base: locator_base.into(),
        }
    }

    /// Wait on the viewport's readiness signal instead of the fixed delay.
    pub fn with_readiness(mut self, readiness: ReadyWatch) -> Self {
        self.readiness = Some(readiness);
        self
    }

    pub fn with_policy(mut self, policy: ReadinessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Restore every visible record of a study into the viewport.
    ///
    /// Not idempotent: running it twice inserts everything twice.
    pub async fn restore(&self, study_uid: &str) -> Result<RestoreReport, RestoreError> {
        let mut report = RestoreReport::new(study_uid);

        let (measurements, annotations) = tokio::join!(
            self.measurements.list_by_study(study_uid),
            self.annotations.list_by_study(study_uid),
        );

        let measurements = measurements.unwrap_or_else(|e| {
            tracing::error!(error = %e, study_uid, "Failed to fetch measurements for restore");
            report.query_failures.push(QueryFailure {
                kind: RecordKind::Measurement,
                reason: e.to_string(),
            });
            Vec::new()
        });
        let annotations = annotations.unwrap_or_else(|e| {
            tracing::error!(error = %e, study_uid, "Failed to fetch annotations for restore");
            report.query_failures.push(QueryFailure {
                kind: RecordKind::Annotation,
                reason: e.to_string(),
            });
            Vec::new()
        });

        if measurements.is_empty() && annotations.is_empty() {
            tracing::info!(study_uid, "No stored markup to restore");
            return Ok(report);
        }

        self.wait_for_viewport().await?;

        for measurement in &measurements {
            if !measurement.visible {
                report.skipped_invisible += 1;
                continue;
            }
            let result = measurement_command(measurement, &self.locator_base);
            self.apply(
                &mut report,
                RecordKind::Measurement,
                measurement.id,
                &measurement.tool_name,
                result,
            );
        }

        for annotation in &annotations {
            if !annotation.visible {
                report.skipped_invisible += 1;
                continue;
            }
            let result = annotation_command(annotation, &self.locator_base);
            self.apply(
                &mut report,
                RecordKind::Annotation,
                annotation.id,
                &annotation.tool_name,
                result,
            );
        }

        tracing::info!(
            study_uid,
            inserted = report.inserted.len(),
            skipped_invisible = report.skipped_invisible,
            failed = report.failed.len(),
            "Restore finished",
        );
        Ok(report)
    }

    async fn wait_for_viewport(&self) -> Result<(), RestoreError> {
        let Some(readiness) = &self.readiness else {
            tokio::time::sleep(self.policy.fallback_delay).await;
            return Ok(());
        };

        let mut readiness = readiness.clone();
        let max_polls = self.policy.max_polls;
        if readiness.wait_ready(self.policy.poll_interval, max_polls).await {
            Ok(())
        } else {
            tracing::warn!(max_polls, "Viewport never became ready, restore aborted");
            Err(RestoreError::ViewportNotReady { polls: max_polls })
        }
    }

    /// Insert one rebuilt command, or record why the record was skipped.
    fn apply(
        &self,
        report: &mut RestoreReport,
        kind: RecordKind,
        record_id: RecordId,
        tool_name: &str,
        command: Result<InsertMarkup, RecordError>,
    ) {
        let result = command.and_then(|command| {
            let markup_uid = command.markup_uid.clone();
            self.viewport.insert_markup(command)?;
            Ok(markup_uid)
        });

        match result {
            Ok(markup_uid) => report.inserted.push(markup_uid),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    record_id = %record_id,
                    tool_name,
                    kind = ?kind,
                    "Skipping record that could not be restored",
                );
                report.failed.push(RestoreFailure {
                    record_id,
                    kind,
                    tool_name: tool_name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}
