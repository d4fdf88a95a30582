//! Dry-run restoration of a study against a live backend.
//!
//! [`inspect`] fetches a study's stored markup, rebuilds every insert
//! command against a [`RecordingViewport`] that is ready from the start,
//! and returns the commands together with the restore report.

use std::sync::Arc;

use radmark_client::{ApiError, MarkupApi};
use radmark_pipeline::{PipelineConfig, RestoreError, RestoreReport, Restorer};
use radmark_viewport::{InsertMarkup, RecordingViewport, ViewportReadiness};
use serde::Serialize;

/// Environment variable read when no study UID is passed on the command line.
pub const STUDY_UID_VAR: &str = "RADMARK_STUDY_UID";

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Restore(#[from] RestoreError),
}

/// What a restore of the study would insert into a viewport.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub commands: Vec<InsertMarkup>,
    pub report: RestoreReport,
}

/// Pick the study UID: the first non-empty argument, else the environment.
pub fn study_uid<I>(args: I, env: Option<String>) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| arg.trim().to_string())
        .find(|arg| !arg.is_empty())
        .or_else(|| env.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

/// Build the backend client described by `config`.
pub fn client(config: &PipelineConfig) -> Result<MarkupApi, ApiError> {
    MarkupApi::with_timeout(config.api_url.clone(), config.request_timeout)
}

/// Inspect a study using the backend described by `config`.
pub async fn inspect(config: &PipelineConfig, study_uid: &str) -> Result<Inspection, InspectError> {
    let api = client(config)?;
    inspect_with(api, config, study_uid).await
}

/// Inspect a study using an existing client.
pub async fn inspect_with(
    api: MarkupApi,
    config: &PipelineConfig,
    study_uid: &str,
) -> Result<Inspection, InspectError> {
    let api = Arc::new(api);
    let viewport = Arc::new(RecordingViewport::new());
    let readiness = ViewportReadiness::ready();

    let report = Restorer::new(
        api.clone(),
        api,
        viewport.clone(),
        config.locator_base.clone(),
    )
    .with_policy(config.readiness.clone())
    .with_readiness(readiness.subscribe())
    .restore(study_uid)
    .await?;

    Ok(Inspection {
        commands: viewport.inserted(),
        report,
    })
}
