//! `radmark-inspector` -- print what restoring a study would insert.
//!
//! Usage: `radmark-inspector [STUDY_INSTANCE_UID]`
//!
//! # Environment variables
//!
//! | Variable            | Required | Default | Description                              |
//! |---------------------|----------|---------|------------------------------------------|
//! | `RADMARK_STUDY_UID` | no       | --      | Study to inspect when no argument given  |
//! | `RADMARK_API_URL`   | no       | `http://localhost:8080/api` | Backend base URL |
//!
//! The remaining `RADMARK_*` variables are described on
//! [`PipelineConfig::from_env`].

use anyhow::Context;
use radmark_pipeline::PipelineConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "radmark_inspector=info,radmark_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let study_uid = radmark_inspector::study_uid(
        std::env::args().skip(1),
        std::env::var(radmark_inspector::STUDY_UID_VAR).ok(),
    )
    .context("usage: radmark-inspector <STUDY_INSTANCE_UID> (or set RADMARK_STUDY_UID)")?;

    let config = PipelineConfig::from_env()?;

    tracing::info!(
        study_uid = %study_uid,
        api_url = %config.api_url,
        "Starting radmark-inspector",
    );

    let inspection = radmark_inspector::inspect(&config, &study_uid).await?;

    tracing::info!(
        inserted = inspection.report.inserted.len(),
        failed = inspection.report.failed.len(),
        "Inspection complete",
    );

    println!("{}", serde_json::to_string_pretty(&inspection)?);
    Ok(())
}
