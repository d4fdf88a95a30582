//! Capture/restore pipeline for viewport markup.
//!
//! - [`capture`]: [`CaptureListener`], persisting completed markups once.
//! - [`restore`]: [`Restorer`], rebuilding viewport markup on study open.
//! - [`key_image`]: [`KeyImageToggle`].
//! - [`session`]: [`StudySession`], the per-study lifecycle.
//! - [`assemble`]: pure record builders used by capture.
//! - [`config`]: [`PipelineConfig`] loaded from the environment.

pub mod assemble;
pub mod capture;
pub mod config;
pub mod key_image;
pub mod restore;
pub mod session;

pub use capture::{
    CaptureCallbacks, CaptureContext, CaptureError, CaptureListener, CaptureOutcome,
    CapturedRecord, SkipReason,
};
pub use config::{ConfigError, PipelineConfig, ReadinessPolicy};
pub use key_image::KeyImageToggle;
pub use restore::{RecordError, RestoreError, RestoreReport, Restorer};
pub use session::{SessionDeps, StudySession};
