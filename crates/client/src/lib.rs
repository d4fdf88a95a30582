//! Persistence Client for the markup backend.
//!
//! - [`api`]: [`MarkupApi`], the shared `reqwest` transport and errors.
//! - [`measurements`], [`annotations`], [`key_images`]: per-kind endpoints.
//! - [`wire`]: backend schema with JSON-text blob fields.
//! - [`store`]: the async traits the pipeline depends on.

pub mod annotations;
pub mod api;
pub mod key_images;
pub mod measurements;
pub mod store;
pub mod wire;

pub use api::{ApiError, MarkupApi};
pub use store::{AnnotationStore, KeyImageStore, MeasurementStore};
