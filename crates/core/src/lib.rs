//! Canonical markup model and the pure translation layer between
//! viewport-native markup and persisted records.
//!
//! Everything in this crate is synchronous and side-effect free:
//!
//! - [`geometry`]: handle layouts and the point normalizer.
//! - [`stats`]: cached-statistics extraction (scalar value + ROI stats).
//! - [`locator`]: per-image locator parsing and building.
//! - [`tool`]: the measurement / annotation tool-kind partition.
//! - [`markup`]: the payload a viewport tool reports on completion.
//! - [`blob`]: the serialized-string boundary used by the backend schema.
//! - [`measurement`], [`annotation`], [`key_image`]: canonical records.

pub mod annotation;
pub mod blob;
pub mod error;
pub mod geometry;
pub mod key_image;
pub mod locator;
pub mod markup;
pub mod measurement;
pub mod stats;
pub mod tool;
pub mod types;

pub use annotation::{Annotation, CreateAnnotation, UpdateAnnotation};
pub use blob::BlobError;
pub use error::CoreError;
pub use geometry::{normalize_points, MarkupPayload, Point3D};
pub use key_image::{
    CreateKeyImage, DisplayState, KeyImage, KeyImageKey, ToggleAction, ToggleOutcome,
    UpdateKeyImage,
};
pub use locator::{ImageLocator, LocatorError, ParsedLocator};
pub use markup::{AnnotationStyle, MarkupData};
pub use measurement::{CreateMeasurement, Measurement, UpdateMeasurement};
pub use stats::{CachedStats, RoiStats, ScalarValue};
pub use tool::{AnnotationTool, AnnotationType, MeasurementTool, MeasurementType, ToolClass};
pub use types::{RecordId, Timestamp};
