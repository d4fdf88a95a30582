//! Boundary to the interactive image viewport.
//!
//! - [`bus`]: the "markup completed" event channel the viewport publishes.
//! - [`command`]: the insert-markup command and the [`Viewport`] seam.
//! - [`readiness`]: the signal the viewport raises once it accepts inserts.

pub mod bus;
pub mod command;
pub mod readiness;

pub use bus::{MarkupCompleted, MarkupEventBus};
pub use command::{InsertMarkup, RecordingViewport, Viewport, ViewportError};
pub use readiness::{ReadyWatch, ViewportReadiness};
