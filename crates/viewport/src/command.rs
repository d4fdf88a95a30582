//! The insert-markup command and the viewport seam that accepts it.

use std::sync::Mutex;

use radmark_core::stats::CachedStats;
use radmark_core::{AnnotationStyle, MarkupPayload};
use serde::Serialize;

/// Insert one markup into viewport state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertMarkup {
    #[serde(rename = "markupUID")]
    pub markup_uid: String,
    pub tool_kind: String,
    pub image_locator: String,
    pub handles: MarkupPayload,
    #[serde(skip_serializing_if = "CachedStats::is_empty")]
    pub cached_stats: CachedStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<AnnotationStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub visible: bool,
    pub locked: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    #[error("Viewport rejected markup {markup_uid}: {reason}")]
    Rejected { markup_uid: String, reason: String },
}

/// The viewport collaborator, as seen by the restorer.
///
/// Insertion mutates in-memory viewport state and does not suspend.
pub trait Viewport: Send + Sync {
    fn insert_markup(&self, command: InsertMarkup) -> Result<(), ViewportError>;
}

/// A viewport that records every accepted command.
///
/// Used for dry runs and tests. Markup UIDs registered with
/// [`reject`](Self::reject) are refused with [`ViewportError::Rejected`].
#[derive(Default)]
pub struct RecordingViewport {
    inserted: Mutex<Vec<InsertMarkup>>,
    rejected_uids: Mutex<Vec<String>>,
}

impl RecordingViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse any later insertion of `markup_uid`.
    pub fn reject(&self, markup_uid: impl Into<String>) {
        lock(&self.rejected_uids).push(markup_uid.into());
    }

    /// Commands accepted so far, in insertion order.
    pub fn inserted(&self) -> Vec<InsertMarkup> {
        lock(&self.inserted).clone()
    }
}

impl Viewport for RecordingViewport {
    fn insert_markup(&self, command: InsertMarkup) -> Result<(), ViewportError> {
        if lock(&self.rejected_uids).contains(&command.markup_uid) {
            return Err(ViewportError::Rejected {
                markup_uid: command.markup_uid,
                reason: "refused by recording viewport".to_string(),
            });
        }
        lock(&self.inserted).push(command);
        Ok(())
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
