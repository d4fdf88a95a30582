//! Per-image locator codec.
//!
//! The viewport addresses a single frame of a single instance with a string
//! of the form
//!
//! ```text
//! <scheme>:<base>/studies/<study>/series/<series>/instances/<sop>/frames/<n>
//! ```
//!
//! where `<n>` is 1-based. Capture only needs the SOP instance UID and the
//! frame, so parsing is deliberately loose: anything containing
//! `instances/<sop>` and `frames/<n>` is accepted. Building always emits the
//! full form.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static INSTANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"instances/([^/]+)").expect("valid regex"));

static FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"frames/(\d+)").expect("valid regex"));

/// Default `<scheme>:<base>` prefix for built locators.
pub const DEFAULT_LOCATOR_BASE: &str = "wadors:/api/wado";

/// Errors raised while reading a locator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    #[error("Locator has no instances/<sop> segment: {0}")]
    MissingInstance(String),

    #[error("Locator has no frames/<n> segment: {0}")]
    MissingFrame(String),

    #[error("Locator frame must be 1-based, got {frame} in {locator}")]
    InvalidFrame { frame: String, locator: String },
}

/// The parts of a locator that capture needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocator {
    pub sop_instance_uid: String,
    /// 0-based frame index.
    pub frame_index: u32,
}

/// Extract the SOP instance UID and 0-based frame index from a locator.
pub fn parse(locator: &str) -> Result<ParsedLocator, LocatorError> {
    let sop_instance_uid = INSTANCE_RE
        .captures(locator)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| LocatorError::MissingInstance(locator.to_string()))?;

    let frame = FRAME_RE
        .captures(locator)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| LocatorError::MissingFrame(locator.to_string()))?;

    let invalid = || LocatorError::InvalidFrame {
        frame: frame.to_string(),
        locator: locator.to_string(),
    };
    let one_based: u32 = frame.parse().map_err(|_| invalid())?;
    let frame_index = one_based.checked_sub(1).ok_or_else(invalid)?;

    Ok(ParsedLocator {
        sop_instance_uid,
        frame_index,
    })
}

/// A fully-qualified per-image locator, built from stored record keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLocator {
    pub base: String,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
    /// 0-based frame index.
    pub frame_index: u32,
}

impl ImageLocator {
    pub fn new(
        base: impl Into<String>,
        study_instance_uid: impl Into<String>,
        series_instance_uid: impl Into<String>,
        sop_instance_uid: impl Into<String>,
        frame_index: u32,
    ) -> Self {
        Self {
            base: base.into(),
            study_instance_uid: study_instance_uid.into(),
            series_instance_uid: series_instance_uid.into(),
            sop_instance_uid: sop_instance_uid.into(),
            frame_index,
        }
    }
}

impl fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/studies/{}/series/{}/instances/{}/frames/{}",
            self.base.trim_end_matches('/'),
            self.study_instance_uid,
            self.series_instance_uid,
            self.sop_instance_uid,
            u64::from(self.frame_index) + 1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const FULL: &str = "wadors:/api/wado/studies/1.2/series/1.2.3/instances/SOP1/frames/1";

    #[test]
    fn parse_full_locator() {
        let parsed = parse(FULL).unwrap();
        assert_eq!(parsed.sop_instance_uid, "SOP1");
        assert_eq!(parsed.frame_index, 0);
    }

    #[test]
    fn parse_is_loose_about_prefix() {
        let parsed = parse("instances/1.2.840.5/frames/12").unwrap();
        assert_eq!(parsed.sop_instance_uid, "1.2.840.5");
        assert_eq!(parsed.frame_index, 11);
    }

    #[test]
    fn missing_segments_rejected() {
        assert_matches!(parse("frames/1"), Err(LocatorError::MissingInstance(_)));
        assert_matches!(parse("instances/SOP1"), Err(LocatorError::MissingFrame(_)));
        assert_matches!(parse(""), Err(LocatorError::MissingInstance(_)));
    }

    #[test]
    fn frame_zero_rejected() {
        assert_matches!(
            parse("instances/SOP1/frames/0"),
            Err(LocatorError::InvalidFrame { .. })
        );
    }

    #[test]
    fn oversized_frame_rejected() {
        assert_matches!(
            parse("instances/SOP1/frames/99999999999"),
            Err(LocatorError::InvalidFrame { .. })
        );
    }

    #[test]
    fn build_uses_one_based_frame() {
        let locator = ImageLocator::new(DEFAULT_LOCATOR_BASE, "1.2", "1.2.3", "SOP1", 0);
        assert_eq!(locator.to_string(), FULL);
    }

    #[test]
    fn build_then_parse_inverts() {
        let locator = ImageLocator::new("wadors:http://pacs/", "S", "SE", "SOP9", 4);
        let parsed = parse(&locator.to_string()).unwrap();
        assert_eq!(parsed.sop_instance_uid, "SOP9");
        assert_eq!(parsed.frame_index, 4);
    }
}
