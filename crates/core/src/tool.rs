//! Tool-kind partition.
//!
//! Viewport tools are split into two disjoint sets: measurement tools,
//! which produce a quantitative [`MeasurementType`], and annotation tools,
//! which produce a qualitative [`AnnotationType`]. Every other tool
//! (pan, zoom, window/level, scroll, ...) is unsupported and never
//! persisted.
//!
//! Each supported tool also fixes how many points a record needs to be
//! restorable and how many of them are handed back to the viewport.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Quantitative markup kinds stored on a measurement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementType {
    Length,
    Angle,
    CobbAngle,
    RectangleRoi,
    EllipseRoi,
    PolygonRoi,
    FreehandRoi,
    Bidirectional,
    Probe,
}

impl MeasurementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "LENGTH",
            Self::Angle => "ANGLE",
            Self::CobbAngle => "COBB_ANGLE",
            Self::RectangleRoi => "RECTANGLE_ROI",
            Self::EllipseRoi => "ELLIPSE_ROI",
            Self::PolygonRoi => "POLYGON_ROI",
            Self::FreehandRoi => "FREEHAND_ROI",
            Self::Bidirectional => "BIDIRECTIONAL",
            Self::Probe => "PROBE",
        }
    }
}

/// Qualitative markup kinds stored on an annotation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationType {
    Text,
    Arrow,
    Marker,
    Line,
    Rectangle,
    Ellipse,
    Polyline,
}

impl AnnotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Arrow => "ARROW",
            Self::Marker => "MARKER",
            Self::Line => "LINE",
            Self::Rectangle => "RECTANGLE",
            Self::Ellipse => "ELLIPSE",
            Self::Polyline => "POLYLINE",
        }
    }
}

// ---------------------------------------------------------------------------
// Point cardinality
// ---------------------------------------------------------------------------

/// How many points a tool kind needs, and how many it takes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    /// Fewer stored points than this makes a record unrestorable.
    pub min: usize,
    /// Restoration keeps at most this many points; `None` keeps all.
    pub take: Option<usize>,
}

impl Cardinality {
    const fn exactly(n: usize) -> Self {
        Self { min: n, take: Some(n) }
    }

    const fn at_least(n: usize) -> Self {
        Self { min: n, take: None }
    }

    /// Whether `count` stored points satisfy this cardinality.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min
    }

    /// The slice of `items` handed back to the viewport.
    pub fn select<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        match self.take {
            Some(n) => &items[..n.min(items.len())],
            None => items,
        }
    }

    /// [`select`](Self::select), failing when `items` is too short.
    pub fn restorable<'a, T>(
        &self,
        tool: &'static str,
        items: &'a [T],
    ) -> Result<&'a [T], CoreError> {
        if !self.accepts(items.len()) {
            return Err(CoreError::TooFewPoints {
                tool,
                needed: self.min,
                found: items.len(),
            });
        }
        Ok(self.select(items))
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Supported measurement tools, identified by their viewport tool name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementTool {
    Length,
    Angle,
    CobbAngle,
    RectangleRoi,
    EllipticalRoi,
    Probe,
    Bidirectional,
    SplineRoi,
    LivewireContour,
}

/// All measurement tools, in partition order.
pub const MEASUREMENT_TOOLS: &[MeasurementTool] = &[
    MeasurementTool::Length,
    MeasurementTool::Angle,
    MeasurementTool::CobbAngle,
    MeasurementTool::RectangleRoi,
    MeasurementTool::EllipticalRoi,
    MeasurementTool::Probe,
    MeasurementTool::Bidirectional,
    MeasurementTool::SplineRoi,
    MeasurementTool::LivewireContour,
];

impl MeasurementTool {
    /// The viewport tool name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Length => "Length",
            Self::Angle => "Angle",
            Self::CobbAngle => "CobbAngle",
            Self::RectangleRoi => "RectangleROI",
            Self::EllipticalRoi => "EllipticalROI",
            Self::Probe => "Probe",
            Self::Bidirectional => "Bidirectional",
            Self::SplineRoi => "SplineROI",
            Self::LivewireContour => "LivewireContour",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        MEASUREMENT_TOOLS.iter().copied().find(|tool| tool.name() == name)
    }

    pub fn measurement_type(&self) -> MeasurementType {
        match self {
            Self::Length => MeasurementType::Length,
            Self::Angle => MeasurementType::Angle,
            Self::CobbAngle => MeasurementType::CobbAngle,
            Self::RectangleRoi => MeasurementType::RectangleRoi,
            Self::EllipticalRoi => MeasurementType::EllipseRoi,
            Self::Probe => MeasurementType::Probe,
            Self::Bidirectional => MeasurementType::Bidirectional,
            Self::SplineRoi => MeasurementType::PolygonRoi,
            Self::LivewireContour => MeasurementType::FreehandRoi,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::Length | Self::RectangleRoi | Self::EllipticalRoi => Cardinality::exactly(2),
            Self::Angle | Self::CobbAngle | Self::SplineRoi => Cardinality::at_least(3),
            Self::Probe => Cardinality::exactly(1),
            Self::Bidirectional => Cardinality::exactly(4),
            Self::LivewireContour => Cardinality::at_least(2),
        }
    }
}

/// Supported annotation tools, identified by their viewport tool name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationTool {
    ArrowAnnotate,
    TextMarker,
    PlanarFreehandRoi,
}

/// All annotation tools, in partition order.
pub const ANNOTATION_TOOLS: &[AnnotationTool] = &[
    AnnotationTool::ArrowAnnotate,
    AnnotationTool::TextMarker,
    AnnotationTool::PlanarFreehandRoi,
];

impl AnnotationTool {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ArrowAnnotate => "ArrowAnnotate",
            Self::TextMarker => "TextMarker",
            Self::PlanarFreehandRoi => "PlanarFreehandROI",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ANNOTATION_TOOLS.iter().copied().find(|tool| tool.name() == name)
    }

    pub fn annotation_type(&self) -> AnnotationType {
        match self {
            Self::ArrowAnnotate => AnnotationType::Arrow,
            Self::TextMarker => AnnotationType::Text,
            Self::PlanarFreehandRoi => AnnotationType::Polyline,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::ArrowAnnotate => Cardinality::exactly(2),
            Self::TextMarker => Cardinality::at_least(1),
            Self::PlanarFreehandRoi => Cardinality::at_least(2),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Which side of the partition a tool name falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolClass {
    Measurement(MeasurementTool),
    Annotation(AnnotationTool),
    Unsupported,
}

/// Classify a viewport tool name.
pub fn classify(tool_name: &str) -> ToolClass {
    if let Some(tool) = MeasurementTool::from_name(tool_name) {
        ToolClass::Measurement(tool)
    } else if let Some(tool) = AnnotationTool::from_name(tool_name) {
        ToolClass::Annotation(tool)
    } else {
        ToolClass::Unsupported
    }
}

/// Resolve a stored measurement tool name, rejecting unknown tools.
pub fn measurement_tool(tool_name: &str) -> Result<MeasurementTool, CoreError> {
    MeasurementTool::from_name(tool_name).ok_or_else(|| {
        CoreError::UnknownTool {
            kind: "measurement",
            name: tool_name.to_string(),
        }
    })
}

/// Resolve a stored annotation tool name, rejecting unknown tools.
pub fn annotation_tool(tool_name: &str) -> Result<AnnotationTool, CoreError> {
    AnnotationTool::from_name(tool_name).ok_or_else(|| {
        CoreError::UnknownTool {
            kind: "annotation",
            name: tool_name.to_string(),
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
