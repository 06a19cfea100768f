use serde::{Deserialize, Serialize};

/// Identifier of a detection, unique within one matching run.
pub type DetectionId = u32;

/// Axis-aligned box in pixel space: top-left corner plus extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build from corner coordinates, as produced by detectors.
    pub fn from_corners(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self::new(xmin, ymin, xmax - xmin, ymax - ymin)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn top_left(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Corner points: [top-left, top-right, bottom-right, bottom-left]
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.right(), self.y),
            (self.right(), self.bottom()),
            (self.x, self.bottom()),
        ]
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// A design component whose position is already known.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthComponent {
    pub id: String,
    pub bbox: BoundingBox,
    pub label: String,
    /// Instance of a component published from a shared library.
    #[serde(default)]
    pub remote: bool,
}

impl GroundTruthComponent {
    pub fn new(id: impl Into<String>, bbox: BoundingBox, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bbox,
            label: label.into(),
            remote: false,
        }
    }

    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }
}

/// A box produced by the detection model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: DetectionId,
    pub bbox: BoundingBox,
    pub label: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<u32>,
}

impl Detection {
    pub fn new(id: DetectionId, bbox: BoundingBox, label: impl Into<String>, score: f64) -> Self {
        Self {
            id,
            bbox,
            label: label.into(),
            score,
            class_id: None,
        }
    }

    pub fn with_class(mut self, class_id: u32) -> Self {
        self.class_id = Some(class_id);
        self
    }
}

/// Pair score between one component and one detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub overlap_ratio: f64,
    pub corner_distance: f64,
}

/// A detection accepted against one component.
///
/// The same detection can appear once per component that accepted it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchedDetection {
    pub detection: Detection,
    pub component_id: String,
    pub overlap_ratio: f64,
    pub corner_distance: f64,
}

impl MatchedDetection {
    pub fn id(&self) -> DetectionId {
        self.detection.id
    }
}

/// How much of a pair's overlap counts towards the ratio gate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapMetric {
    /// Intersection divided by the detection's own area.
    #[default]
    DetectionArea,
    /// Intersection over union.
    Iou,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Top-left corner distance must be strictly below this, in pixels.
    pub distance_threshold: f64,
    /// Overlap ratio must be strictly above this.
    pub overlap_threshold: f64,
    pub metric: OverlapMetric,
    /// Only match against components flagged `remote`.
    pub remote_only: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 50.0,
            overlap_threshold: 0.1,
            metric: OverlapMetric::DetectionArea,
            remote_only: false,
        }
    }
}

/// Settings for turning raw detector tensors into detections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Predictions must score strictly above this to be kept.
    pub score_threshold: f64,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { score_threshold: 0.3 }
    }
}

/// Entry of the model's class directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub id: u32,
    pub name: String,
}
