//! # boxcheck - detection to design component matching
//!
//! boxcheck takes the components a design file says are on a canvas, the
//! boxes an object detector found in the exported image, and splits the
//! detections into the ones explained by a known component and the ones
//! that are not. The leftovers are the "correction set": likely missing,
//! extra, or misplaced components.
//!
//! ## How a pair is judged
//!
//! - **Overlap ratio**: intersection area (polygon clipping) divided by the
//!   detection's own area. Not IoU unless [`OverlapMetric::Iou`] is chosen.
//! - **Corner distance**: distance between the two top-left corners.
//!
//! A pair matches when the distance is below `distance_threshold` (50 px)
//! and the ratio is above `overlap_threshold` (0.1).
//!
//! ## Quick Start
//!
//! ```rust
//! use boxcheck::{BoundingBox, BoxChecker, Detection, GroundTruthComponent};
//!
//! let components = vec![GroundTruthComponent::new(
//!     "c1",
//!     BoundingBox::new(0.0, 0.0, 100.0, 100.0),
//!     "card",
//! )];
//! let detections = vec![
//!     Detection::new(1, BoundingBox::new(10.0, 10.0, 50.0, 50.0), "card", 0.92),
//!     Detection::new(2, BoundingBox::new(500.0, 500.0, 20.0, 20.0), "icon", 0.81),
//! ];
//!
//! let out = BoxChecker::default().run(&components, &detections)?;
//! assert_eq!(out.matched[0].id(), 1);
//! assert_eq!(out.corrections[0].id, 2);
//! # Ok::<(), boxcheck::EngineError>(())
//! ```

// Core modules
mod box_checker;
mod correction;
mod engine;
mod geometry;
mod image_impl;
mod matcher;
mod postprocess;
mod similarity;
mod types;

// FFI module for C bindings
#[cfg(feature = "ffi")]
pub mod ffi;

// Public API exports
pub use crate::box_checker::{BoxChecker, CheckOutput};
pub use crate::correction::{correction_set, matched_ids};
pub use crate::engine::EngineError;
pub use crate::geometry::{box_area, corner_distance, overlap_area, quad_area, quad_overlap_area, Quad};
pub use crate::image_impl::{image_size, image_size_from_bytes, ImageSize};
pub use crate::matcher::match_boxes;
pub use crate::postprocess::{PredictionDecoder, RawPredictions};
pub use crate::similarity::{score, score_with};
pub use crate::types::{
    BoundingBox, DecodeConfig, Detection, DetectionId, GroundTruthComponent, LabelEntry,
    MatchConfig, MatchedDetection, OverlapMetric, Similarity,
};

use serde::{Deserialize, Serialize};

/// One matching job: components plus either decoded detections or raw
/// detector output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    pub components: Vec<GroundTruthComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<Detection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<RawPredictions>,
    #[serde(default)]
    pub config: MatchConfig,
    #[serde(default)]
    pub decode: DecodeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub detections: usize,
    /// Distinct detections with at least one match.
    pub matched_detections: usize,
    /// Accepted (detection, component) pairs, duplicates included.
    pub matched_entries: usize,
    pub corrections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub matched: Vec<MatchedDetection>,
    pub corrections: Vec<Detection>,
    pub summary: CheckSummary,
}

impl CheckRequest {
    /// Resolve the detections for this request, decoding raw predictions
    /// against `image` when given.
    pub fn resolve_detections(&self, image: Option<ImageSize>) -> Result<Vec<Detection>, EngineError> {
        match (&self.detections, &self.predictions) {
            (Some(detections), predictions) => {
                if predictions.is_some() {
                    log::warn!("request carries both detections and predictions; using detections");
                }
                Ok(detections.clone())
            }
            (None, Some(raw)) => PredictionDecoder::new(&self.decode, &raw.label_map).decode_raw(raw, image),
            (None, None) => Err(EngineError::MissingInput("detections or predictions".to_string())),
        }
    }
}

/// Run a full request and build the report.
pub fn check(request: &CheckRequest) -> Result<CheckReport, EngineError> {
    check_with_image(request, None)
}

pub fn check_with_image(
    request: &CheckRequest,
    image: Option<ImageSize>,
) -> Result<CheckReport, EngineError> {
    let detections = request.resolve_detections(image)?;
    let out = BoxChecker::new(request.config.clone()).run(&request.components, &detections)?;

    let summary = CheckSummary {
        detections: detections.len(),
        matched_detections: matched_ids(&out.matched).len(),
        matched_entries: out.matched.len(),
        corrections: out.corrections.len(),
    };

    Ok(CheckReport {
        matched: out.matched,
        corrections: out.corrections,
        summary,
    })
}

/// Parse a JSON request and run it.
pub fn check_json(request: &str) -> Result<CheckReport, EngineError> {
    let request: CheckRequest = serde_json::from_str(request)?;
    check(&request)
}
