use crate::geometry::{box_area, corner_distance, overlap_area};
use crate::types::{BoundingBox, Detection, GroundTruthComponent, OverlapMetric, Similarity};

impl OverlapMetric {
    /// Overlap ratio between a component box and a detection box.
    ///
    /// Areas come from the same polygon kernel as the intersection, so a
    /// detection inside its component scores exactly `1.0`. Zero
    /// denominators resolve to `0.0`.
    pub fn ratio(&self, component: &BoundingBox, detection: &BoundingBox) -> f64 {
        let overlap = overlap_area(component, detection);
        let denom = match self {
            OverlapMetric::DetectionArea => box_area(detection),
            OverlapMetric::Iou => box_area(component) + box_area(detection) - overlap,
        };
        if denom > 0.0 {
            overlap / denom
        } else {
            0.0
        }
    }
}

pub fn score_with(
    metric: OverlapMetric,
    component: &GroundTruthComponent,
    detection: &Detection,
) -> Similarity {
    Similarity {
        overlap_ratio: metric.ratio(&component.bbox, &detection.bbox),
        corner_distance: corner_distance(&component.bbox, &detection.bbox),
    }
}

/// Score a pair with the default detection-area ratio.
pub fn score(component: &GroundTruthComponent, detection: &Detection) -> Similarity {
    score_with(OverlapMetric::DetectionArea, component, detection)
}
