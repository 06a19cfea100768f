use std::collections::HashSet;

use crate::types::{Detection, DetectionId, MatchedDetection};

/// Unique detection ids among the matched entries.
pub fn matched_ids(matched: &[MatchedDetection]) -> HashSet<DetectionId> {
    matched.iter().map(MatchedDetection::id).collect()
}

/// Detections that no component explained, in their original order.
pub fn correction_set(detections: &[Detection], matched: &[MatchedDetection]) -> Vec<Detection> {
    let ids = matched_ids(matched);
    detections
        .iter()
        .filter(|d| !ids.contains(&d.id))
        .cloned()
        .collect()
}
