use std::collections::HashSet;

use crate::types::{BoundingBox, Detection, DetectionId, GroundTruthComponent, MatchConfig};

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Invalid box for {owner}: {reason}")]
    InvalidBox { owner: String, reason: String },

    #[error("Invalid score {score} for detection {id}, expected a value in [0, 1]")]
    InvalidScore { id: DetectionId, score: f64 },

    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Invalid input shape: {0}")]
    InvalidShape(String),

    #[error("Unknown class id {0} in prediction output")]
    UnknownClass(u32),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for EngineError {
    fn from(err: image::ImageError) -> Self {
        EngineError::ImageError(err.to_string())
    }
}

pub fn validate_box(owner: impl FnOnce() -> String, bbox: &BoundingBox) -> Result<(), EngineError> {
    let reason = if ![bbox.x, bbox.y, bbox.width, bbox.height].iter().all(|v| v.is_finite()) {
        Some(format!("non-finite coordinates {:?}", bbox))
    } else if bbox.width < 0.0 {
        Some(format!("negative width {}", bbox.width))
    } else if bbox.height < 0.0 {
        Some(format!("negative height {}", bbox.height))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EngineError::InvalidBox { owner: owner(), reason }),
        None => Ok(()),
    }
}

pub fn validate_config(cfg: &MatchConfig) -> Result<(), EngineError> {
    for (name, value) in [
        ("distance_threshold", cfg.distance_threshold),
        ("overlap_threshold", cfg.overlap_threshold),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::InvalidThreshold { name, value });
        }
    }
    Ok(())
}

pub fn validate_components(components: &[GroundTruthComponent]) -> Result<(), EngineError> {
    for c in components {
        validate_box(|| format!("component {}", c.id), &c.bbox)?;
    }
    Ok(())
}

/// Checks boxes and scores. Returns the ids that occur more than once,
/// which the caller is expected to avoid but which do not fail the run.
pub fn validate_detections(detections: &[Detection]) -> Result<Vec<DetectionId>, EngineError> {
    let mut seen = HashSet::with_capacity(detections.len());
    let mut duplicates = Vec::new();

    for d in detections {
        validate_box(|| format!("detection {}", d.id), &d.bbox)?;
        if !(0.0..=1.0).contains(&d.score) {
            return Err(EngineError::InvalidScore { id: d.id, score: d.score });
        }
        if !seen.insert(d.id) && !duplicates.contains(&d.id) {
            duplicates.push(d.id);
        }
    }

    Ok(duplicates)
}
