use std::collections::HashMap;

use ndarray::{Array2, Array3, ArrayD, Ix2, Ix3};
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::image_impl::ImageSize;
use crate::types::{BoundingBox, DecodeConfig, Detection, DetectionId, LabelEntry};

/// Detector outputs as exported by the inference step.
///
/// `boxes` is `[batch, n, 4]` with normalized `[ymin, xmin, ymax, xmax]`,
/// `scores` and `classes` are `[batch, n]`. Only the first batch entry is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPredictions {
    pub boxes: Vec<Vec<[f32; 4]>>,
    pub scores: Vec<Vec<f32>>,
    pub classes: Vec<Vec<f32>>,
    pub label_map: Vec<LabelEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl RawPredictions {
    pub fn image_size(&self) -> Option<ImageSize> {
        Some(ImageSize::new(self.width?, self.height?))
    }

    /// Pack the nested vectors into dynamic tensors.
    pub fn to_tensors(&self) -> Result<(ArrayD<f32>, ArrayD<f32>, ArrayD<f32>), EngineError> {
        let batch = self.boxes.len();
        let n = self.boxes.first().map(Vec::len).unwrap_or(0);
        let flat: Vec<f32> = self.boxes.iter().flatten().flatten().copied().collect();
        let boxes = Array3::from_shape_vec((batch, n, 4), flat)
            .map_err(|e| EngineError::InvalidShape(format!("boxes: {e}")))?;

        Ok((
            boxes.into_dyn(),
            rows_to_tensor("scores", &self.scores)?,
            rows_to_tensor("classes", &self.classes)?,
        ))
    }
}

fn rows_to_tensor(name: &str, rows: &[Vec<f32>]) -> Result<ArrayD<f32>, EngineError> {
    let cols = rows.first().map(Vec::len).unwrap_or(0);
    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), cols), flat)
        .map(|a| a.into_dyn())
        .map_err(|e| EngineError::InvalidShape(format!("{name}: {e}")))
}

pub struct PredictionDecoder {
    pub score_threshold: f64,
    labels: HashMap<u32, String>,
}

impl PredictionDecoder {
    pub fn new(cfg: &DecodeConfig, label_map: &[LabelEntry]) -> Self {
        Self {
            score_threshold: cfg.score_threshold,
            labels: label_map.iter().map(|l| (l.id, l.name.clone())).collect(),
        }
    }

    fn label(&self, class_id: u32) -> Result<&str, EngineError> {
        self.labels
            .get(&class_id)
            .map(String::as_str)
            .ok_or(EngineError::UnknownClass(class_id))
    }

    /// Turn detector tensors into pixel-space detections.
    ///
    /// Entries scoring at or below the threshold are dropped; surviving
    /// detections keep their tensor index as id.
    pub fn decode(
        &self,
        boxes: &ArrayD<f32>,
        scores: &ArrayD<f32>,
        classes: &ArrayD<f32>,
        size: ImageSize,
    ) -> Result<Vec<Detection>, EngineError> {
        let boxes = boxes
            .view()
            .into_dimensionality::<Ix3>()
            .map_err(|_| EngineError::InvalidShape(format!("boxes must be 3-D, got {:?}", boxes.shape())))?;
        let scores = scores
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| EngineError::InvalidShape(format!("scores must be 2-D, got {:?}", scores.shape())))?;
        let classes = classes
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| EngineError::InvalidShape(format!("classes must be 2-D, got {:?}", classes.shape())))?;

        let (batch, n, coords) = boxes.dim();
        if batch == 0 {
            return Err(EngineError::InvalidShape("empty batch".to_string()));
        }
        if coords != 4 {
            return Err(EngineError::InvalidShape(format!("expected 4 box coordinates, got {coords}")));
        }
        if scores.dim() != (batch, n) || classes.dim() != (batch, n) {
            return Err(EngineError::InvalidShape(format!(
                "boxes hold {n} predictions but scores are {:?} and classes {:?}",
                scores.shape(),
                classes.shape()
            )));
        }

        let w = size.width as f64;
        let h = size.height as f64;
        let mut detections = Vec::new();

        for i in 0..n {
            // Compare at tensor precision so a 0.3 threshold drops a 0.3 score.
            let score = scores[[0, i]];
            if score <= self.score_threshold as f32 {
                continue;
            }

            let raw_class = classes[[0, i]];
            if !raw_class.is_finite() || raw_class < 0.0 {
                return Err(EngineError::InvalidShape(format!(
                    "class value {raw_class} at index {i} is not a class id"
                )));
            }
            let class_id = raw_class.round() as u32;
            let label = self.label(class_id)?;

            let ymin = boxes[[0, i, 0]] as f64 * h;
            let xmin = boxes[[0, i, 1]] as f64 * w;
            let ymax = boxes[[0, i, 2]] as f64 * h;
            let xmax = boxes[[0, i, 3]] as f64 * w;

            let id = DetectionId::try_from(i)
                .map_err(|_| EngineError::InvalidShape(format!("prediction index {i} out of range")))?;
            detections.push(
                Detection::new(id, BoundingBox::from_corners(xmin, ymin, xmax, ymax), label, score as f64)
                    .with_class(class_id),
            );
        }

        log::debug!(
            "decoded {} of {} predictions above score {}",
            detections.len(),
            n,
            self.score_threshold
        );
        Ok(detections)
    }

    /// Decode the JSON form, using `size` when the predictions carry none.
    pub fn decode_raw(
        &self,
        raw: &RawPredictions,
        size: Option<ImageSize>,
    ) -> Result<Vec<Detection>, EngineError> {
        let size = size.or_else(|| raw.image_size()).ok_or_else(|| {
            EngineError::MissingInput("image width and height for normalized predictions".to_string())
        })?;
        let (boxes, scores, classes) = raw.to_tensors()?;
        self.decode(&boxes, &scores, &classes, size)
    }
}
