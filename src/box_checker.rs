use std::time::Instant;

use crate::correction::correction_set;
use crate::engine::{validate_components, validate_config, validate_detections, EngineError};
use crate::matcher::match_boxes;
use crate::types::{Detection, GroundTruthComponent, MatchConfig, MatchedDetection};

#[derive(Debug, Clone)]
pub struct CheckOutput {
    pub matched: Vec<MatchedDetection>,
    pub corrections: Vec<Detection>,
    pub elapse: f64,
}

/// Validates inputs, then matches detections to components and collects
/// whatever is left over.
pub struct BoxChecker {
    pub cfg: MatchConfig,
}

impl BoxChecker {
    pub fn new(cfg: MatchConfig) -> Self {
        Self { cfg }
    }

    pub fn run(
        &self,
        components: &[GroundTruthComponent],
        detections: &[Detection],
    ) -> Result<CheckOutput, EngineError> {
        let start = Instant::now();

        validate_config(&self.cfg)?;
        validate_components(components)?;
        let duplicates = validate_detections(detections)?;
        if !duplicates.is_empty() {
            log::warn!(
                "duplicate detection ids {:?}; correction set may drop unmatched boxes",
                duplicates
            );
        }

        let remote: Vec<GroundTruthComponent>;
        let components = if self.cfg.remote_only {
            remote = components.iter().filter(|c| c.remote).cloned().collect();
            log::debug!("tracking {} of {} components (remote only)", remote.len(), components.len());
            remote.as_slice()
        } else {
            components
        };

        let matched = match_boxes(components, detections, &self.cfg);
        let corrections = correction_set(detections, &matched);
        let elapse = start.elapsed().as_secs_f64();

        log::debug!(
            "{} components, {} detections: {} matched entries, {} corrections in {:.6}s",
            components.len(),
            detections.len(),
            matched.len(),
            corrections.len(),
            elapse
        );

        Ok(CheckOutput { matched, corrections, elapse })
    }
}

impl Default for BoxChecker {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}
