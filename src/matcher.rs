use crate::similarity::score_with;
use crate::types::{Detection, GroundTruthComponent, MatchConfig, MatchedDetection, Similarity};

impl MatchConfig {
    /// Both gates are strict: equality on either threshold rejects the pair.
    pub fn accepts(&self, s: &Similarity) -> bool {
        s.corner_distance < self.distance_threshold && s.overlap_ratio > self.overlap_threshold
    }
}

fn match_detection(
    components: &[GroundTruthComponent],
    detection: &Detection,
    cfg: &MatchConfig,
) -> Vec<MatchedDetection> {
    components
        .iter()
        .filter_map(|component| {
            let s = score_with(cfg.metric, component, detection);
            cfg.accepts(&s).then(|| MatchedDetection {
                detection: detection.clone(),
                component_id: component.id.clone(),
                overlap_ratio: s.overlap_ratio,
                corner_distance: s.corner_distance,
            })
        })
        .collect()
}

/// Pairs every detection with every component and keeps the accepted pairs.
///
/// Output is detection-major. A detection accepted by several components
/// appears once per component.
pub fn match_boxes(
    components: &[GroundTruthComponent],
    detections: &[Detection],
    cfg: &MatchConfig,
) -> Vec<MatchedDetection> {
    if components.is_empty() || detections.is_empty() {
        return Vec::new();
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        detections
            .par_iter()
            .flat_map_iter(|d| match_detection(components, d, cfg))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        detections
            .iter()
            .flat_map(|d| match_detection(components, d, cfg))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, OverlapMetric};

    fn comp(id: &str, x: f64, y: f64, w: f64, h: f64) -> GroundTruthComponent {
        GroundTruthComponent::new(id, BoundingBox::new(x, y, w, h), "icon")
    }

    fn det(id: u32, x: f64, y: f64, w: f64, h: f64) -> Detection {
        Detection::new(id, BoundingBox::new(x, y, w, h), "icon", 0.8)
    }

    #[test]
    fn nearby_contained_detection_matches() {
        let components = vec![comp("c1", 0.0, 0.0, 100.0, 100.0)];
        let detections = vec![det(1, 10.0, 10.0, 50.0, 50.0), det(2, 500.0, 500.0, 20.0, 20.0)];
        let matched = match_boxes(&components, &detections, &MatchConfig::default());

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id(), 1);
        assert_eq!(matched[0].component_id, "c1");
        assert!((matched[0].overlap_ratio - 1.0).abs() < 1e-9);
        assert!((matched[0].corner_distance - 200f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn distance_exactly_at_threshold_is_rejected() {
        // 30-40-50 triangle between the top-left corners.
        let components = vec![comp("c1", 0.0, 0.0, 200.0, 200.0)];
        let at = vec![det(1, 30.0, 40.0, 20.0, 20.0)];
        assert!(match_boxes(&components, &at, &MatchConfig::default()).is_empty());

        let inside = vec![det(1, 30.0, 39.0, 20.0, 20.0)];
        assert_eq!(match_boxes(&components, &inside, &MatchConfig::default()).len(), 1);
    }

    #[test]
    fn ratio_exactly_at_threshold_is_rejected() {
        // Detection 10x10 sticking 1px into the component: 10/100 = 0.1.
        let components = vec![comp("c1", 0.0, 0.0, 100.0, 100.0)];
        let at = vec![det(1, 0.0, 99.0, 10.0, 10.0)];
        let cfg = MatchConfig {
            distance_threshold: 1000.0,
            ..MatchConfig::default()
        };
        assert!(match_boxes(&components, &at, &cfg).is_empty());

        let above = vec![det(1, 0.0, 98.0, 10.0, 10.0)];
        assert_eq!(match_boxes(&components, &above, &cfg).len(), 1);
    }

    #[test]
    fn fractional_ratio_at_or_below_threshold_is_rejected() {
        // Widths of k * 5/8 put exactly a tenth of the box, k/16 px, inside
        // the component's right edge with every coordinate representable.
        let components = vec![comp("c1", 0.0, 0.0, 100.0, 100.0)];
        let cfg = MatchConfig {
            distance_threshold: 1e6,
            ..MatchConfig::default()
        };
        for k in 1..=400 {
            let w = k as f64 * 0.625;
            let x = 100.0 - k as f64 / 16.0;
            let at = vec![det(1, x, 20.25, w, 8.5)];
            let under = vec![det(1, x + 1.0 / 64.0, 20.25, w, 8.5)];
            let over = vec![det(1, x - 1.0 / 64.0, 20.25, w, 8.5)];
            assert!(match_boxes(&components, &at, &cfg).is_empty(), "k = {k}");
            assert!(match_boxes(&components, &under, &cfg).is_empty(), "k = {k}");
            assert_eq!(match_boxes(&components, &over, &cfg).len(), 1, "k = {k}");
        }
    }

    #[test]
    fn fractional_boundary_follows_coordinate_extents() {
        let c = comp("c1", 0.0, 0.0, 100.0, 100.0);
        let cfg = MatchConfig {
            distance_threshold: 1e6,
            ..MatchConfig::default()
        };
        for k in 0..500 {
            let w = 10.0 + k as f64 * 0.37;
            let d = det(1, 100.0 - w * 0.1, 33.3, w, 12.7);
            let b = d.bbox;
            let height = b.bottom() - b.y;
            let expected = ((100.0 - b.x) * height) / ((b.right() - b.x) * height);

            let matched = match_boxes(std::slice::from_ref(&c), &[d], &cfg);
            assert_eq!(matched.len(), usize::from(expected > 0.1), "w = {w}");
            if let Some(m) = matched.first() {
                assert_eq!(m.overlap_ratio, expected);
            }
        }
    }

    #[test]
    fn fractional_contained_detection_matches_with_ratio_one() {
        let components = vec![comp("c1", 0.0, 0.0, 100.0, 100.0)];
        let detections = vec![det(1, 10.1, 10.3, 50.7, 33.3)];
        let matched = match_boxes(&components, &detections, &MatchConfig::default());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].overlap_ratio, 1.0);
    }

    #[test]
    fn disjoint_pair_never_matches_even_when_close() {
        let components = vec![comp("c1", 0.0, 0.0, 10.0, 10.0)];
        let detections = vec![det(1, 12.0, 0.0, 10.0, 10.0)];
        assert!(match_boxes(&components, &detections, &MatchConfig::default()).is_empty());
    }

    #[test]
    fn detection_matching_two_components_appears_twice() {
        let components = vec![
            comp("c1", 0.0, 0.0, 100.0, 100.0),
            comp("c2", 5.0, 5.0, 80.0, 80.0),
        ];
        let detections = vec![det(1, 10.0, 10.0, 50.0, 50.0)];
        let matched = match_boxes(&components, &detections, &MatchConfig::default());

        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|m| m.id() == 1));
        let ids: Vec<&str> = matched.iter().map(|m| m.component_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn empty_inputs_give_empty_output() {
        let components = vec![comp("c1", 0.0, 0.0, 100.0, 100.0)];
        let detections = vec![det(1, 10.0, 10.0, 50.0, 50.0)];
        let cfg = MatchConfig::default();
        assert!(match_boxes(&[], &detections, &cfg).is_empty());
        assert!(match_boxes(&components, &[], &cfg).is_empty());
    }

    #[test]
    fn zero_area_detection_is_never_matched() {
        let components = vec![comp("c1", 0.0, 0.0, 100.0, 100.0)];
        let detections = vec![det(1, 10.0, 10.0, 0.0, 40.0)];
        assert!(match_boxes(&components, &detections, &MatchConfig::default()).is_empty());
    }

    #[test]
    fn iou_metric_can_reject_what_detection_area_accepts() {
        let components = vec![comp("c1", 0.0, 0.0, 200.0, 200.0)];
        let detections = vec![det(1, 10.0, 10.0, 20.0, 20.0)];
        let area_cfg = MatchConfig::default();
        let iou_cfg = MatchConfig {
            metric: OverlapMetric::Iou,
            ..MatchConfig::default()
        };
        assert_eq!(match_boxes(&components, &detections, &area_cfg).len(), 1);
        assert!(match_boxes(&components, &detections, &iou_cfg).is_empty());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let components = vec![
            comp("c1", 0.0, 0.0, 100.0, 100.0),
            comp("c2", 200.0, 0.0, 50.0, 50.0),
        ];
        let detections = vec![
            det(1, 10.0, 10.0, 50.0, 50.0),
            det(2, 210.0, 5.0, 30.0, 30.0),
            det(3, 900.0, 900.0, 10.0, 10.0),
        ];
        let cfg = MatchConfig::default();
        let first = match_boxes(&components, &detections, &cfg);
        let second = match_boxes(&components, &detections, &cfg);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
