//! Point series for the ROC and precision-recall charts.

use serde::Serialize;

use crate::record::MetricSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Supplies ROC points for a metric set.
pub trait RocSource {
    fn points(&self, metrics: &MetricSet) -> Vec<CurvePoint>;
}

/// Fixed placeholder polyline. It ignores the metric set entirely; backends do
/// not yet report per-threshold rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IllustrativeRoc;

pub const ILLUSTRATIVE_ROC: [CurvePoint; 6] = [
    CurvePoint::new(0.0, 0.0),
    CurvePoint::new(0.1, 0.4),
    CurvePoint::new(0.2, 0.6),
    CurvePoint::new(0.4, 0.75),
    CurvePoint::new(0.6, 0.85),
    CurvePoint::new(1.0, 1.0),
];

impl RocSource for IllustrativeRoc {
    fn points(&self, _metrics: &MetricSet) -> Vec<CurvePoint> {
        ILLUSTRATIVE_ROC.to_vec()
    }
}

/// Any closure over the metric set can stand in as a source.
impl<F> RocSource for F
where
    F: Fn(&MetricSet) -> Vec<CurvePoint>,
{
    fn points(&self, metrics: &MetricSet) -> Vec<CurvePoint> {
        self(metrics)
    }
}

pub fn build_roc(metrics: &MetricSet) -> Vec<CurvePoint> {
    build_roc_with(&IllustrativeRoc, metrics)
}

pub fn build_roc_with(source: &dyn RocSource, metrics: &MetricSet) -> Vec<CurvePoint> {
    source.points(metrics)
}

/// Three-point summary `(1, p), (r, p), (0, 0)`. Missing values read as 0.
pub fn build_precision_recall(metrics: &MetricSet) -> Vec<CurvePoint> {
    let precision = metrics.precision.unwrap_or(0.0);
    let recall = metrics.recall.unwrap_or(0.0);
    vec![
        CurvePoint::new(1.0, precision),
        CurvePoint::new(recall, precision),
        CurvePoint::new(0.0, 0.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roc_anchor_points() {
        let pts = build_roc(&MetricSet::default());
        let pairs: Vec<(f64, f64)> = pts.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(
            pairs,
            vec![(0.0, 0.0), (0.1, 0.4), (0.2, 0.6), (0.4, 0.75), (0.6, 0.85), (1.0, 1.0)]
        );
    }

    #[test]
    fn test_roc_ignores_metrics() {
        let m = MetricSet {
            roc_auc: Some(0.51),
            ..Default::default()
        };
        assert_eq!(build_roc(&m), build_roc(&MetricSet::default()));
    }

    #[test]
    fn test_injected_roc_source() {
        let diagonal = |_: &MetricSet| vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)];
        let pts = build_roc_with(&diagonal, &MetricSet::default());
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1], CurvePoint::new(1.0, 1.0));
    }

    #[test]
    fn test_precision_recall_points() {
        let m = MetricSet {
            precision: Some(0.7),
            recall: Some(0.5),
            ..Default::default()
        };
        assert_eq!(
            build_precision_recall(&m),
            vec![
                CurvePoint::new(1.0, 0.7),
                CurvePoint::new(0.5, 0.7),
                CurvePoint::new(0.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_precision_recall_missing_reads_zero() {
        let pts = build_precision_recall(&MetricSet::default());
        assert_eq!(pts[0], CurvePoint::new(1.0, 0.0));
        assert_eq!(pts[1], CurvePoint::new(0.0, 0.0));
        assert_eq!(pts[2], CurvePoint::new(0.0, 0.0));
    }
}
