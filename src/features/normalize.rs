//! Feature normalization and hand-size measurement

use super::landmarks::{LandmarkFrame, FLAT_LEN};

/// Floor for the scale divisor so coincident points don't divide by zero
pub const SCALE_EPSILON: f64 = 1e-8;

/// Classifier-ready features: centered x's, then y's, then z's
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap an already-normalized row (corpus files store rows this way)
    pub fn from_row(values: Vec<f64>) -> Option<Self> {
        (values.len() == FLAT_LEN).then_some(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean distance to another vector
    pub fn distance(&self, other: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Center each axis on its mean and divide by the largest per-axis
/// standard deviation.
pub fn normalize(frame: &LandmarkFrame) -> FeatureVector {
    let points = frame.points();
    let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let mut ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let mut zs: Vec<f64> = points.iter().map(|p| p.z).collect();

    center(&mut xs);
    center(&mut ys);
    center(&mut zs);

    let scale = std_dev(&xs)
        .max(std_dev(&ys))
        .max(std_dev(&zs))
        .max(SCALE_EPSILON);

    let mut out = Vec::with_capacity(FLAT_LEN);
    out.extend(xs.iter().map(|v| v / scale));
    out.extend(ys.iter().map(|v| v / scale));
    out.extend(zs.iter().map(|v| v / scale));
    FeatureVector(out)
}

/// Bounding-box area of the frame in the image plane (x/y only)
pub fn hand_area(frame: &LandmarkFrame) -> f64 {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);

    for p in frame.points() {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    (max_x - min_x) * (max_y - min_y)
}

fn center(values: &mut [f64]) {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    for v in values.iter_mut() {
        *v -= mean;
    }
}

/// Population standard deviation of already-centered values
fn std_dev(centered: &[f64]) -> f64 {
    let var = centered.iter().map(|v| v * v).sum::<f64>() / centered.len() as f64;
    var.sqrt()
}
