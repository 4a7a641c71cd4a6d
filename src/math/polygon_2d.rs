use super::{cross_vec, vector, Point};

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let origin = points[0];
    let mut sum = 0.0;
    for i in 1..n - 1 {
        let a = vector(origin, points[i]);
        let b = vector(origin, points[i + 1]);
        sum += cross_vec(a, b) as f64;
    }
    sum * 0.5
}

/// Rotates a ring so it starts at its smallest vertex: least x, then
/// least y.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Point]) -> Vec<Point> {
    let Some(best) = points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| **p)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}
