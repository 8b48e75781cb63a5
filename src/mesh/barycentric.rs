use crate::Vec2;

/// Triangles with |doubled signed area| below this are degenerate.
pub const DEGENERATE_AREA: f64 = 1e-12;
/// Slack on the inside test so points on a shared edge are accepted.
pub const INSIDE_TOLERANCE: f64 = 1e-9;

/// Barycentric weights of `p` relative to triangle `(a, b, c)`, or `None`
/// for a zero-area triangle.
pub fn barycentric(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<[f64; 3]> {
    let det = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    if !det.is_finite() || det.abs() < DEGENERATE_AREA {
        return None;
    }
    let w0 = ((b[1] - c[1]) * (p[0] - c[0]) + (c[0] - b[0]) * (p[1] - c[1])) / det;
    let w1 = ((c[1] - a[1]) * (p[0] - c[0]) + (a[0] - c[0]) * (p[1] - c[1])) / det;
    Some([w0, w1, 1.0 - w0 - w1])
}

pub fn is_inside(weights: &[f64; 3]) -> bool {
    weights.iter().all(|&w| w >= -INSIDE_TOLERANCE)
}

/// Weighted combination of three points.
pub fn combine(weights: &[f64; 3], a: Vec2, b: Vec2, c: Vec2) -> Vec2 {
    [
        weights[0] * a[0] + weights[1] * b[0] + weights[2] * c[0],
        weights[0] * a[1] + weights[1] * b[1] + weights[2] * c[1],
    ]
}
