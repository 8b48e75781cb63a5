use crate::config::Viewport;
use crate::Vec2;

/// Uniformly scales and centers `points` into the padded viewport,
/// preserving aspect ratio. A zero extent on either axis counts as 1.
pub fn fit_to_viewport(points: &[Vec2], viewport: &Viewport) -> Vec<Vec2> {
    if points.is_empty() {
        return Vec::new();
    }

    let (min, max) = bounds(points);
    let range_x = nonzero(max[0] - min[0]);
    let range_y = nonzero(max[1] - min[1]);

    let pad = viewport.padding;
    let avail_w = (viewport.width - 2.0 * pad).max(0.0);
    let avail_h = (viewport.height - 2.0 * pad).max(0.0);
    let scale = (avail_w / range_x).min(avail_h / range_y);

    let offset_x = pad + (avail_w - (max[0] - min[0]) * scale) / 2.0;
    let offset_y = pad + (avail_h - (max[1] - min[1]) * scale) / 2.0;

    points
        .iter()
        .map(|p| {
            [
                offset_x + (p[0] - min[0]) * scale,
                offset_y + (p[1] - min[1]) * scale,
            ]
        })
        .collect()
}

pub fn bounds(points: &[Vec2]) -> (Vec2, Vec2) {
    points.iter().fold(
        ([f64::INFINITY, f64::INFINITY], [f64::NEG_INFINITY, f64::NEG_INFINITY]),
        |(lo, hi), p| {
            (
                [lo[0].min(p[0]), lo[1].min(p[1])],
                [hi[0].max(p[0]), hi[1].max(p[1])],
            )
        },
    )
}

fn nonzero(range: f64) -> f64 {
    if range > 0.0 {
        range
    } else {
        1.0
    }
}
