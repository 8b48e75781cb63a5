use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::Vec2;

/// Rigid transform with optional axis reflections:
/// `p -> R(theta) * F * (p - source_centroid) + target_centroid`,
/// where `F` negates x and/or y.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AlignmentTransform {
    pub theta: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub source_centroid: Vec2,
    pub target_centroid: Vec2,
}

impl AlignmentTransform {
    pub fn identity() -> Self {
        AlignmentTransform {
            theta: 0.0,
            flip_x: false,
            flip_y: false,
            source_centroid: [0.0, 0.0],
            target_centroid: [0.0, 0.0],
        }
    }

    /// Pure translation taking `from` onto `to`.
    pub fn translation(from: Vec2, to: Vec2) -> Self {
        AlignmentTransform {
            source_centroid: from,
            target_centroid: to,
            ..AlignmentTransform::identity()
        }
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        let local = reflect(
            [p[0] - self.source_centroid[0], p[1] - self.source_centroid[1]],
            self.flip_x,
            self.flip_y,
        );
        let r = rotate(local, self.theta);
        [r[0] + self.target_centroid[0], r[1] + self.target_centroid[1]]
    }

    pub fn apply_all(&self, points: &[Vec2]) -> Vec<Vec2> {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

/// Outcome of [`align_to_reference`].
#[derive(Clone, Debug)]
pub struct Alignment {
    pub points: Vec<Vec2>,
    pub transform: AlignmentTransform,
    /// Sum of squared distances between aligned and reference points.
    pub residual: f64,
}

/// Orients `computed` onto `reference` (Procrustes without scaling).
///
/// Both sets are centered on their centroids; each of the four x/y
/// reflection combinations gets its closed-form optimal rotation, and the
/// combination with the lowest squared error wins. A single point snaps
/// onto its reference.
pub fn align_to_reference(computed: &[Vec2], reference: &[Vec2]) -> Result<Alignment, EngineError> {
    if computed.len() != reference.len() {
        return Err(EngineError::ShapeMismatch {
            what: "reference layout",
            expected: computed.len(),
            actual: reference.len(),
        });
    }

    match computed.len() {
        0 => {
            return Ok(Alignment {
                points: Vec::new(),
                transform: AlignmentTransform::identity(),
                residual: 0.0,
            })
        }
        1 => {
            return Ok(Alignment {
                points: vec![reference[0]],
                transform: AlignmentTransform::translation(computed[0], reference[0]),
                residual: 0.0,
            })
        }
        _ => {}
    }

    let c_src = centroid(computed);
    let c_tgt = centroid(reference);
    let src: Vec<Vec2> = computed
        .iter()
        .map(|p| [p[0] - c_src[0], p[1] - c_src[1]])
        .collect();
    let tgt: Vec<Vec2> = reference
        .iter()
        .map(|p| [p[0] - c_tgt[0], p[1] - c_tgt[1]])
        .collect();

    let mut best: Option<(f64, AlignmentTransform)> = None;
    for (flip_x, flip_y) in [(false, false), (true, false), (false, true), (true, true)] {
        let reflected: Vec<Vec2> = src.iter().map(|&p| reflect(p, flip_x, flip_y)).collect();
        let theta = optimal_rotation(&reflected, &tgt);
        let error: f64 = reflected
            .iter()
            .zip(&tgt)
            .map(|(&p, &q)| {
                let r = rotate(p, theta);
                let dx = r[0] - q[0];
                let dy = r[1] - q[1];
                dx * dx + dy * dy
            })
            .sum();

        if best.map_or(true, |(e, _)| error < e) {
            best = Some((
                error,
                AlignmentTransform {
                    theta,
                    flip_x,
                    flip_y,
                    source_centroid: c_src,
                    target_centroid: c_tgt,
                },
            ));
        }
    }

    let (residual, transform) = best.unwrap_or((0.0, AlignmentTransform::identity()));
    Ok(Alignment {
        points: transform.apply_all(computed),
        transform,
        residual,
    })
}

pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return [0.0, 0.0];
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
    [sx / n, sy / n]
}

/// theta = atan2(sum(x1*y2 - x2*y1), sum(x1*x2 + y1*y2)) over centered sets.
fn optimal_rotation(from: &[Vec2], to: &[Vec2]) -> f64 {
    let (num, den) = from
        .iter()
        .zip(to)
        .fold((0.0, 0.0), |(num, den), (a, b)| {
            (num + a[0] * b[1] - b[0] * a[1], den + a[0] * b[0] + a[1] * b[1])
        });
    num.atan2(den)
}

fn reflect(p: Vec2, flip_x: bool, flip_y: bool) -> Vec2 {
    [
        if flip_x { -p[0] } else { p[0] },
        if flip_y { -p[1] } else { p[1] },
    ]
}

fn rotate(p: Vec2, theta: f64) -> Vec2 {
    let (s, c) = theta.sin_cos();
    [p[0] * c - p[1] * s, p[0] * s + p[1] * c]
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn reference() -> Vec<Vec2> {
        vec![[100.0, 50.0], [300.0, 80.0], [250.0, 260.0], [120.0, 200.0], [180.0, 120.0]]
    }

    #[test]
    fn aligned_layout_maps_to_identity() {
        let r = reference();
        let a = align_to_reference(&r, &r).unwrap();
        assert_approx_eq!(a.transform.theta, 0.0, 1e-9);
        assert!(!a.transform.flip_x && !a.transform.flip_y);
        assert_approx_eq!(a.residual, 0.0, 1e-9);
    }

    #[test]
    fn recovers_rotation_and_reflection() {
        let r = reference();
        // mirror x, rotate by 1 rad, shift far away
        let computed: Vec<Vec2> = r
            .iter()
            .map(|&p| {
                let q = rotate([-p[0], p[1]], 1.0);
                [q[0] + 5000.0, q[1] - 700.0]
            })
            .collect();
        let a = align_to_reference(&computed, &r).unwrap();
        for (p, q) in a.points.iter().zip(&r) {
            assert_approx_eq!(p[0], q[0], 1e-6);
            assert_approx_eq!(p[1], q[1], 1e-6);
        }
    }

    #[test]
    fn single_point_snaps_to_reference() {
        let a = align_to_reference(&[[3.0, 4.0]], &[[10.0, 20.0]]).unwrap();
        assert_eq!(a.points, vec![[10.0, 20.0]]);
        assert_eq!(a.transform.apply([3.0, 4.0]), [10.0, 20.0]);
    }

    #[test]
    fn empty_and_mismatched() {
        assert!(align_to_reference(&[], &[]).unwrap().points.is_empty());
        assert!(align_to_reference(&[[0.0, 0.0]], &[]).is_err());
    }
}
