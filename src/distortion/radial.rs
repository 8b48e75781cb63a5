use log::debug;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::{distance, Vec2};

/// Points closer than this to the origin are treated as co-located with it.
pub const MIN_RADIAL_DISTANCE: f64 = 1e-6;

/// Origin-relative radial distortion.
///
/// Every point keeps its bearing from the origin; only the radius changes.
/// A point reached faster than the row's average speed (`max_t / max_d`)
/// moves inward, a slower one moves outward, with the change scaled by the
/// configured damping. The origin itself, unreachable points and points
/// co-located with the origin keep their geographic position.
pub fn radial_distort(
    row: &[f64],
    positions: &[Vec2],
    origin: usize,
    config: &EngineConfig,
) -> Result<Vec<Vec2>, EngineError> {
    if row.len() != positions.len() {
        return Err(EngineError::ShapeMismatch {
            what: "travel-time row",
            expected: positions.len(),
            actual: row.len(),
        });
    }
    if origin >= positions.len() {
        return Err(EngineError::OriginOutOfRange {
            index: origin,
            len: positions.len(),
        });
    }

    let center = positions[origin];
    let max_t = row
        .iter()
        .enumerate()
        .filter(|&(i, t)| i != origin && t.is_finite())
        .map(|(_, &t)| t)
        .fold(0.0_f64, f64::max);
    let max_d = positions
        .iter()
        .map(|&p| distance(center, p))
        .fold(0.0_f64, f64::max);

    if max_t <= 0.0 || max_d <= MIN_RADIAL_DISTANCE {
        debug!(
            "radial distortion skipped: max_t={} max_d={}, keeping geographic layout",
            max_t, max_d
        );
        return Ok(positions.to_vec());
    }

    let speed = max_t / max_d;
    let k = config.damping();

    let out = positions
        .iter()
        .zip(row)
        .enumerate()
        .map(|(i, (&p, &t))| {
            if i == origin {
                return p;
            }
            let dx = p[0] - center[0];
            let dy = p[1] - center[1];
            let d_geo = (dx * dx + dy * dy).sqrt();
            if !t.is_finite() || d_geo < MIN_RADIAL_DISTANCE {
                return p;
            }

            let expected = d_geo * speed;
            let ratio = t / expected;
            let new_dist = (d_geo * (1.0 + (ratio - 1.0) * k)).max(0.0);
            let theta = dy.atan2(dx);
            [
                center[0] + theta.cos() * new_dist,
                center[1] + theta.sin() * new_dist,
            ]
        })
        .collect();

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn bearing(from: Vec2, to: Vec2) -> f64 {
        (to[1] - from[1]).atan2(to[0] - from[0])
    }

    #[test]
    fn origin_is_fixed_pivot() {
        let positions = vec![[100.0, 100.0], [200.0, 100.0], [100.0, 300.0]];
        let row = vec![0.0, 60.0, 300.0];
        let out = radial_distort(&row, &positions, 0, &EngineConfig::default()).unwrap();
        assert_eq!(out[0], positions[0]);
    }

    #[test]
    fn bearings_are_preserved() {
        let positions = vec![[0.0, 0.0], [30.0, 40.0], [-80.0, 10.0], [5.0, -90.0]];
        let row = vec![0.0, 20.0, 400.0, 90.0];
        let out = radial_distort(&row, &positions, 0, &EngineConfig::default()).unwrap();
        for i in 1..positions.len() {
            assert_approx_eq!(bearing(out[0], out[i]), bearing(positions[0], positions[i]), 1e-9);
        }
    }

    #[test]
    fn point_at_average_speed_is_undistorted() {
        // max_t / max_d = 200 / 100, and B sits exactly on that speed.
        let positions = vec![[0.0, 0.0], [50.0, 0.0], [0.0, 100.0]];
        let row = vec![0.0, 100.0, 200.0];
        let out = radial_distort(&row, &positions, 0, &EngineConfig::default()).unwrap();
        assert_approx_eq!(out[1][0], 50.0, 1e-9);
        assert_approx_eq!(out[2][1], 100.0, 1e-9);
    }

    #[test]
    fn damping_scales_radial_change() {
        let positions = vec![[0.0, 0.0], [100.0, 0.0], [0.0, 100.0]];
        let row = vec![0.0, 50.0, 100.0];
        // ratio for point 1 is 0.5
        let cfg = EngineConfig {
            damping: 0.5,
            ..EngineConfig::default()
        };
        let out = radial_distort(&row, &positions, 0, &cfg).unwrap();
        assert_approx_eq!(out[1][0], 75.0, 1e-9);

        let none = EngineConfig {
            damping: 0.0,
            ..EngineConfig::default()
        };
        let out = radial_distort(&row, &positions, 0, &none).unwrap();
        assert_approx_eq!(out[1][0], 100.0, 1e-9);
    }

    #[test]
    fn colocated_point_is_left_alone() {
        let positions = vec![[10.0, 10.0], [10.0, 10.0], [50.0, 10.0]];
        let row = vec![0.0, 30.0, 60.0];
        let out = radial_distort(&row, &positions, 0, &EngineConfig::default()).unwrap();
        assert_eq!(out[1], positions[1]);
    }

    #[test]
    fn all_unreachable_keeps_geography() {
        let positions = vec![[0.0, 0.0], [10.0, 0.0]];
        let row = vec![0.0, f64::INFINITY];
        let out = radial_distort(&row, &positions, 0, &EngineConfig::default()).unwrap();
        assert_eq!(out, positions);
    }

    #[test]
    fn mismatched_row_is_rejected() {
        let err = radial_distort(&[0.0], &[[0.0, 0.0], [1.0, 1.0]], 0, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::ShapeMismatch { .. }));

        let err = radial_distort(&[0.0], &[[0.0, 0.0]], 3, &EngineConfig::default()).unwrap_err();
        assert_eq!(err, EngineError::OriginOutOfRange { index: 3, len: 1 });
    }
}
