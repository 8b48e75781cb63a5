use crate::config::UNREACHABLE_FACTOR;

/// Largest finite entry of the matrix, if any.
pub fn max_finite(distances: &[Vec<f64>]) -> Option<f64> {
    distances
        .iter()
        .flatten()
        .copied()
        .filter(|d| d.is_finite())
        .fold(None, |acc, d| Some(acc.map_or(d, |m: f64| m.max(d))))
}

/// Copy of `distances` with every non-finite entry replaced by
/// `UNREACHABLE_FACTOR` times the largest finite entry. The diagonal is
/// forced to zero. With no finite entries at all, unreachable becomes zero.
pub fn sanitize_distances(distances: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let fill = max_finite(distances)
        .map(|m| m * UNREACHABLE_FACTOR)
        .unwrap_or(0.0);
    distances
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, &d)| {
                    if i == j {
                        0.0
                    } else if d.is_finite() {
                        d
                    } else {
                        fill
                    }
                })
                .collect()
        })
        .collect()
}

/// Raises every distance to `exponent`, compressing long-tail outliers
/// when `exponent < 1`.
pub fn power_scale(distances: &[Vec<f64>], exponent: f64) -> Vec<Vec<f64>> {
    distances
        .iter()
        .map(|row| row.iter().map(|&d| d.max(0.0).powf(exponent)).collect())
        .collect()
}

/// Averages each entry with its transpose.
pub fn symmetrize(distances: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = distances.len();
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| 0.5 * (distances[i][j] + distances[j][i]))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn infinite_entries_become_one_and_a_half_max() {
        let d = vec![
            vec![0.0, 100.0, f64::INFINITY],
            vec![100.0, 0.0, 200.0],
            vec![f64::NAN, 200.0, 0.0],
        ];
        let s = sanitize_distances(&d);
        assert_approx_eq!(s[0][2], 300.0);
        assert_approx_eq!(s[2][0], 300.0);
        assert_approx_eq!(s[1][2], 200.0);
        assert!(s.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn all_unreachable_sanitizes_to_zero() {
        let d = vec![vec![0.0, f64::INFINITY], vec![f64::INFINITY, 0.0]];
        assert_eq!(sanitize_distances(&d), vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn power_scale_compresses_outliers() {
        let d = vec![vec![0.0, 100.0], vec![1000.0, 0.0]];
        let s = power_scale(&d, 0.7);
        assert_approx_eq!(s[0][1], 100f64.powf(0.7));
        assert!(s[1][0] / s[0][1] < 10.0);
        assert_eq!(s[0][0], 0.0);
    }

    #[test]
    fn symmetrize_averages_directions() {
        let d = vec![vec![0.0, 100.0], vec![140.0, 0.0]];
        let s = symmetrize(&d);
        assert_approx_eq!(s[0][1], 120.0);
        assert_approx_eq!(s[1][0], 120.0);
    }
}
