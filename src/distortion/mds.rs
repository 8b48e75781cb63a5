use std::f64::consts::TAU;

use log::warn;
use nalgebra::DMatrix;

use crate::error::EngineError;
use crate::Vec2;

/// SVD iteration budget per point; running out counts as a numerical
/// failure.
const SVD_ITERATIONS_PER_POINT: usize = 100;

/// Classical (Torgerson) multidimensional scaling.
///
/// Embeds a symmetric distance matrix into `dims` dimensions. The squared
/// distances are double-centered into a Gram matrix whose SVD gives the
/// embedding; for a positive-semidefinite Gram matrix the singular values
/// are its eigenvalues. Components with negative eigenvalues are ranked
/// last and contribute nothing. If the decomposition fails, points are spread
/// evenly on the unit circle instead.
pub fn classical_mds(distances: &[Vec<f64>], dims: usize) -> Result<Vec<Vec<f64>>, EngineError> {
    let n = distances.len();
    for (row, entries) in distances.iter().enumerate() {
        if entries.len() != n {
            return Err(EngineError::NotSquare {
                row,
                len: entries.len(),
                expected: n,
            });
        }
    }
    match n {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![vec![0.0; dims]]),
        _ => {}
    }

    let gram = double_centered_gram(distances);
    match embed(gram, dims) {
        Some(coords) => Ok(coords),
        None => {
            warn!("MDS decomposition failed for {} points, using circle layout", n);
            Ok(circle_layout(n, dims))
        }
    }
}

/// Two-dimensional convenience wrapper over [`classical_mds`].
pub fn classical_mds_2d(distances: &[Vec<f64>]) -> Result<Vec<Vec2>, EngineError> {
    Ok(classical_mds(distances, 2)?
        .into_iter()
        .map(|c| [c[0], c[1]])
        .collect())
}

/// B = -1/2 * J * D^2 * J with J the centering matrix.
fn double_centered_gram(distances: &[Vec<f64>]) -> DMatrix<f64> {
    let n = distances.len();
    let sq = DMatrix::from_fn(n, n, |i, j| distances[i][j] * distances[i][j]);

    let row_means: Vec<f64> = (0..n).map(|i| sq.row(i).mean()).collect();
    let col_means: Vec<f64> = (0..n).map(|j| sq.column(j).mean()).collect();
    let grand_mean = sq.mean();

    DMatrix::from_fn(n, n, |i, j| {
        -0.5 * (sq[(i, j)] - row_means[i] - col_means[j] + grand_mean)
    })
}

fn embed(gram: DMatrix<f64>, dims: usize) -> Option<Vec<Vec<f64>>> {
    if gram.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let n = gram.nrows();
    let svd = gram
        .clone()
        .try_svd(true, false, f64::EPSILON, n * SVD_ITERATIONS_PER_POINT)?;
    let u = svd.u?;

    // Singular values lose the eigenvalue sign; recover it from u' B u so
    // non-Euclidean (negative) directions are never picked as axes.
    let eigenvalues: Vec<f64> = u
        .column_iter()
        .map(|col| (col.transpose() * &gram * col)[(0, 0)])
        .collect();
    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

    let coords: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..dims)
                .map(|k| match order.get(k) {
                    Some(&c) => u[(i, c)] * eigenvalues[c].max(0.0).sqrt(),
                    None => 0.0,
                })
                .collect()
        })
        .collect();

    if coords.iter().flatten().all(|v| v.is_finite()) {
        Some(coords)
    } else {
        None
    }
}

/// `n` points evenly spaced on the unit circle in the first two dimensions.
pub fn circle_layout(n: usize, dims: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let angle = TAU * i as f64 / n as f64;
            let mut c = vec![0.0; dims];
            if dims > 0 {
                c[0] = angle.cos();
            }
            if dims > 1 {
                c[1] = angle.sin();
            }
            c
        })
        .collect()
}
