use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::distortion::align::align_to_reference;
use crate::distortion::fit::fit_to_viewport;
use crate::distortion::mds::classical_mds_2d;
use crate::distortion::radial::radial_distort;
use crate::error::EngineError;
use crate::matrix::sanitize::{power_scale, sanitize_distances, symmetrize};
use crate::matrix::TravelTimeMatrix;
use crate::mesh::{Mesh, Warp};
use crate::{Point, Vec2};

/// Which placement the renderer is showing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Plain projected positions.
    #[default]
    Geographic,
    /// Origin-relative travel-time distortion.
    Radial,
    /// Whole-network MDS embedding, oriented onto the map.
    Mds,
}

/// Travel-time layout for `origin`, one position per input point.
pub fn compute_distorted_layout(
    row: &[f64],
    positions: &[Vec2],
    origin: usize,
    config: &EngineConfig,
) -> Result<Vec<Vec2>, EngineError> {
    radial_distort(row, positions, origin, config)
}

/// Embeds the whole matrix with classical MDS, fits it into
/// `config.viewport` and orients the result onto the geographic positions.
pub fn compute_mds_layout(
    matrix: &TravelTimeMatrix,
    positions: &[Vec2],
    config: &EngineConfig,
) -> Result<Vec<Vec2>, EngineError> {
    matrix.validate()?;
    if matrix.len() != positions.len() {
        return Err(EngineError::ShapeMismatch {
            what: "positions",
            expected: matrix.len(),
            actual: positions.len(),
        });
    }
    let distances = power_scale(
        &symmetrize(&sanitize_distances(&matrix.times)),
        config.distance_exponent,
    );
    let embedded = classical_mds_2d(&distances)?;
    let fitted = fit_to_viewport(&embedded, &config.viewport);
    let aligned = align_to_reference(&fitted, positions)?;
    debug!(
        "mds layout for {} points, alignment residual {:.3}",
        positions.len(),
        aligned.residual
    );
    Ok(aligned.points)
}

/// Dispatches on `mode`. `origin` is only used by the radial layout.
pub fn compute_layout(
    mode: LayoutMode,
    matrix: &TravelTimeMatrix,
    points: &[Point],
    origin: &str,
    config: &EngineConfig,
) -> Result<Vec<Vec2>, EngineError> {
    matrix.validate()?;
    let positions: Vec<Vec2> = points.iter().map(|p| p.geo).collect();
    if matrix.len() != points.len() {
        return Err(EngineError::ShapeMismatch {
            what: "points",
            expected: matrix.len(),
            actual: points.len(),
        });
    }
    for (i, p) in points.iter().enumerate() {
        if matrix.codes[i] != p.code {
            return Err(EngineError::UnknownCode(p.code.clone()));
        }
    }

    match mode {
        LayoutMode::Geographic => Ok(positions),
        LayoutMode::Radial => {
            let idx = matrix
                .index_of_code(origin)
                .ok_or_else(|| EngineError::UnknownCode(origin.to_string()))?;
            compute_distorted_layout(matrix.row(idx), &positions, idx, config)
        }
        LayoutMode::Mds => compute_mds_layout(matrix, &positions, config),
    }
}

/// Mesh over `points` framed by `config.viewport`.
pub fn build_mesh<F>(points: &[Point], contains: F, config: &EngineConfig) -> Mesh
where
    F: Fn(Vec2) -> bool,
{
    Mesh::build(points, contains, config)
}

/// Deformed position of every mesh point, in mesh order.
pub fn deform_mesh(
    mesh: &Mesh,
    control_originals: &[Vec2],
    control_targets: &[Vec2],
    config: &EngineConfig,
) -> Result<Vec<Vec2>, EngineError> {
    Ok(mesh
        .deform(control_originals, control_targets, config)?
        .into_positions())
}

/// Warps samples of a continuous path (e.g. a state outline) at time `t`.
pub fn warp_continuous_path(
    samples: &[Vec2],
    control_originals: &[Vec2],
    control_targets: &[Vec2],
    t: f64,
    config: &EngineConfig,
) -> Result<Vec<Vec2>, EngineError> {
    let warp = Warp::new(control_originals, control_targets, config)?;
    Ok(warp.apply_all(samples, t))
}
