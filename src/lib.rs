pub mod config;
pub mod data;
pub mod distortion;
pub mod error;
pub mod layout;
pub mod matrix;
pub mod mesh;
pub mod spatial;

use serde::{Deserialize, Serialize};

pub use config::{EngineConfig, Viewport};
pub use error::EngineError;

/// Screen-plane coordinate pair.
pub type Vec2 = [f64; 2];

pub fn distance(a: Vec2, b: Vec2) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

pub fn lerp(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

pub fn is_finite(p: Vec2) -> bool {
    p[0].is_finite() && p[1].is_finite()
}

/// An airport (or any other located entity) placed on the screen plane.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub code: String,
    /// Position produced by the geographic projection.
    pub geo: Vec2,
    /// Position currently displayed; equals `geo` until a layout is applied.
    pub pos: Vec2,
}

impl Point {
    pub fn new(code: impl Into<String>, geo: Vec2) -> Self {
        Point {
            code: code.into(),
            geo,
            pos: geo,
        }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        distance(self.geo, other.geo)
    }

    pub fn distance_to_point(&self, p: Vec2) -> f64 {
        distance(self.geo, p)
    }

    pub fn reset(&mut self) {
        self.pos = self.geo;
    }
}

/// Copies the geographic positions out of a point list, preserving order.
pub fn geo_positions(points: &[Point]) -> Vec<Vec2> {
    points.iter().map(|p| p.geo).collect()
}

/// Writes computed positions back into the points' displayed positions.
pub fn apply_positions(points: &mut [Point], positions: &[Vec2]) -> Result<(), EngineError> {
    if points.len() != positions.len() {
        return Err(EngineError::ShapeMismatch {
            what: "positions",
            expected: points.len(),
            actual: positions.len(),
        });
    }
    for (point, &pos) in points.iter_mut().zip(positions) {
        point.pos = pos;
    }
    Ok(())
}
