use delaunator::{next_halfedge, EMPTY};
use log::debug;

use crate::Vec2;

/// Delaunay triangulation; triangle vertices index the input slice and are
/// stored counter-clockwise (in a y-up frame).
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    pub triangles: Vec<[usize; 3]>,
    edges: Vec<(usize, usize)>,
}

impl Triangulation {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Unique undirected edges, each as `(low, high)`, sorted.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.edges.clone()
    }
}

/// Triangulates `points` with `delaunator`.
///
/// Duplicate points are skipped; fewer than three non-collinear points give
/// an empty triangulation.
pub fn triangulate(points: &[Vec2]) -> Triangulation {
    if points.len() < 3 || points.iter().any(|p| !crate::is_finite(*p)) {
        return Triangulation::default();
    }

    let sites: Vec<delaunator::Point> = points
        .iter()
        .map(|&[x, y]| delaunator::Point { x, y })
        .collect();
    let raw = delaunator::triangulate(&sites);

    let triangles: Vec<[usize; 3]> = raw
        .triangles
        .chunks_exact(3)
        .map(|t| ccw(points, [t[0], t[1], t[2]]))
        .collect();

    // each interior edge appears as two opposite halfedges; keep one
    let mut edges: Vec<(usize, usize)> = (0..raw.triangles.len())
        .filter(|&e| raw.halfedges[e] == EMPTY || e > raw.halfedges[e])
        .map(|e| {
            let a = raw.triangles[e];
            let b = raw.triangles[next_halfedge(e)];
            (a.min(b), a.max(b))
        })
        .collect();
    edges.sort_unstable();

    debug!(
        "triangulated {} points into {} triangles, {} hull vertices",
        points.len(),
        triangles.len(),
        raw.hull.len()
    );
    Triangulation { triangles, edges }
}

/// Twice the signed area of `abc`; positive when counter-clockwise.
fn orient(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn ccw(points: &[Vec2], t: [usize; 3]) -> [usize; 3] {
    if orient(points[t[0]], points[t[1]], points[t[2]]) < 0.0 {
        [t[0], t[2], t[1]]
    } else {
        t
    }
}
