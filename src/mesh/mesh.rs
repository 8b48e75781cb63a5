use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::mesh::barycentric::{barycentric, combine, is_inside};
use crate::mesh::delaunay::{triangulate, Triangulation};
use crate::mesh::idw::Warp;
use crate::spatial::{KDTree, TriangleGrid};
use crate::{lerp, Point, Vec2};

/// Smallest spacing accepted for the boundary ring and interior grid.
const MIN_SAMPLE_SPACING: f64 = 1.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// An airport; moves exactly to its target.
    Control,
    /// Pinned sample on the viewport frame.
    Boundary,
    /// Landmass grid sample; moves by interpolation only.
    Interior,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeshPoint {
    pub kind: PointKind,
    pub rest: Vec2,
    /// Identity code, set for control points built from [`Point`]s.
    pub code: Option<String>,
}

/// Control, boundary and interior points with a Delaunay triangulation over
/// their rest positions. Controls come first, in input order.
#[derive(Debug, Clone)]
pub struct Mesh {
    points: Vec<MeshPoint>,
    rest: Vec<Vec2>,
    control_count: usize,
    triangulation: Triangulation,
    locator: TriangleGrid,
}

impl Mesh {
    /// Builds the mesh over the geographic positions of `controls`.
    pub fn build<F>(controls: &[Point], contains: F, config: &EngineConfig) -> Mesh
    where
        F: Fn(Vec2) -> bool,
    {
        let rest: Vec<Vec2> = controls.iter().map(|p| p.geo).collect();
        let mut mesh = Mesh::from_positions(&rest, contains, config);
        for (mp, p) in mesh.points.iter_mut().zip(controls) {
            mp.code = Some(p.code.clone());
        }
        mesh
    }

    /// Controls at `controls`, then the frame ring and the interior grid of
    /// `config.viewport`.
    pub fn from_positions<F>(controls: &[Vec2], contains: F, config: &EngineConfig) -> Mesh
    where
        F: Fn(Vec2) -> bool,
    {
        let viewport = &config.viewport;
        let mut points: Vec<MeshPoint> = controls
            .iter()
            .map(|&rest| MeshPoint {
                kind: PointKind::Control,
                rest,
                code: None,
            })
            .collect();

        let control_index = KDTree::build(controls);
        let clear_of_controls = |p: Vec2| {
            control_index
                .nearest(p)
                .map_or(true, |(_, d)| d >= config.snap_radius)
        };

        let ring = boundary_ring(viewport.width, viewport.height, config.boundary_interval);
        let boundary_count = ring.len();
        points.extend(ring.into_iter().filter(|&p| clear_of_controls(p)).map(|rest| MeshPoint {
            kind: PointKind::Boundary,
            rest,
            code: None,
        }));

        let grid = interior_grid(viewport.width, viewport.height, config.grid_spacing);
        points.extend(
            grid.into_iter()
                .filter(|&p| contains(p) && clear_of_controls(p))
                .map(|rest| MeshPoint {
                    kind: PointKind::Interior,
                    rest,
                    code: None,
                }),
        );

        let rest: Vec<Vec2> = points.iter().map(|p| p.rest).collect();
        let triangulation = triangulate(&rest);
        let locator = TriangleGrid::build(&rest, &triangulation.triangles);

        info!(
            "built mesh: {} controls, {} of {} boundary samples, {} points, {} triangles",
            controls.len(),
            points.iter().filter(|p| p.kind == PointKind::Boundary).count(),
            boundary_count,
            points.len(),
            triangulation.len()
        );

        Mesh {
            points,
            rest,
            control_count: controls.len(),
            triangulation,
            locator,
        }
    }

    pub fn points(&self) -> &[MeshPoint] {
        &self.points
    }

    pub fn rest_positions(&self) -> &[Vec2] {
        &self.rest
    }

    pub fn control_count(&self) -> usize {
        self.control_count
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangulation.triangles
    }

    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.triangulation.edges()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the triangle containing `p` in the rest configuration,
    /// with its barycentric weights.
    pub fn locate(&self, p: Vec2) -> Option<(usize, [f64; 3])> {
        self.locator.candidates(p).iter().find_map(|&t| {
            let [a, b, c] = self.triangulation.triangles[t];
            barycentric(p, self.rest[a], self.rest[b], self.rest[c])
                .filter(is_inside)
                .map(|w| (t, w))
        })
    }

    /// Moves the controls from `originals` to `targets`.
    ///
    /// Controls land exactly on their targets, boundary points stay put and
    /// interior points follow the inverse-distance-weighted displacement of
    /// the controls.
    pub fn deform(
        &self,
        originals: &[Vec2],
        targets: &[Vec2],
        config: &EngineConfig,
    ) -> Result<DeformedMesh<'_>, EngineError> {
        if originals.len() != self.control_count {
            return Err(EngineError::ShapeMismatch {
                what: "control originals",
                expected: self.control_count,
                actual: originals.len(),
            });
        }
        let warp = Warp::new(originals, targets, config)?;

        let positions = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| match p.kind {
                PointKind::Control => targets[i],
                PointKind::Boundary => p.rest,
                PointKind::Interior => warp.apply(p.rest),
            })
            .collect();

        Ok(DeformedMesh {
            mesh: self,
            positions,
            warp,
        })
    }
}

/// A mesh together with the deformed position of every mesh point.
#[derive(Debug, Clone)]
pub struct DeformedMesh<'a> {
    mesh: &'a Mesh,
    positions: Vec<Vec2>,
    warp: Warp,
}

impl<'a> DeformedMesh<'a> {
    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<Vec2> {
        self.positions
    }

    pub fn warp(&self) -> &Warp {
        &self.warp
    }

    pub fn deformed_triangles(&self) -> Vec<[Vec2; 3]> {
        self.mesh
            .triangles()
            .iter()
            .map(|t| [self.positions[t[0]], self.positions[t[1]], self.positions[t[2]]])
            .collect()
    }

    /// Maps an arbitrary point through the deformed mesh.
    ///
    /// Inside the triangulation the point keeps its barycentric weights in
    /// the deformed triangle. Outside it, or on a degenerate triangle, the
    /// inverse-distance warp over the controls is used instead.
    pub fn transform(&self, p: Vec2) -> Vec2 {
        match self.mesh.locate(p) {
            Some((t, w)) => {
                let [a, b, c] = self.mesh.triangles()[t];
                combine(&w, self.positions[a], self.positions[b], self.positions[c])
            }
            None => {
                debug!("point ({}, {}) outside mesh, using inverse-distance fallback", p[0], p[1]);
                self.warp.apply(p)
            }
        }
    }

    /// [`transform`](Self::transform) blended linearly by `t` in `[0, 1]`.
    pub fn transform_at(&self, p: Vec2, t: f64) -> Vec2 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        lerp(p, self.transform(p), t)
    }
}

/// Samples every `interval` along the frame `[0, width] x [0, height]`,
/// corners included exactly once, walking clockwise from the top-left.
fn boundary_ring(width: f64, height: f64, interval: f64) -> Vec<Vec2> {
    let step = interval.max(MIN_SAMPLE_SPACING);
    let along = |len: f64| -> Vec<f64> {
        let mut out = vec![0.0];
        let mut s = step;
        while s < len {
            out.push(s);
            s += step;
        }
        out
    };

    let mut ring = Vec::new();
    for x in along(width) {
        ring.push([x, 0.0]);
    }
    for y in along(height) {
        ring.push([width, y]);
    }
    for x in along(width) {
        ring.push([width - x, height]);
    }
    for y in along(height) {
        ring.push([0.0, height - y]);
    }
    ring
}

/// Regular lattice strictly inside the frame.
fn interior_grid(width: f64, height: f64, spacing: f64) -> Vec<Vec2> {
    let step = spacing.max(MIN_SAMPLE_SPACING);
    let mut grid = Vec::new();
    let mut y = step;
    while y < height {
        let mut x = step;
        while x < width {
            grid.push([x, y]);
            x += step;
        }
        y += step;
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    use crate::config::Viewport;

    fn config() -> EngineConfig {
        EngineConfig {
            boundary_interval: 100.0,
            grid_spacing: 50.0,
            ..EngineConfig::default()
        }
        .with_viewport(Viewport::new(400.0, 300.0))
    }

    fn controls() -> Vec<Vec2> {
        vec![[120.0, 110.0], [280.0, 90.0], [210.0, 220.0]]
    }

    #[test]
    fn ring_has_each_corner_once() {
        let ring = boundary_ring(400.0, 300.0, 100.0);
        // 4 + 3 + 4 + 3 samples
        assert_eq!(ring.len(), 14);
        for corner in [[0.0, 0.0], [400.0, 0.0], [400.0, 300.0], [0.0, 300.0]] {
            assert_eq!(ring.iter().filter(|&&p| p == corner).count(), 1);
        }
    }

    #[test]
    fn build_orders_and_filters_points() {
        let cfg = config();
        let mesh = Mesh::from_positions(&controls(), |p| p[0] < 200.0, &cfg);
        assert_eq!(mesh.control_count(), 3);
        assert!(mesh.points()[..3].iter().all(|p| p.kind == PointKind::Control));
        assert!(mesh
            .points()
            .iter()
            .filter(|p| p.kind == PointKind::Interior)
            .all(|p| p.rest[0] < 200.0));
        assert!(!mesh.triangles().is_empty());
    }

    #[test]
    fn boundary_is_pinned_and_controls_hit_targets() {
        let cfg = config();
        let mesh = Mesh::from_positions(&controls(), |_| true, &cfg);
        let targets = vec![[60.0, 40.0], [390.0, 10.0], [100.0, 290.0]];
        let deformed = mesh.deform(&controls(), &targets, &cfg).unwrap();
        for (p, &pos) in mesh.points().iter().zip(deformed.positions()) {
            match p.kind {
                PointKind::Boundary => assert_eq!(pos, p.rest),
                PointKind::Interior => assert!(crate::is_finite(pos)),
                PointKind::Control => {}
            }
        }
        assert_eq!(&deformed.positions()[..3], &targets[..]);
    }

    #[test]
    fn transform_inside_follows_triangles() {
        let cfg = config();
        let mesh = Mesh::from_positions(&controls(), |_| true, &cfg);
        // identity deformation leaves every query in place
        let deformed = mesh.deform(&controls(), &controls(), &cfg).unwrap();
        for q in [[10.0, 10.0], [200.0, 150.0], [333.0, 277.0]] {
            let out = deformed.transform(q);
            assert_approx_eq!(out[0], q[0], 1e-9);
            assert_approx_eq!(out[1], q[1], 1e-9);
        }
        // mesh vertices map to their deformed positions
        let targets = vec![[130.0, 100.0], [270.0, 95.0], [200.0, 230.0]];
        let deformed = mesh.deform(&controls(), &targets, &cfg).unwrap();
        let out = deformed.transform(controls()[1]);
        assert_approx_eq!(out[0], 270.0, 1e-9);
        assert_approx_eq!(out[1], 95.0, 1e-9);
    }

    #[test]
    fn overlay_geometry_and_blending() {
        let cfg = config();
        let mesh = Mesh::from_positions(&controls(), |_| true, &cfg);
        assert_eq!(mesh.rest_positions().len(), mesh.len());
        let edges = mesh.edges();
        assert!(edges.iter().all(|&(a, b)| a < b && b < mesh.len()));

        let targets = vec![[130.0, 100.0], [270.0, 95.0], [200.0, 230.0]];
        let deformed = mesh.deform(&controls(), &targets, &cfg).unwrap();
        assert_eq!(deformed.deformed_triangles().len(), mesh.triangles().len());
        assert_eq!(deformed.mesh().control_count(), 3);

        let q = [190.0, 160.0];
        assert_eq!(deformed.transform_at(q, 0.0), q);
        let full = deformed.transform(q);
        let half = deformed.transform_at(q, 0.5);
        assert_approx_eq!(half[0], (q[0] + full[0]) / 2.0);
        assert_approx_eq!(half[1], (q[1] + full[1]) / 2.0);
    }

    #[test]
    fn outside_queries_use_the_control_warp() {
        let cfg = config();
        let mesh = Mesh::from_positions(&controls(), |_| true, &cfg);
        let targets = vec![[130.0, 100.0], [270.0, 95.0], [200.0, 230.0]];
        let deformed = mesh.deform(&controls(), &targets, &cfg).unwrap();
        let q = [-250.0, 40.0];
        assert_eq!(deformed.transform(q), deformed.warp().apply(q));
    }

    #[test]
    fn far_outside_query_stays_finite() {
        let cfg = config();
        let mesh = Mesh::from_positions(&controls(), |_| true, &cfg);
        let targets = vec![[130.0, 100.0], [270.0, 95.0], [200.0, 230.0]];
        let deformed = mesh.deform(&controls(), &targets, &cfg).unwrap();
        let out = deformed.transform([1.0e7, -3.0e6]);
        assert!(crate::is_finite(out));
        assert!(mesh.locate([1.0e7, -3.0e6]).is_none());
    }

    #[test]
    fn deform_rejects_wrong_control_count() {
        let cfg = config();
        let mesh = Mesh::from_positions(&controls(), |_| true, &cfg);
        assert!(mesh.deform(&controls()[..2], &controls()[..2], &cfg).is_err());
    }

    #[test]
    fn build_keeps_codes() {
        let pts = vec![Point::new("DEN", [150.0, 120.0])];
        let mesh = Mesh::build(&pts, |_| false, &config());
        assert_eq!(mesh.points()[0].code.as_deref(), Some("DEN"));
        assert_eq!(mesh.control_count(), 1);
    }

    #[test]
    fn frame_follows_config_viewport() {
        let cfg = config().with_viewport(Viewport::new(500.0, 250.0));
        let mesh = Mesh::from_positions(&controls(), |_| true, &cfg);
        let boundary: Vec<Vec2> = mesh
            .points()
            .iter()
            .filter(|p| p.kind == PointKind::Boundary)
            .map(|p| p.rest)
            .collect();
        assert!(boundary.contains(&[500.0, 250.0]));
        assert!(boundary.iter().all(|p| p[0] <= 500.0 && p[1] <= 250.0));
    }
}
