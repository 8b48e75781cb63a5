use crate::distortion::fit::bounds;
use crate::Vec2;

/// Uniform bucket grid over triangle bounding boxes.
///
/// Each cell lists the triangles whose bounding box overlaps it, so point
/// location only has to test a handful of candidates instead of scanning
/// every triangle.
#[derive(Debug, Clone)]
pub struct TriangleGrid {
    origin: Vec2,
    cell_size: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

impl TriangleGrid {
    pub fn build(vertices: &[Vec2], triangles: &[[usize; 3]]) -> Self {
        if vertices.is_empty() || triangles.is_empty() {
            return TriangleGrid {
                origin: [0.0, 0.0],
                cell_size: 1.0,
                cols: 0,
                rows: 0,
                cells: Vec::new(),
            };
        }

        let (min, max) = bounds(vertices);
        let width = (max[0] - min[0]).max(1.0);
        let height = (max[1] - min[1]).max(1.0);
        // about one triangle per cell on average
        let target_cells = triangles.len().max(1) as f64;
        let cell_size = ((width * height) / target_cells).sqrt().max(1e-6);
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);

        let mut grid = TriangleGrid {
            origin: min,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        };

        for (t, tri) in triangles.iter().enumerate() {
            let pts = [vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]];
            let (lo, hi) = bounds(&pts);
            let (c0, r0) = grid.cell_of(lo);
            let (c1, r1) = grid.cell_of(hi);
            for r in r0..=r1 {
                for c in c0..=c1 {
                    grid.cells[r * cols + c].push(t);
                }
            }
        }
        grid
    }

    fn cell_of(&self, p: Vec2) -> (usize, usize) {
        let c = ((p[0] - self.origin[0]) / self.cell_size).floor();
        let r = ((p[1] - self.origin[1]) / self.cell_size).floor();
        (
            (c.max(0.0) as usize).min(self.cols - 1),
            (r.max(0.0) as usize).min(self.rows - 1),
        )
    }

    /// Triangles whose bounding box may contain `p`. Empty when `p` lies
    /// outside the gridded area.
    pub fn candidates(&self, p: Vec2) -> &[usize] {
        if self.cells.is_empty() || !crate::is_finite(p) {
            return &[];
        }
        let max_x = self.origin[0] + self.cols as f64 * self.cell_size;
        let max_y = self.origin[1] + self.rows as f64 * self.cell_size;
        if p[0] < self.origin[0] || p[1] < self.origin[1] || p[0] > max_x || p[1] > max_y {
            return &[];
        }
        let (c, r) = self.cell_of(p);
        &self.cells[r * self.cols + c]
    }
}
