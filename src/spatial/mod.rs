pub mod kd_tree;
pub mod triangle_grid;

pub use kd_tree::KDTree;
pub use triangle_grid::TriangleGrid;
