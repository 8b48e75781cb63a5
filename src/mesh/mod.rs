pub mod barycentric;
pub mod delaunay;
pub mod idw;
pub mod mesh;

pub use idw::Warp;
pub use mesh::{Mesh, PointKind};
