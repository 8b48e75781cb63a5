pub mod align;
pub mod fit;
pub mod mds;
pub mod radial;
