pub mod sanitize;
pub mod travel;

pub use travel::TravelTimeMatrix;
