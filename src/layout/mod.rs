pub mod coordinator;
pub mod transition;
