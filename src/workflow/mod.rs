pub mod dashboard;
pub mod gate;
pub mod projector;
pub mod query;
pub mod transition;
