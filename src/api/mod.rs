pub mod dashboard;
pub mod error;
pub mod manpower_request;
pub mod view;
