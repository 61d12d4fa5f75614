pub mod manpower_request;
pub mod role;
pub mod status;
