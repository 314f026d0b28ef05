pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod wrapper;
