pub mod error_handling;
pub mod request_id;

pub use error_handling::ApiError;
pub use request_id::request_id_middleware;
