mod error;
mod export;
mod health;
mod segment;

pub use error::{ErrorResponse, executor_error_response, status_for};
pub use export::export_handler;
pub use health::health_handler;
pub use segment::segment_handler;
