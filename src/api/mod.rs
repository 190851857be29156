pub mod error;
pub mod handlers;
pub mod types;

pub use error::{ApiError, ErrorBody};
pub use handlers::*;
pub use types::*;
