pub mod names;
pub mod types;

pub use names::{NameError, validate_app_name, validate_service_name};
pub use types::*;
