//! HTTP handlers for the oracle service.

pub mod analyze;
pub mod health;

pub use analyze::{analyze_image, API_KEY_HEADER, FILE_FIELD};
pub use health::{health_check, root, ROOT_MESSAGE};
