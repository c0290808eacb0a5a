//! Shared helpers: error taxonomy and output path resolution.

pub mod error;
pub mod paths;

pub use error::{AppError, AppResult};
