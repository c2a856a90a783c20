//! Shared building blocks for the docscrub service: configuration and the
//! application error taxonomy.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
