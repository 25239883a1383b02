pub mod error;
pub mod export;
pub mod merge;
pub mod model;
pub mod parse;
pub mod render;
pub mod vault;

// Re-export the error type for convenience
pub use error::MarkvaultError;
