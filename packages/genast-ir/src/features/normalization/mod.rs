//! Normalization Feature
//!
//! Python syntax tree → generic AST.
//!
//! ## Structure
//! - `ports/` - Normalizer trait
//! - `application/` - NormalizeFilesUseCase (parse + resolve + normalize)
//! - `infrastructure/` - Python normalizer

pub mod application;
pub mod infrastructure;
pub mod ports;

// Re-exports
pub use application::NormalizeFilesUseCase;
pub use infrastructure::PythonNormalizer;
pub use ports::Normalizer;
