//! Configuration System
//!
//! Versioned YAML configuration for the classifier and the normalizer.
//!
//! ```rust,ignore
//! use genast_ir::config::EngineConfig;
//!
//! let config = EngineConfig::from_yaml("genast.yaml")?;
//! let classifier = LanguageClassifier::with_config(&config.classifier);
//! ```

pub mod engine_config;
pub mod error;
pub mod io;

// Re-exports
pub use engine_config::{
    default_executable_extensions, ClassifierConfig, EngineConfig, NormalizerConfig,
    DEFAULT_FIRST_BLOCK_SIZE, MAX_FIRST_BLOCK_SIZE,
};
pub use error::{ConfigError, ConfigResult};
pub use io::{ClassifierSection, ConfigExportV1, NormalizerSection};
