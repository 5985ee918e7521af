//! Configuration I/O
//!
//! YAML schema types. Loading and validation live in `engine_config.rs`.

use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<NormalizerSection>,
}

/// `classifier:` section; absent fields keep their defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_block_size: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_extensions: Option<Vec<String>>,
}

/// `normalizer:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metavariable_pattern: Option<String>,
}
