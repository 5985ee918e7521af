//! Engine configuration
//!
//! Tunables shared by the classifier and the normalizer. Every field has
//! a default, so an empty `version: 1` file is a valid configuration.

use regex::Regex;

use super::error::{ConfigError, ConfigResult};
use super::io::{ClassifierSection, ConfigExportV1, NormalizerSection};
use crate::shared::utils::generic_helpers::DEFAULT_METAVARIABLE_PATTERN;

/// Bytes read by content-regex predicates
pub const DEFAULT_FIRST_BLOCK_SIZE: usize = 4096;

/// Upper bound for `first_block_size` (1 MiB)
pub const MAX_FIRST_BLOCK_SIZE: usize = 1024 * 1024;

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Extensions that count as executable without a permission check
pub fn default_executable_extensions() -> Vec<String> {
    [".exe", ".bat", ".cmd"].iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub first_block_size: usize,
    pub executable_extensions: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            first_block_size: DEFAULT_FIRST_BLOCK_SIZE,
            executable_extensions: default_executable_extensions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub metavariable_pattern: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            metavariable_pattern: DEFAULT_METAVARIABLE_PATTERN.to_string(),
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub normalizer: NormalizerConfig,
}

impl EngineConfig {
    /// Load from a YAML file
    pub fn from_yaml(path: &str) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        // Checked on the untyped value first so a missing version gets
        // its own error instead of a generic serde message.
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        let version = raw
            .get("version")
            .ok_or(ConfigError::MissingVersion)?
            .as_u64()
            .ok_or_else(|| ConfigError::Validation("'version' must be an integer".to_string()))?;
        let version = u32::try_from(version).unwrap_or(u32::MAX);
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let export: ConfigExportV1 = serde_yaml::from_value(raw)?;

        let mut config = Self::default();
        if let Some(section) = export.classifier {
            if let Some(size) = section.first_block_size {
                config.classifier.first_block_size = size;
            }
            if let Some(exts) = section.executable_extensions {
                config.classifier.executable_extensions = exts;
            }
        }
        if let Some(section) = export.normalizer {
            if let Some(pattern) = section.metavariable_pattern {
                config.normalizer.metavariable_pattern = pattern;
            }
        }

        config.validate()?;
        tracing::debug!(
            first_block_size = config.classifier.first_block_size,
            "loaded engine configuration"
        );
        Ok(config)
    }

    /// Export to YAML (always writes every field)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            classifier: Some(ClassifierSection {
                first_block_size: Some(self.classifier.first_block_size),
                executable_extensions: Some(self.classifier.executable_extensions.clone()),
            }),
            normalizer: Some(NormalizerSection {
                metavariable_pattern: Some(self.normalizer.metavariable_pattern.clone()),
            }),
        };
        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }

    /// Range and consistency checks
    pub fn validate(&self) -> ConfigResult<()> {
        let size = self.classifier.first_block_size;
        if !(1..=MAX_FIRST_BLOCK_SIZE).contains(&size) {
            return Err(ConfigError::range_with_hint(
                "classifier.first_block_size",
                size,
                1,
                MAX_FIRST_BLOCK_SIZE,
                "Content predicates need at least one byte and read at most 1 MiB",
            ));
        }

        for ext in &self.classifier.executable_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(ConfigError::Validation(format!(
                    "classifier.executable_extensions: '{}' must start with '.'",
                    ext
                )));
            }
        }

        Regex::new(&self.normalizer.metavariable_pattern).map_err(|e| {
            ConfigError::Validation(format!("normalizer.metavariable_pattern: {}", e))
        })?;

        Ok(())
    }

    /// Compiled metavariable regex (validated by `validate`)
    pub fn metavariable_regex(&self) -> ConfigResult<Regex> {
        Regex::new(&self.normalizer.metavariable_pattern).map_err(|e| {
            ConfigError::Validation(format!("normalizer.metavariable_pattern: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.classifier.first_block_size, 4096);
        assert_eq!(
            config.classifier.executable_extensions,
            vec![".exe", ".bat", ".cmd"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = EngineConfig::default();
        config.classifier.first_block_size = 512;

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("version: 1"));
        assert!(yaml.contains("first_block_size: 512"));

        let back = EngineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_yaml_loading_partial_sections() {
        let yaml_content = r#"
version: 1
classifier:
  first_block_size: 128
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();
        let path = temp_file.path().to_str().unwrap();

        let config = EngineConfig::from_yaml(path).unwrap();
        assert_eq!(config.classifier.first_block_size, 128);
        assert_eq!(
            config.classifier.executable_extensions,
            default_executable_extensions()
        );
        assert_eq!(
            config.normalizer.metavariable_pattern,
            DEFAULT_METAVARIABLE_PATTERN
        );
    }

    #[test]
    fn test_yaml_missing_version() {
        let result = EngineConfig::from_yaml_str("classifier:\n  first_block_size: 10\n");
        assert!(matches!(result, Err(ConfigError::MissingVersion)));
    }

    #[test]
    fn test_yaml_unsupported_version() {
        let result = EngineConfig::from_yaml_str("version: 2\n");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::UnsupportedVersion { found: 2, .. }
        ));
    }

    #[test]
    fn test_yaml_unknown_field_rejected() {
        let result = EngineConfig::from_yaml_str("version: 1\nclassifier:\n  block: 3\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_validate_range() {
        let mut config = EngineConfig::default();
        config.classifier.first_block_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Range { .. })));

        config.classifier.first_block_size = MAX_FIRST_BLOCK_SIZE + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Range { .. })));
    }

    #[test]
    fn test_validate_bad_metavariable_pattern() {
        let yaml = "version: 1\nnormalizer:\n  metavariable_pattern: \"^\\\\$[A-Z\"\n";
        assert!(matches!(
            EngineConfig::from_yaml_str(yaml),
            Err(ConfigError::Validation(_))
        ));
    }
}
