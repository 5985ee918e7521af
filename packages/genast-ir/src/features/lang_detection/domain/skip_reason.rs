//! Skip records
//!
//! Shape consumed by reporting layers: field names and the serialized
//! reason tag are fixed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::models::Lang;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReasonKind {
    WrongLanguage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReason {
    pub path: PathBuf,
    pub reason: SkipReasonKind,
    pub details: String,
    pub skipped_rule: Option<String>,
}

impl SkipReason {
    pub fn wrong_language(path: PathBuf, lang: Lang) -> Self {
        Self {
            path,
            reason: SkipReasonKind::WrongLanguage,
            details: format!("target file doesn't look like language {}", lang.name()),
            skipped_rule: None,
        }
    }
}
