//! Language classifier
//!
//! Decides from a path (and, for some languages, the first bytes of the
//! file) whether a target belongs to a language. "Not this language" is a
//! normal answer; only unreadable files produce an error, which callers
//! should treat as unknown.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::ClassifierConfig;
use crate::errors::ClassifyError;
use crate::features::lang_detection::application::evaluate::eval;
use crate::features::lang_detection::domain::{predicate_for, SkipReason};
use crate::shared::models::Lang;

/// Accepted path, or why it was skipped
pub type Classification = Result<PathBuf, SkipReason>;

#[derive(Debug, Clone, Default)]
pub struct LanguageClassifier {
    config: ClassifierConfig,
}

impl LanguageClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ClassifierConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, lang: Lang, path: &Path) -> Result<bool, ClassifyError> {
        let verdict = eval(&predicate_for(lang), path, &self.config)?;
        tracing::debug!(file = %path.display(), lang = lang.name(), verdict, "classified");
        Ok(verdict)
    }

    pub fn classify_or_reason(
        &self,
        lang: Lang,
        path: &Path,
    ) -> Result<Classification, ClassifyError> {
        if self.classify(lang, path)? {
            Ok(Ok(path.to_path_buf()))
        } else {
            Ok(Err(SkipReason::wrong_language(path.to_path_buf(), lang)))
        }
    }

    /// One verdict per path, in input order
    pub fn classify_many(
        &self,
        lang: Lang,
        paths: &[PathBuf],
    ) -> Vec<Result<bool, ClassifyError>> {
        paths
            .par_iter()
            .map(|path| {
                self.classify(lang, path).map_err(|e| {
                    tracing::warn!(file = %path.display(), error = %e, "classification unknown");
                    e
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::lang_detection::domain::SkipReasonKind;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_extension_only() {
        let c = LanguageClassifier::new();
        assert!(c.classify(Lang::Go, Path::new("main.go")).unwrap());
        assert!(!c.classify(Lang::Go, Path::new("main.py")).unwrap());
    }

    #[test]
    fn test_minified_js_and_declarations_excluded() {
        let dir = TempDir::new().unwrap();
        let min = write(&dir, "foo.min.js", "var a=1;");
        let js = write(&dir, "foo.js", "var a = 1;");
        let dts = write(&dir, "foo.d.ts", "declare const a: number;");
        let c = LanguageClassifier::new();
        assert!(!c.classify(Lang::Javascript, &min).unwrap());
        assert!(c.classify(Lang::Javascript, &js).unwrap());
        assert!(!c.classify(Lang::Typescript, &dts).unwrap());
    }

    #[test]
    fn test_php_and_hack_share_extension() {
        let dir = TempDir::new().unwrap();
        let php = write(&dir, "a.php", "<?php echo 1;");
        let hack = write(&dir, "b.php", "<?hh\nfunction f(): void {}\n");
        let c = LanguageClassifier::new();
        assert!(c.classify(Lang::Php, &php).unwrap());
        assert!(!c.classify(Lang::Hack, &php).unwrap());
        assert!(!c.classify(Lang::Php, &hack).unwrap());
        assert!(c.classify(Lang::Hack, &hack).unwrap());
    }

    #[test]
    fn test_skip_reason_names_language() {
        let c = LanguageClassifier::new();
        let result = c
            .classify_or_reason(Lang::Python, Path::new("main.go"))
            .unwrap();
        let reason = result.unwrap_err();
        assert_eq!(reason.reason, SkipReasonKind::WrongLanguage);
        assert_eq!(reason.details, "target file doesn't look like language python");
        assert_eq!(reason.skipped_rule, None);
        assert_eq!(reason.path, PathBuf::from("main.go"));
    }

    #[test]
    fn test_classify_many_keeps_order() {
        let c = LanguageClassifier::new();
        let paths = vec![
            PathBuf::from("a.rs"),
            PathBuf::from("b.py"),
            PathBuf::from("c.rs"),
        ];
        let verdicts: Vec<bool> = c
            .classify_many(Lang::Rust, &paths)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(verdicts, vec![true, false, true]);
    }
}
