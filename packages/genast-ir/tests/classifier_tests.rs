//! Language classification against real files

mod common;

use common::*;
use genast_ir::config::{ClassifierConfig, EngineConfig};
use genast_ir::features::lang_detection::SkipReasonKind;
use genast_ir::{Lang, LanguageClassifier};
use tempfile::TempDir;

#[test]
fn test_python_file_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "foo.py", "print('hi')\n");
    let classifier = LanguageClassifier::new();
    assert!(classifier.classify(Lang::Python, &path).unwrap());
    assert!(classifier.classify(Lang::Python3, &path).unwrap());
    assert!(!classifier.classify(Lang::Go, &path).unwrap());
}

#[cfg(unix)]
#[test]
fn test_extensionless_script_with_env_shebang() {
    let dir = TempDir::new().unwrap();
    let path = write_executable(&dir, "tool", "#!/usr/bin/env python3\nprint('hi')\n");
    let classifier = LanguageClassifier::new();
    assert!(classifier.classify(Lang::Python3, &path).unwrap());
    assert!(!classifier.classify(Lang::Ruby, &path).unwrap());
}

#[test]
fn test_non_executable_script_is_not_classified_by_shebang() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "tool", "#!/usr/bin/env python3\nprint('hi')\n");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o644);
        std::fs::set_permissions(&path, perms).unwrap();
    }
    assert!(!LanguageClassifier::new()
        .classify(Lang::Python3, &path)
        .unwrap());
}

#[test]
fn test_minified_js_skipped_with_reason() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "foo.min.js", "var a=1;");
    let outcome = LanguageClassifier::new()
        .classify_or_reason(Lang::Javascript, &path)
        .unwrap();
    let reason = outcome.unwrap_err();
    assert_eq!(reason.reason, SkipReasonKind::WrongLanguage);
    assert_eq!(
        reason.details,
        "target file doesn't look like language javascript"
    );
    assert_eq!(reason.path, path);
}

#[test]
fn test_configured_executable_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "run.cmd", "#!/bin/bash\necho hi\n");
    let config = ClassifierConfig {
        executable_extensions: vec![".cmd".to_string()],
        ..ClassifierConfig::default()
    };
    // has an extension, so the shebang branch does not apply
    assert!(!LanguageClassifier::with_config(&config)
        .classify(Lang::Bash, &path)
        .unwrap());
}

#[test]
fn test_classifier_from_yaml_config() {
    let config = EngineConfig::from_yaml_str("version: 1\nclassifier:\n  first_block_size: 8\n")
        .unwrap();
    let dir = TempDir::new().unwrap();
    // marker beyond the first 8 bytes is not seen
    let path = write_file(&dir, "x.php", "<?php\n\n\n<?hh\n");
    let classifier = LanguageClassifier::with_config(&config.classifier);
    assert!(classifier.classify(Lang::Php, &path).unwrap());
    assert!(!classifier.classify(Lang::Hack, &path).unwrap());
}

#[test]
fn test_classify_many_parallel() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<_> = (0..50)
        .map(|i| {
            let name = if i % 2 == 0 { format!("f{}.rb", i) } else { format!("f{}.py", i) };
            write_file(&dir, &name, "x = 1\n")
        })
        .collect();
    let verdicts = LanguageClassifier::new().classify_many(Lang::Ruby, &paths);
    for (i, v) in verdicts.into_iter().enumerate() {
        assert_eq!(v.unwrap(), i % 2 == 0);
    }
}
