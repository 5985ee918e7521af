//! Predicate evaluation

use std::path::Path;

use crate::config::ClassifierConfig;
use crate::errors::ClassifyError;
use crate::features::lang_detection::domain::{Predicate, Shebang, Test};
use crate::features::lang_detection::infrastructure::fs_probe;

/// Evaluate `predicate` for `path`, short-circuiting like `&&` / `||`
pub fn eval(
    predicate: &Predicate,
    path: &Path,
    config: &ClassifierConfig,
) -> Result<bool, ClassifyError> {
    match predicate {
        Predicate::And(ps) => {
            for p in ps {
                if !eval(p, path, config)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Or(ps) => {
            for p in ps {
                if eval(p, path, config)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Not(p) => Ok(!eval(p, path, config)?),
        Predicate::Test(test) => eval_test(test, path, config),
    }
}

fn eval_test(test: &Test, path: &Path, config: &ClassifierConfig) -> Result<bool, ClassifyError> {
    match test {
        Test::HasExtension(exts) => Ok(has_extension(path, exts)),
        Test::HasAnExtension => Ok(path.extension().is_some()),
        Test::IsExecutable => fs_probe::is_executable(path, &config.executable_extensions),
        Test::UsesShebangCommand(names) => {
            let command = fs_probe::first_line(path)?
                .as_deref()
                .and_then(Shebang::parse)
                .and_then(|s| s.command());
            Ok(command.map_or(false, |c| names.iter().any(|n| *n == c.name)))
        }
        Test::ContentRegex(re) => Ok(fs_probe::first_block(path, config.first_block_size)?
            .map_or(false, |block| re.is_match(&block))),
    }
}

/// Full-suffix comparison on the file name
fn has_extension(path: &Path, exts: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    exts.iter()
        .any(|ext| name.len() > ext.len() && name.ends_with(ext.as_str()))
}
