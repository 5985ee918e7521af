//! Classifier predicates
//!
//! An immutable boolean expression over path and content tests, evaluated
//! left to right with short-circuiting.

use regex::Regex;

#[derive(Debug, Clone)]
pub enum Test {
    /// Path ends with one of the suffixes (`.min.js` is one suffix)
    HasExtension(Vec<String>),
    /// File name contains an extension at all
    HasAnExtension,
    /// Regular file with an execute bit, or a configured executable extension
    IsExecutable,
    /// Shebang resolves to one of these command names
    UsesShebangCommand(Vec<String>),
    /// Regex matches the first block of the file
    ContentRegex(Regex),
}

#[derive(Debug, Clone)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Test(Test),
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl Predicate {
    pub fn has_extension(exts: &[&str]) -> Self {
        Predicate::Test(Test::HasExtension(strings(exts)))
    }

    pub fn has_an_extension() -> Self {
        Predicate::Test(Test::HasAnExtension)
    }

    pub fn is_executable() -> Self {
        Predicate::Test(Test::IsExecutable)
    }

    pub fn uses_shebang_command(names: &[&str]) -> Self {
        Predicate::Test(Test::UsesShebangCommand(strings(names)))
    }

    pub fn content_regex(re: Regex) -> Self {
        Predicate::Test(Test::ContentRegex(re))
    }

    pub fn not(p: Predicate) -> Self {
        Predicate::Not(Box::new(p))
    }

    /// Extension-less executable with a matching shebang, or one of `exts`
    pub fn is_script(exts: &[&str], commands: &[&str]) -> Self {
        Predicate::Or(vec![
            Predicate::And(vec![
                Predicate::not(Predicate::has_an_extension()),
                Predicate::is_executable(),
                Predicate::uses_shebang_command(commands),
            ]),
            Predicate::has_extension(exts),
        ])
    }
}
