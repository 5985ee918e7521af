//! Per-language predicates
//!
//! Most languages are recognized by extension only. Script languages also
//! accept extension-less executables with a matching shebang; languages
//! sharing an extension are told apart by content.

use once_cell::sync::Lazy;
use regex::Regex;

use super::predicate::Predicate;
use crate::shared::models::Lang;

/// `<?hh` header of Hack files
static HACK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^<\?hh\b")
        .unwrap_or_else(|e| unreachable!("hack header pattern is a literal and compiles: {}", e))
});

/// Predicate deciding whether a file is written in `lang`
pub fn predicate_for(lang: Lang) -> Predicate {
    let exts = lang.extensions();
    match lang {
        Lang::Javascript => Predicate::And(vec![
            Predicate::not(Predicate::has_extension(&[".min.js"])),
            Predicate::is_script(exts, &["node", "nodejs", "js"]),
        ]),
        Lang::Typescript => Predicate::And(vec![
            Predicate::not(Predicate::has_extension(&[".d.ts"])),
            Predicate::is_script(exts, &["ts-node"]),
        ]),
        Lang::Php => Predicate::And(vec![
            Predicate::is_script(exts, &["php"]),
            Predicate::not(Predicate::content_regex(HACK_HEADER.clone())),
        ]),
        Lang::Hack => Predicate::Or(vec![
            Predicate::is_script(exts, &["hhvm"]),
            Predicate::And(vec![
                Predicate::has_extension(&[".php"]),
                Predicate::Or(vec![
                    Predicate::uses_shebang_command(&["hhvm"]),
                    Predicate::content_regex(HACK_HEADER.clone()),
                ]),
            ]),
        ]),
        Lang::Python | Lang::Python2 | Lang::Python3 => {
            Predicate::is_script(exts, &["python", "python2", "python3"])
        }
        Lang::Bash => Predicate::is_script(exts, &["bash", "sh"]),
        Lang::Ruby => Predicate::is_script(exts, &["ruby"]),
        Lang::Lua => Predicate::is_script(exts, &["lua"]),
        Lang::C
        | Lang::Csharp
        | Lang::Go
        | Lang::Html
        | Lang::Java
        | Lang::Json
        | Lang::Kotlin
        | Lang::Ocaml
        | Lang::R
        | Lang::Rust
        | Lang::Scala
        | Lang::Vue
        | Lang::Yaml => Predicate::has_extension(exts),
    }
}
