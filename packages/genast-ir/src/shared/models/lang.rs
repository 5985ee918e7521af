//! Target languages
//!
//! Canonical names, accepted keys and canonical extensions of every
//! language the engine knows about.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Bash,
    C,
    Csharp,
    Go,
    Hack,
    Html,
    Java,
    Javascript,
    Json,
    Kotlin,
    Lua,
    Ocaml,
    Php,
    Python,
    Python2,
    Python3,
    R,
    Ruby,
    Rust,
    Scala,
    Typescript,
    Vue,
    Yaml,
}

const ALL: &[Lang] = &[
    Lang::Bash,
    Lang::C,
    Lang::Csharp,
    Lang::Go,
    Lang::Hack,
    Lang::Html,
    Lang::Java,
    Lang::Javascript,
    Lang::Json,
    Lang::Kotlin,
    Lang::Lua,
    Lang::Ocaml,
    Lang::Php,
    Lang::Python,
    Lang::Python2,
    Lang::Python3,
    Lang::R,
    Lang::Ruby,
    Lang::Rust,
    Lang::Scala,
    Lang::Typescript,
    Lang::Vue,
    Lang::Yaml,
];

impl Lang {
    pub fn all() -> &'static [Lang] {
        ALL
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Lang::Bash => "bash",
            Lang::C => "c",
            Lang::Csharp => "csharp",
            Lang::Go => "go",
            Lang::Hack => "hack",
            Lang::Html => "html",
            Lang::Java => "java",
            Lang::Javascript => "javascript",
            Lang::Json => "json",
            Lang::Kotlin => "kotlin",
            Lang::Lua => "lua",
            Lang::Ocaml => "ocaml",
            Lang::Php => "php",
            Lang::Python => "python",
            Lang::Python2 => "python2",
            Lang::Python3 => "python3",
            Lang::R => "r",
            Lang::Ruby => "ruby",
            Lang::Rust => "rust",
            Lang::Scala => "scala",
            Lang::Typescript => "typescript",
            Lang::Vue => "vue",
            Lang::Yaml => "yaml",
        }
    }

    /// Every key a rule may use to name this language
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Lang::Bash => &["bash", "sh"],
            Lang::C => &["c"],
            Lang::Csharp => &["csharp", "cs", "c#"],
            Lang::Go => &["go", "golang"],
            Lang::Hack => &["hack", "hh"],
            Lang::Html => &["html"],
            Lang::Java => &["java"],
            Lang::Javascript => &["javascript", "js"],
            Lang::Json => &["json"],
            Lang::Kotlin => &["kotlin", "kt"],
            Lang::Lua => &["lua"],
            Lang::Ocaml => &["ocaml", "ml"],
            Lang::Php => &["php"],
            Lang::Python => &["python", "py"],
            Lang::Python2 => &["python2"],
            Lang::Python3 => &["python3"],
            Lang::R => &["r"],
            Lang::Ruby => &["ruby", "rb"],
            Lang::Rust => &["rust", "rs"],
            Lang::Scala => &["scala"],
            Lang::Typescript => &["typescript", "ts"],
            Lang::Vue => &["vue"],
            Lang::Yaml => &["yaml"],
        }
    }

    /// Canonical file extensions (with the leading period)
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Lang::Bash => &[".bash", ".sh"],
            Lang::C => &[".c", ".h"],
            Lang::Csharp => &[".cs"],
            Lang::Go => &[".go"],
            Lang::Hack => &[".hack", ".hck", ".hh"],
            Lang::Html => &[".html", ".htm"],
            Lang::Java => &[".java"],
            Lang::Javascript => &[".js", ".jsx"],
            Lang::Json => &[".json"],
            Lang::Kotlin => &[".kt", ".kts"],
            Lang::Lua => &[".lua"],
            Lang::Ocaml => &[".ml", ".mli"],
            Lang::Php => &[".php"],
            Lang::Python | Lang::Python2 | Lang::Python3 => &[".py", ".pyi"],
            Lang::R => &[".r", ".R"],
            Lang::Ruby => &[".rb"],
            Lang::Rust => &[".rs"],
            Lang::Scala => &[".scala"],
            Lang::Typescript => &[".ts", ".tsx"],
            Lang::Vue => &[".vue"],
            Lang::Yaml => &[".yaml", ".yml"],
        }
    }

    /// Look a language up by any of its keys (case-insensitive)
    pub fn from_key(key: &str) -> Option<Lang> {
        let key = key.trim().to_lowercase();
        ALL.iter()
            .copied()
            .find(|lang| lang.keys().iter().any(|k| *k == key))
    }

    /// All accepted keys, for error messages
    pub fn supported_keys() -> String {
        ALL.iter()
            .flat_map(|lang| lang.keys().iter().copied())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_accepts_aliases() {
        assert_eq!(Lang::from_key("py"), Some(Lang::Python));
        assert_eq!(Lang::from_key("Python3"), Some(Lang::Python3));
        assert_eq!(Lang::from_key("golang"), Some(Lang::Go));
        assert_eq!(Lang::from_key("c#"), Some(Lang::Csharp));
        assert_eq!(Lang::from_key("cobol"), None);
    }

    #[test]
    fn test_name_is_a_key() {
        for lang in Lang::all() {
            assert_eq!(Lang::from_key(lang.name()), Some(*lang));
        }
    }

    #[test]
    fn test_extensions_have_leading_period() {
        for lang in Lang::all() {
            assert!(lang.extensions().iter().all(|e| e.starts_with('.')));
        }
    }
}
