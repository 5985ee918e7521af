//! Shebang lines
//!
//! `#!/bin/bash -e -u` has interpreter `/bin/bash` and the single argument
//! `-e -u` (the kernel passes everything after the first blank as one
//! argument). `#!/usr/bin/env` is an indirection: its argument names the
//! real command, split on whitespace, with a leading `-S` dropped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Indirection wrapper whose first argument is the real interpreter
pub const ENV_WRAPPER: &str = "/usr/bin/env";

static SHEBANG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#![ \t]*([^ \t]*)[ \t]*([^ \t].*)?$")
        .unwrap_or_else(|e| unreachable!("shebang pattern is a literal and compiles: {}", e))
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shebang {
    pub interpreter: String,
    pub argument: Option<String>,
}

/// Command a shebang actually runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShebangCommand {
    /// Base name of the resolved interpreter (`python3`)
    pub name: String,
    pub args: Vec<String>,
}

impl Shebang {
    /// Parse a first line; `None` when it is not a shebang
    pub fn parse(line: &str) -> Option<Shebang> {
        let line = line.trim_end_matches(['\r', '\n']);
        let caps = SHEBANG_RE.captures(line)?;
        let interpreter = caps.get(1)?.as_str().to_string();
        let argument = caps
            .get(2)
            .map(|m| m.as_str().trim_end().to_string())
            .filter(|a| !a.is_empty());
        Some(Shebang {
            interpreter,
            argument,
        })
    }

    /// Resolve the command name, following `/usr/bin/env`
    pub fn command(&self) -> Option<ShebangCommand> {
        if self.interpreter == ENV_WRAPPER {
            let mut words = self.argument.as_deref()?.split_whitespace().peekable();
            if words.peek() == Some(&"-S") {
                words.next();
            }
            let real = words.next()?;
            return Some(ShebangCommand {
                name: basename(real).to_string(),
                args: words.map(str::to_string).collect(),
            });
        }
        if self.interpreter.is_empty() {
            return None;
        }
        Some(ShebangCommand {
            name: basename(&self.interpreter).to_string(),
            args: self.argument.iter().cloned().collect(),
        })
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
