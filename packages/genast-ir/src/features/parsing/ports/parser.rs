//! Parser port (interface)
//!
//! Defines the contract for producing the Python syntax tree.

use crate::errors::ParseError;
use crate::features::parsing::domain::Module;

/// Parser trait - abstraction over the concrete front end
pub trait Parser: Send + Sync {
    /// Parse source code into a Python module
    fn parse(&self, source: &str, file_path: &str) -> Result<Module, ParseError>;

    /// Check if this parser supports the given file extension
    fn supports_extension(&self, ext: &str) -> bool;

    /// Get supported language name
    fn language_name(&self) -> &'static str;
}
