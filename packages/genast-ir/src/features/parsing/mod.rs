//! Parsing Feature
//!
//! Python source → Python syntax tree, plus scope resolution.
//!
//! ## Structure
//! - `domain/` - Python syntax tree
//! - `ports/` - Parser trait
//! - `application/` - ParseFileUseCase, scope resolver
//! - `infrastructure/` - tree-sitter front end

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports
pub use application::{resolve_module, ParseFileUseCase};
pub use domain::python_ast;
pub use infrastructure::PythonParser;
pub use ports::Parser;
