//! Tree-sitter based parser implementation

mod python_parser;

pub use python_parser::PythonParser;
