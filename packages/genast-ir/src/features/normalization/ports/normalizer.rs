//! Normalizer port (interface)
//!
//! Maps a language-specific tree to the generic AST.

use crate::errors::NormalizeError;
use crate::features::parsing::domain::python_ast;
use crate::shared::models::generic_ast;

/// Normalizer trait - one implementation per front end
pub trait Normalizer: Send + Sync {
    /// Whole file
    fn normalize_program(
        &self,
        module: python_ast::Module,
    ) -> Result<generic_ast::Program, NormalizeError>;

    /// Pattern snippet (expression, statement, or statement list)
    fn normalize_any(&self, any: python_ast::Any) -> Result<generic_ast::Any, NormalizeError>;
}
