//! Parse file use case

use rayon::prelude::*;

use crate::errors::ParseError;
use crate::features::parsing::application::resolve_module;
use crate::features::parsing::domain::Module;
use crate::features::parsing::ports::Parser;

/// Parse then resolve names
pub struct ParseFileUseCase<P: Parser> {
    parser: P,
}

impl<P: Parser> ParseFileUseCase<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// Execute the parse operation
    pub fn execute(&self, source: &str, file_path: &str) -> Result<Module, ParseError> {
        let mut module = self.parser.parse(source, file_path)?;
        resolve_module(&mut module);
        Ok(module)
    }

    /// Execute for multiple `(path, source)` pairs; one result per file
    pub fn execute_batch(&self, files: &[(String, String)]) -> Vec<Result<Module, ParseError>> {
        files
            .par_iter()
            .map(|(path, source)| self.execute(source, path))
            .collect()
    }
}
