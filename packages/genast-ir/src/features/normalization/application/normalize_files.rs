//! Normalize files use case
//!
//! Source text → resolved Python tree → generic program, one file at a time
//! or in parallel over a batch.

use rayon::prelude::*;

use crate::errors::{GenastError, NormalizeError};
use crate::features::normalization::ports::Normalizer;
use crate::features::parsing::ports::Parser;
use crate::features::parsing::domain::Module;
use crate::features::parsing::ParseFileUseCase;
use crate::shared::models::generic_ast::Program;

pub struct NormalizeFilesUseCase<P: Parser, N: Normalizer> {
    parse: ParseFileUseCase<P>,
    normalizer: N,
}

impl<P: Parser, N: Normalizer> NormalizeFilesUseCase<P, N> {
    pub fn new(parser: P, normalizer: N) -> Self {
        Self {
            parse: ParseFileUseCase::new(parser),
            normalizer,
        }
    }

    /// Parse, resolve and normalize one file
    pub fn normalize_one(&self, source: &str, file_path: &str) -> Result<Program, GenastError> {
        let module = self.parse.execute(source, file_path)?;
        let program = self.normalizer.normalize_program(module)?;
        tracing::debug!(file = file_path, stmts = program.len(), "normalized");
        Ok(program)
    }

    /// Normalize already-parsed modules; one result per module, in order
    pub fn normalize_many(&self, modules: Vec<Module>) -> Vec<Result<Program, NormalizeError>> {
        modules
            .into_par_iter()
            .map(|module| {
                let file = module.file.clone();
                self.normalizer.normalize_program(module).map_err(|e| {
                    tracing::warn!(file = file.as_str(), error = %e, "normalization failed");
                    e
                })
            })
            .collect()
    }

    /// One result per `(path, source)` pair, in input order. A failing
    /// file does not affect the others.
    pub fn normalize_sources(
        &self,
        files: &[(String, String)],
    ) -> Vec<Result<Program, GenastError>> {
        let results: Vec<_> = files
            .par_iter()
            .map(|(path, source)| {
                self.normalize_one(source, path).map_err(|e| {
                    tracing::warn!(file = path.as_str(), error = %e, "normalization failed");
                    e
                })
            })
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::debug!(files = files.len(), failed, "normalized batch");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::normalization::PythonNormalizer;
    use crate::features::parsing::PythonParser;
    use crate::shared::models::generic_ast::{Expr, Stmt};

    #[test]
    fn test_normalize_one_keeps_resolution() {
        let use_case = NormalizeFilesUseCase::new(PythonParser::new(), PythonNormalizer::new());
        let program = use_case
            .normalize_one("import os\nos.getcwd()\n", "a.py")
            .unwrap();
        assert_eq!(program.len(), 2);
        match &program[1] {
            Stmt::ExprStmt(Expr::Call(f, _), _) => match f.as_ref() {
                Expr::DotAccess(base, _, _) => match base.as_ref() {
                    Expr::Id(_, info) => assert!(info.resolved.is_some()),
                    other => panic!("unexpected {:?}", other),
                },
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_normalize_sources_isolates_failures() {
        let use_case = NormalizeFilesUseCase::new(PythonParser::new(), PythonNormalizer::new());
        let files = vec![
            ("ok.py".to_string(), "x = 1\n".to_string()),
            ("bad.py".to_string(), "def (:\n".to_string()),
            ("ok2.py".to_string(), "pass\n".to_string()),
        ];
        let results = use_case.normalize_sources(&files);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(GenastError::Parse(_))));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_normalize_many_preserves_order() {
        use crate::features::parsing::ports::Parser;

        let parser = PythonParser::new();
        let modules = vec![
            parser.parse("a\n", "a.py").unwrap(),
            parser.parse("b\nc\n", "b.py").unwrap(),
        ];
        let use_case = NormalizeFilesUseCase::new(PythonParser::new(), PythonNormalizer::new());
        let results = use_case.normalize_many(modules);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().len(), 1);
        assert_eq!(results[1].as_ref().unwrap().len(), 2);
    }
}
