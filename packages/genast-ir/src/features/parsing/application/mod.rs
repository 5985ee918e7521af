//! Parsing application layer

mod parse_file;
mod scope_resolver;

pub use parse_file::ParseFileUseCase;
pub use scope_resolver::resolve_module;
