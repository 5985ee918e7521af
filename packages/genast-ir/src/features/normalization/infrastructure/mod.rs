//! Concrete normalizers

mod python_to_generic;

pub use python_to_generic::PythonNormalizer;
