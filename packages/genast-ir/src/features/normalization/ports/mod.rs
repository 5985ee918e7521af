//! Normalization ports (interfaces)

mod normalizer;

pub use normalizer::Normalizer;
