//! Classification use cases

mod classifier;
mod evaluate;

pub use classifier::{Classification, LanguageClassifier};
pub use evaluate::eval;
