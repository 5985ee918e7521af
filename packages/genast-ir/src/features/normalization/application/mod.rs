//! Normalization use cases

mod normalize_files;

pub use normalize_files::NormalizeFilesUseCase;
