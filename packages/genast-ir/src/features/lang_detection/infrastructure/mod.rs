//! Filesystem access for the classifier

pub mod fs_probe;
