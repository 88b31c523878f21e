// types/leaf.rs
//
// Unconstrained strings and file paths.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringType {
    default: String,
}

impl StringType {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
        }
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePathType {
    default: PathBuf,
}

impl FilePathType {
    pub fn new(default: impl Into<PathBuf>) -> Self {
        Self {
            default: default.into(),
        }
    }

    pub fn default_value(&self) -> &Path {
        &self.default
    }
}
