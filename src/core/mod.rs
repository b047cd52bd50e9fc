//! Core types shared across the analysis pipeline.

mod error;
mod file_set;
mod ignore;
mod source_file;

pub use error::{Error, Result};
pub use file_set::FileSet;
pub use ignore::{IgnoreList, DEFAULT_IGNORE_PATTERNS, IGNORE_FILE};
pub use source_file::SourceFile;
