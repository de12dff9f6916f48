//! Workbook options

use crate::shared_strings::DEFAULT_FLUSH_BYTES;
use std::path::PathBuf;

/// Options for creating and opening workbooks
#[derive(Debug, Clone)]
pub struct WorkbookOptions {
    /// Parent of the scratch directory (default: the system temp dir)
    pub scratch_root: Option<PathBuf>,
    /// Buffered shared-string bytes that trigger a write to disk
    pub shared_strings_flush_bytes: usize,
    /// Deflate level of the saved package (default: zip's own)
    pub compression_level: Option<i64>,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            scratch_root: None,
            shared_strings_flush_bytes: DEFAULT_FLUSH_BYTES,
            compression_level: None,
        }
    }
}

impl WorkbookOptions {
    pub fn with_scratch_root<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    pub fn with_shared_strings_flush_bytes(mut self, bytes: usize) -> Self {
        self.shared_strings_flush_bytes = bytes;
        self
    }

    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = Some(level);
        self
    }
}
