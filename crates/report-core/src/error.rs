use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Duplicate section id in manifest: {0}")]
    DuplicateSectionId(String),

    #[error("Spreadsheet order is missing its backbone: {0}")]
    BackboneMissing(String),

    #[error("Invalid spreadsheet order: {0}")]
    InvalidSheetOrder(String),

    #[error("Spreadsheet pages unavailable at {path}: {reason}")]
    SheetSourceUnavailable { path: PathBuf, reason: String },

    #[error("No page with content survived the merge")]
    EmptyDocument,

    #[error("PDF merge failed: {0}")]
    Merge(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssemblyError {
    /// Structural input errors that abort a run before any service call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AssemblyError::DuplicateSectionId(_)
                | AssemblyError::BackboneMissing(_)
                | AssemblyError::InvalidSheetOrder(_)
        )
    }
}
