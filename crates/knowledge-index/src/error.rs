use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Reference source unavailable: {source_id}: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    #[error("Invalid chunking configuration: {0}")]
    InvalidConfig(String),

    #[error("Snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl IndexError {
    pub(crate) fn unavailable(source_id: impl Into<String>, reason: impl ToString) -> Self {
        IndexError::SourceUnavailable {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }
}
