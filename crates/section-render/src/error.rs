use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render input: {0}")]
    InvalidInput(String),

    #[error("Typst compilation failed: {}", .0.join("; "))]
    Compile(Vec<String>),

    #[error("PDF export failed: {0}")]
    Export(String),

    #[error("Path security violation: {0}")]
    PathSecurityViolation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
