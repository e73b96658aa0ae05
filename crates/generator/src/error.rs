use std::path::PathBuf;
use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur while loading templates or running an evaluation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The evaluation observed its cancellation flag and stopped
    #[error("Evaluation cancelled")]
    Cancelled,

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A template file whose name is not a qualified artifact id
    #[error("Invalid template name: {}", path.display())]
    InvalidTemplateName { path: PathBuf },

    /// Two templates claim the same artifact id
    #[error("Duplicate artifact: {0}")]
    DuplicateArtifact(String),
}

impl GeneratorError {
    /// Create an invalid template name error
    pub fn invalid_template_name(path: impl Into<PathBuf>) -> Self {
        Self::InvalidTemplateName { path: path.into() }
    }

    /// Create a duplicate artifact error
    pub fn duplicate_artifact(id: impl Into<String>) -> Self {
        Self::DuplicateArtifact(id.into())
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
