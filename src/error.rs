use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment setup failed: {0}")]
    Environment(String),

    #[error("Dependency listing failed: {0}")]
    DependencyList(String),

    #[error("Report formatting failed: {0}")]
    Format(String),

    #[error("Repository state error: {0}")]
    RepoState(String),

    #[error("Checkout failed: {0}")]
    Checkout(String),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("Push failed: {0}")]
    Push(String),

    #[error("Failed to restore original branch: {0}")]
    Restore(String),
}

impl ReportError {
    /// Wraps an IO error with the step that produced it.
    pub fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        ReportError::Io(std::io::Error::new(err.kind(), format!("{context}: {err}")))
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
