/// Domain-level error type for the job engine.
///
/// Every variant except [`CoreError::Io`] is fatal: it aborts the
/// operation that raised it and is never retried. I/O errors from
/// process spawning are treated as transient by the execution layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Configuration path must be an absolute path to a directory: {0}")]
    InvalidConfigPath(String),

    #[error("Configuration not found: {0}")]
    ConfigNotFound(String),

    #[error("Configuration root is missing or not a directory: {0}")]
    MissingConfigRoot(String),

    #[error("Workspace name must contain only URL-safe characters")]
    InvalidWorkspaceName,

    #[error("Failed to select workspace \"{name}\": {stderr}")]
    WorkspaceSelection { name: String, stderr: String },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Execution timed out after {0} seconds")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
