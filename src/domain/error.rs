// Error taxonomy shared by every layer
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Identifier, title or table does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// A display label or internal table name could not be resolved.
    #[error("could not resolve name: {0}")]
    Resolution(String),

    /// Malformed user input (time bounds, y-axis bounds, selections).
    #[error("invalid input: {0}")]
    Validation(String),

    /// The platform refused a write: name or uid taken, version mismatch.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Network or HTTP failure talking to the dashboard platform.
    #[error("transport error: {0}")]
    Transport(String),

    /// Persisted lifecycle state (log or counter file) is unreadable.
    #[error("corrupt state in {path}: {reason}")]
    StateCorruption { path: String, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn corrupt(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StateCorruption {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
