//! Error types for the CLI

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Config(#[from] kindling_config::Error),

    #[error("{count} validation error(s)")]
    Validation { count: usize },
}

impl Error {
    pub fn validation(count: usize) -> Self {
        Error::Validation { count }
    }
}
