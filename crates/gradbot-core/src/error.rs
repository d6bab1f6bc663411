//! Error types shared across GradBot crates.

/// Top-level error for GradBot library code.
#[derive(Debug, thiserror::Error)]
pub enum GradBotError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("Config error: {0}")]
    Config(String),

    /// A notification channel failed to deliver.
    #[error("Channel error: {0}")]
    Channel(String),

    /// A command invocation could not be handled.
    #[error("Command error: {0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GradBotError>;
