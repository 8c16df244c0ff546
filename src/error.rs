use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErrlogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch failed with status {status}: {snippet}")]
    Fetch { status: u16, snippet: String },

    #[error("Source returned HTML instead of CSV: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, ErrlogError>;
