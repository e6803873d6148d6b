use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("content pool `{0}` is not bundled")]
    MissingPool(String),
    #[error("content pool `{name}` is not valid UTF-8")]
    InvalidUtf8 { name: String },
    #[error("failed to parse content pool `{name}`: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}
