use thiserror::Error;

/// Błędy warstwy bibliotecznej. Na krawędziach (bootstrap, bin) i tak
/// zamieniamy je w `anyhow::Error`.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Discord (HTTP/gateway) odrzucił wywołanie.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl From<serenity::Error> for GuardError {
    fn from(e: serenity::Error) -> Self {
        GuardError::Transport(e.to_string())
    }
}

pub type GuardResult<T> = Result<T, GuardError>;
