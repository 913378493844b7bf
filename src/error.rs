use thiserror::Error;

/// Why a footage lookup produced no usable clip.
#[derive(Error, Debug)]
pub enum FootageError {
    #[error("no results for '{0}'")]
    NoResults(String),

    #[error("download for '{query}' too small ({bytes} bytes)")]
    TooSmall { query: String, bytes: u64 },

    #[error("request for '{query}' failed: {message}")]
    Request { query: String, message: String },

    #[error("all footage searches failed (tried: {})", .0.join(", "))]
    Exhausted(Vec<String>),
}

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("no valid footage")]
    NoValidFootage,

    #[error("invalid narration audio: {0}")]
    InvalidNarration(String),

    #[error(transparent)]
    Render(#[from] anyhow::Error),
}
