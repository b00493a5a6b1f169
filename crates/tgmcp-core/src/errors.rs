/// Core error type for the history server.
///
/// Adapter crates should map their specific errors into this type so every
/// request stage reports failures consistently (user input mistake vs
/// collaborator contract violation).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("identifier parse error: {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("peer resolution error: {0}")]
    Resolution(String),

    #[error("history fetch error: {0}")]
    Fetch(String),

    #[error("response normalization error: unexpected history shape: {0}")]
    UnexpectedShape(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
