use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not decode API response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("API token not configured (set SE_RANKING_API_TOKEN or api_token in the config file)")]
    MissingToken,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for failures that originate from the upstream API rather than local
    /// configuration or input.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status { .. } | Error::Json(_))
    }
}
