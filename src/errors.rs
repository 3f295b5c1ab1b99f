use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("client is closed")]
    Closed,

    #[error("invalid client configuration: {0}")]
    Config(#[from] ConfigError),
}
