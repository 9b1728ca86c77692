use reqwest::StatusCode;
use thiserror::Error;

/// Failure while retrieving the edital page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Failure while asking the local model for an answer.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation endpoint unreachable: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generation endpoint returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed generation payload: {0}")]
    Payload(String),
}

/// Errors that stop the pipeline before anything can be rendered.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no URL found in the instruction; include a valid http(s) URL")]
    NoUrlFound,
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rules JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty keyword in {0}")]
    EmptyKeyword(String),
}
