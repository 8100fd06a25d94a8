//! Error types shared by the fetchers, builders and writers.
//!
//! Most of these never reach `main`: fetch, parse and sink failures are logged
//! where they happen and folded into empty results. Only I/O failures while
//! persisting output are allowed to end the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeatError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode feed: {0}")]
    Feed(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid css selector {0:?}")]
    Selector(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("sink {sink} rejected item: {reason}")]
    Sink { sink: String, reason: String },
}

pub type Result<T> = std::result::Result<T, BeatError>;
