use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoundError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid base URI '{uri}': {reason}")]
    InvalidBaseUri { uri: String, reason: String },

    #[error(
        "no search server configured; pass --base-uri, set HOUND_BASE_URI or write a config file"
    )]
    MissingBaseUri,

    #[error("failed to read config {path}: {source}")]
    ConfigIo { path: PathBuf, source: io::Error },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type HoundResult<T> = Result<T, HoundError>;
