use std::path::PathBuf;

use thiserror::Error;

/// Failures while fetching or decoding a graph document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid GEXF document: {0}")]
    Gexf(String),

    #[error("{kind} #{index}: {reason}")]
    Schema {
        kind: &'static str,
        index: usize,
        reason: String,
    },
}

/// Raised when a search query matches nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("no match for \"{0}\"")]
    NoMatch(String),
}
