//! Error type shared by the pipeline stages.
//!
//! Only a handful of these ever abort a run (bad configuration, an unreadable
//! dedup file). Everything raised per source, per article or per recipient is
//! logged by the stage that hit it and the run moves on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A whole feed could not be read.
    #[error("Feed error for {endpoint}: {reason}")]
    Feed { endpoint: String, reason: String },

    /// The body of a single article could not be extracted.
    #[error("Extraction error for {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Delivery error: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
