//! Error types for persona-relay.
//!
//! Every variant maps onto one HTTP status class so the relay can turn any
//! failure into the same JSON envelope.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing message")]
    MissingMessage,

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Missing {0}")]
    MissingCredential(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("Completion API returned non-JSON")]
    NonJsonUpstream { status: u16, preview: String },

    #[error("{message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Completion API returned no answer")]
    EmptyCompletion,

    #[error("content store error: {0}")]
    ContentStore(String),

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status reported to the caller for this failure class.
    ///
    /// Input problems are 400, upstream failures 502, everything else 500.
    pub fn status(&self) -> u16 {
        match self {
            Error::MissingMessage | Error::InvalidBody => 400,
            Error::NonJsonUpstream { .. }
            | Error::UpstreamStatus { .. }
            | Error::EmptyCompletion
            | Error::ContentStore(_)
            | Error::Http(_) => 502,
            Error::MissingCredential(_)
            | Error::Config(_)
            | Error::Json(_)
            | Error::Io(_)
            | Error::Other(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
