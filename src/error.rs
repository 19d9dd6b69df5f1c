//! Error types for mtg-fetch operations.
//!
//! Everything in the crate returns [`Result<T>`]. Most variants are recovered
//! per card or per query; only filesystem errors while creating directories
//! are expected to reach `main`.

use thiserror::Error;

/// Type alias for Results with mtg-fetch errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all mtg-fetch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote lookup returned no match.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-2xx response or network failure.
    ///
    /// Aborts the current query batch; an image download failing this way
    /// only marks the card as not saved.
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The card payload lacks a face or image the layout requires.
    #[error("No valid image found for card: {0}")]
    MissingImageData(String),

    /// Rejected user input (set codes, list entries).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Creates a transport error for the given URL.
    pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Transport {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn missing_image(card_name: impl Into<String>) -> Self {
        Error::MissingImageData(card_name.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let url = e
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        Error::Transport {
            url,
            reason: e.to_string(),
        }
    }
}
