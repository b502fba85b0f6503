use thiserror::Error;

/// Errors surfaced by the article store and the transfer operations built on it.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rejected by store: {0}")]
    Validation(String),

    #[error("Transient failure: {0}")]
    Transient(String),

    /// The operation completed, but some branches of it failed.
    #[error("Completed with errors: {failed_articles} article(s) and {failed_attachments} attachment(s) failed")]
    PartialFailure {
        failed_articles: usize,
        failed_attachments: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TransferError {
    /// Map an HTTP status and the store's error message to an error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            401 | 403 => Self::Unauthorized(message),
            400..=499 => Self::Validation(message),
            _ => Self::Transient(message),
        }
    }
}

impl From<reqwest::Error> for TransferError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::from_status(status.as_u16(), e.to_string()),
            // timeouts, connection resets, body decode failures
            None => Self::Transient(e.to_string()),
        }
    }
}

pub type Result<T, E = TransferError> = std::result::Result<T, E>;
