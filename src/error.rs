//! CLI error types.
//!
//! Every variant's Display is the exact line printed to stderr before the
//! process exits with status 1.

use thiserror::Error;

use crate::remote::{RemoteError, UriError};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Local validation failure, raised before any network call.
    #[error("Error: {0}")]
    Validation(String),

    #[error("Error: {0}")]
    InvalidUri(#[from] UriError),

    #[error("Error: BLUESKY_HANDLE and BLUESKY_APP_PASSWORD must be set")]
    MissingCredentials,

    #[error("Login failed: {0}")]
    Login(#[source] RemoteError),

    /// Remote failure surfaced verbatim, prefixed with the attempted action.
    #[error("Failed to {action}: {source}")]
    Remote {
        action: &'static str,
        source: RemoteError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Adapter for `map_err`: `client.like(..).map_err(CliError::remote("like"))`.
    pub fn remote(action: &'static str) -> impl FnOnce(RemoteError) -> CliError {
        move |source| CliError::Remote { action, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_are_verbatim() {
        let err = CliError::remote("post")(RemoteError::Api {
            status: 400,
            error: "InvalidRequest".into(),
            message: "Record/text must not be longer than 300 graphemes".into(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to post: InvalidRequest: Record/text must not be longer than 300 graphemes"
        );
    }

    #[test]
    fn missing_credentials_message() {
        assert_eq!(
            CliError::MissingCredentials.to_string(),
            "Error: BLUESKY_HANDLE and BLUESKY_APP_PASSWORD must be set"
        );
    }
}
