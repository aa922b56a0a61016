use marquee_core::error::RepositoryError;
use thiserror::Error;

/// Errors from the HTTP catalog clients.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<RemoteError> for RepositoryError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Http(e) => RepositoryError::Transport(e.to_string()),
            RemoteError::Api { status, message } => RepositoryError::Api { status, message },
            e @ RemoteError::InvalidEndpoint { .. } => RepositoryError::Transport(e.to_string()),
            RemoteError::Parse(message) => RepositoryError::Parse(message),
        }
    }
}

/// Check the HTTP response for errors and return the body text on failure.
pub(crate) async fn check_response(
    resp: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, RemoteError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(operation, status, "Catalog API error");
        Err(RemoteError::Api {
            status,
            message: body,
        })
    }
}
