use shared::error::ApiError;
use thiserror::Error;

/// Failures at the remote-store boundary. Engines never let these escape;
/// they are converted into state events at the call site.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl StoreError {
    /// Maps a non-2xx response to an error, decoding the platform's
    /// structured error body when the server sent one.
    pub(crate) async fn check(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if let Ok(api) = serde_json::from_str::<ApiError>(&body) {
            return Err(StoreError::Api(api));
        }
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
