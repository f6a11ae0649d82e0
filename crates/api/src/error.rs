use thiserror::Error;

/// Maximum number of response body characters kept in a status error.
const MAX_BODY_CHARS: usize = 256;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Build a status error, truncating long bodies (HTML error pages etc).
    pub fn status(status: u16, body: &str) -> Self {
        let body = if body.chars().count() > MAX_BODY_CHARS {
            let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
            format!("{truncated}...")
        } else {
            body.to_string()
        };
        Self::Status { status, body }
    }

    /// Whether the server rejected the request credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

/// Read a response body, mapping non-2xx statuses to [`ApiError::Status`].
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::status(status.as_u16(), &body));
    }
    Ok(body)
}
