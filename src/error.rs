use reqwest::StatusCode;

/// Fallback shown when the server does not supply a `detail` message.
pub const GENERIC_ERROR: &str = "Something went wrong";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The backend answered 401. The token is already cleared and the host
    /// sent to the login page, so nothing is shown to the user.
    #[error("Session expired")]
    SessionExpired,

    #[error("{detail}")]
    Api { status: StatusCode, detail: String },

    #[error("{0}")]
    Validation(String),

    #[error("Expected a response body")]
    EmptyBody,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Authentication failures are handled by redirecting, never by a message.
    pub fn is_silent(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }

    /// Text suitable for inline display next to a form.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { detail, .. } => detail.clone(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::SessionExpired => String::new(),
            _ => GENERIC_ERROR.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
