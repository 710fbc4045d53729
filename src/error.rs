use serde::{Deserialize, Serialize};

/// One backend validation failure, as returned in `errors: [{path, msg}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Backend field name (snake_case). Older backends call it `param`.
    #[serde(alias = "param", default)]
    pub path: String,
    #[serde(alias = "message", default)]
    pub msg: String,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },
    #[error("request rejected: {message}")]
    Rejected { message: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api base url cannot carry path segments: {0}")]
    BaseUrl(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build the error for a non-2xx response from its status and raw body.
    ///
    /// A body carrying `errors` becomes [`ApiError::Validation`]; otherwise the
    /// body's `message` is used, falling back to the status code.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));
        if parsed.errors.is_empty() {
            ApiError::Status { status, message }
        } else {
            ApiError::Validation { message, errors: parsed.errors }
        }
    }

    /// Backend validation failures, empty for every other kind of error.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    /// The user-facing message, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::Rejected { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_maps_to_validation_variant() {
        let body = r#"{"message":"Validation failed","errors":[{"path":"title","msg":"Title is required"},{"param":"author_bio","msg":"Too long"}]}"#;
        let err = ApiError::from_response(422, body);
        match &err {
            ApiError::Validation { message, errors } => {
                assert_eq!(message, "Validation failed");
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[1].path, "author_bio");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.field_errors()[0].msg, "Title is required");
    }

    #[test]
    fn message_falls_back_to_status_code() {
        let err = ApiError::from_response(502, "<html>bad gateway</html>");
        assert_eq!(err.message(), "HTTP error! status: 502");
        assert_eq!(err.status(), Some(502));
        assert!(err.field_errors().is_empty());
    }

    #[test]
    fn error_key_is_used_when_message_missing() {
        let err = ApiError::from_response(401, r#"{"error":"Token expired"}"#);
        assert_eq!(err.message(), "Token expired");
    }
}
