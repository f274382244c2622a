//! Error types for RouterOS REST operations.
//!
//! Errors are categorized to enable smart retry logic and appropriate
//! user feedback. HTTP outcomes are mapped onto categories first; the
//! session then folds them into the reconciliation taxonomy.

use std::fmt;

/// Result type alias for RouterOS operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of RouterOS errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, timeout, DNS or 5xx (transient, retryable)
    Network,
    /// Credentials refused
    Auth,
    /// No such item
    NotFound,
    /// The router refused the command
    Rejected,
    /// Response body was not what the API documents
    Format,
    /// Cancelled by the caller
    Cancelled,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Router unreachable",
            Self::Auth => "Authentication failed",
            Self::NotFound => "No such item",
            Self::Rejected => "Command rejected",
            Self::Format => "Unexpected response",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the router address and that the www or www-ssl service is enabled",
            Self::Auth => "Check the username and password, and that the user group has the rest-api policy",
            Self::NotFound => "The item may have been removed on the router",
            Self::Rejected => "Read the router's message; the value may not fit the current mode",
            Self::Format => "The router firmware may be too old for the REST API (7.1+)",
            Self::Cancelled => "Re-run the command",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur talking to a router.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Router answered with an error status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Router's message, with detail when present.
        message: String,
    },

    /// Request never got an answer.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be understood.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Operation was cancelled before the request went out.
    #[error("cancelled")]
    Cancelled,
}

impl Error {
    /// Build an error from a non-success HTTP response.
    ///
    /// RouterOS answers errors with `{"error": 400, "message": "Bad Request",
    /// "detail": "failure: ..."}`; the detail is what users need to see.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ApiError>(body)
            .ok()
            .map(|e| match e.detail {
                Some(detail) if !detail.is_empty() => detail,
                _ => e.message,
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.trim().to_string());

        Self::Http { status, message }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http { status, .. } => match status {
                401 | 403 => ErrorCategory::Auth,
                404 => ErrorCategory::NotFound,
                400 | 406 | 409 => ErrorCategory::Rejected,
                500.. => ErrorCategory::Network,
                _ => ErrorCategory::Rejected,
            },
            Error::Network(_) => ErrorCategory::Network,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Fold into the reconciliation error taxonomy.
    ///
    /// `identity` names the addressed record for not-found errors.
    pub fn into_remote(self, path: &str, identity: &str) -> declarative::Error {
        let category = self.category();
        match self {
            Error::Cancelled => declarative::Error::Cancelled,
            Error::Http { message, .. } if category == ErrorCategory::Rejected => {
                declarative::Error::rejected(path, message)
            }
            _ if category == ErrorCategory::NotFound => declarative::Error::NotFound {
                path: path.to_string(),
                identity: identity.to_string(),
            },
            other => declarative::Error::transport(format!("{}: {other}", category.description())),
        }
    }
}

#[derive(serde::Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    detail: Option<String>,
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                status: code,
                message: format!("HTTP {code}"),
            },
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::ErrorCategory as Category;

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::Rejected.is_retryable());
        assert!(!ErrorCategory::Format.is_retryable());
        assert!(!ErrorCategory::Cancelled.is_retryable());
    }

    #[test]
    fn test_error_category_advice() {
        assert!(!ErrorCategory::Network.advice().is_empty());
        assert!(!ErrorCategory::Auth.advice().is_empty());
        assert!(format!("{}", ErrorCategory::Auth).contains("Authentication"));
    }

    #[test]
    fn test_from_response_uses_detail() {
        let err = Error::from_response(
            400,
            r#"{"error":400,"message":"Bad Request","detail":"failure: already have interface with such name"}"#,
        );
        assert_eq!(err.category(), ErrorCategory::Rejected);
        assert!(err.to_string().contains("already have interface"));
    }

    #[test]
    fn test_from_response_plain_body() {
        let err = Error::from_response(502, "Bad Gateway\n");
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
        match err {
            Error::Http { message, .. } => assert_eq!(message, "Bad Gateway"),
            _ => panic!("Expected Error::Http"),
        }
    }

    #[test]
    fn test_status_categories() {
        let cat = |status| Error::Http {
            status,
            message: String::new(),
        }
        .category();
        assert_eq!(cat(401), ErrorCategory::Auth);
        assert_eq!(cat(403), ErrorCategory::Auth);
        assert_eq!(cat(404), ErrorCategory::NotFound);
        assert_eq!(cat(400), ErrorCategory::Rejected);
        assert_eq!(cat(503), ErrorCategory::Network);
    }

    #[test]
    fn test_into_remote() {
        let err = Error::from_response(400, r#"{"detail":"input does not match any value of interface"}"#)
            .into_remote("/interface/bonding", "bond1");
        assert_eq!(err.category(), Category::Rejected);
        assert!(err.to_string().contains("/interface/bonding"));

        let err = Error::from_response(404, r#"{"message":"Not Found"}"#)
            .into_remote("/interface/bonding", "bond1");
        assert!(err.is_not_found());

        let err = Error::Http {
            status: 401,
            message: "Unauthorized".into(),
        }
        .into_remote("/interface/bonding", "bond1");
        assert_eq!(err.category(), Category::Transport);
        assert!(err.to_string().contains("Authentication failed"));

        let err = Error::Network("connection refused".into()).into_remote("/x", "y");
        assert!(err.is_retryable());

        let err = Error::Cancelled.into_remote("/x", "y");
        assert_eq!(err.category(), Category::Cancelled);
    }
}
