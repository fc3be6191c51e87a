//! Error types for gkchat.
//!
//! Every failure the client can observe is one variant of [`Error`]. Transport
//! and backend failures are not fatal: the conversation controller folds them
//! into the visible bot turn. Only validation and busy errors are returned to
//! the caller of [`crate::Conversation::ask`].

use std::error;
use std::fmt;
use std::sync::Arc;

/// The main error type for gkchat.
#[derive(Clone, Debug)]
pub enum Error {
    /// The input was rejected before anything was sent.
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// A request is already in flight.
    Busy {
        /// Human-readable error message.
        message: String,
    },

    /// No archived thread has the requested id.
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The id that was looked up, if it parsed.
        thread_id: Option<u64>,
    },

    /// The forwarding endpoint answered with a well-formed error payload.
    Backend {
        /// HTTP status code.
        status_code: u16,
        /// The `error` field of the payload.
        message: String,
    },

    /// The forwarding endpoint answered non-2xx without a usable payload.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Response body, or a description of it.
        message: String,
    },

    /// The request timed out.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Creates a new busy error.
    pub fn busy(message: impl Into<String>) -> Self {
        Error::Busy {
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<String>, thread_id: Option<u64>) -> Self {
        Error::NotFound {
            message: message.into(),
            thread_id,
        }
    }

    /// Creates a new backend error from an `{ "error": ... }` payload.
    pub fn backend(status_code: u16, message: impl Into<String>) -> Self {
        Error::Backend {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new API error.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns true if the input was rejected before sending.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns true if a request was already in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Error::Busy { .. })
    }

    /// Returns true if this error is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns true if the backend reported the error itself.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if this error arose while talking to the backend.
    ///
    /// These are the errors [`crate::Conversation::ask`] writes into the
    /// in-flight exchange instead of returning.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Backend { .. }
                | Error::Api { .. }
                | Error::Timeout { .. }
                | Error::Connection { .. }
                | Error::HttpClient { .. }
                | Error::Serialization { .. }
                | Error::Url { .. }
        )
    }

    /// Returns the HTTP status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Backend { status_code, .. } | Error::Api { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation { message } => {
                write!(f, "Validation error: {message}")
            }
            Error::Busy { message } => {
                write!(f, "Busy: {message}")
            }
            Error::NotFound { message, thread_id } => {
                if let Some(thread_id) = thread_id {
                    write!(f, "Not found: {message} (thread: {thread_id})")
                } else {
                    write!(f, "Not found: {message}")
                }
            }
            Error::Backend {
                status_code,
                message,
            } => {
                write!(f, "Backend error {status_code}: {message}")
            }
            Error::Api {
                status_code,
                message,
            } => {
                write!(f, "API error {status_code}: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for gkchat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_grouped() {
        assert!(Error::backend(500, "boom").is_transport());
        assert!(Error::api(502, "bad gateway").is_transport());
        assert!(Error::timeout("slow", Some(1.0)).is_transport());
        assert!(Error::connection("refused", None).is_transport());
        assert!(Error::serialization("bad json", None).is_transport());
        assert!(!Error::validation("empty").is_transport());
        assert!(!Error::busy("sending").is_transport());
        assert!(!Error::not_found("gone", Some(7)).is_transport());
    }

    #[test]
    fn display_includes_context() {
        assert_eq!(
            Error::backend(400, "Message is required").to_string(),
            "Backend error 400: Message is required"
        );
        assert_eq!(
            Error::not_found("no such thread", Some(42)).to_string(),
            "Not found: no such thread (thread: 42)"
        );
        assert_eq!(
            Error::timeout("request timed out", None).to_string(),
            "Timeout error: request timed out"
        );
    }

    #[test]
    fn status_code_only_for_http_errors() {
        assert_eq!(Error::backend(500, "x").status_code(), Some(500));
        assert_eq!(Error::api(404, "x").status_code(), Some(404));
        assert_eq!(Error::connection("x", None).status_code(), None);
    }

    #[test]
    fn json_errors_convert_to_serialization() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(error::Error::source(&err).is_some());
    }
}
