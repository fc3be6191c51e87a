//! Logging trait for transport operations.
//!
//! This module provides the [`TransportLogger`] trait that allows users to
//! capture every request and response passing through the
//! [`TransportSelector`](crate::TransportSelector).

use crate::Error;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// A trait for logging transport operations.
///
/// Implement this trait to record raw traffic to the forwarding endpoint,
/// including which transport carried each request.
///
/// # Example
///
/// ```rust,ignore
/// use gkchat::{Error, HttpRequest, HttpResponse, Transport, TransportLogger};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl TransportLogger for FileLogger {
///     fn log_request(&self, transport: Transport, request: &HttpRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{transport} {} {}", request.method, request.url).unwrap();
///     }
///
///     fn log_response(&self, transport: Transport, response: &HttpResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{transport} {} {}", response.status, response.body).unwrap();
///     }
///
///     fn log_failure(&self, transport: Transport, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{transport} failed: {error}").unwrap();
///     }
/// }
/// ```
pub trait TransportLogger: Send + Sync {
    /// Log a request just before it is handed to the HTTP client.
    fn log_request(&self, transport: Transport, request: &HttpRequest);

    /// Log a response received from the HTTP client.
    ///
    /// This is called for every response that arrived, including non-2xx
    /// responses, before the body is interpreted.
    fn log_response(&self, transport: Transport, response: &HttpResponse);

    /// Log a request that failed before any response arrived.
    fn log_failure(&self, transport: Transport, error: &Error);
}
