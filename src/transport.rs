//! Platform-dependent request dispatch.
//!
//! Every outgoing request goes through [`TransportSelector`]. It asks the
//! [`PlatformProbe`] once per call, picks a [`Transport`], resolves the target
//! URL for that transport, and hands the request to the matching
//! [`HttpClient`]. Replies are decoded here so that callers always receive a
//! `Result` and never a half-parsed body.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::logger::TransportLogger;
use crate::observability::{
    TRANSPORT_DURATION, TRANSPORT_ERRORS, TRANSPORT_FETCH, TRANSPORT_NATIVE, TRANSPORT_REQUESTS,
};
use crate::platform::PlatformProbe;
use crate::sanitize::strip_tool_calls;
use crate::usage::credits_from_json;

/// Logical path of the chat endpoint.
pub const CHAT_ENDPOINT: &str = "/api/chat";

/// Logical path of the account usage endpoint.
pub const USAGE_ENDPOINT: &str = "/api/usage";

/// Default origin serving the web client.
pub const DEFAULT_SERVING_ORIGIN: &str = "http://localhost:3000";

/// Deployed backend used from inside the native wrapper.
pub const DEFAULT_NATIVE_ORIGIN: &str = "https://chatbot-4sjt.vercel.app";

/// Default request timeout of the underlying HTTP clients.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const NATIVE_USER_AGENT: &str = concat!("gkchat-native-bridge/", env!("CARGO_PKG_VERSION"));
const FETCH_USER_AGENT: &str = concat!("gkchat/", env!("CARGO_PKG_VERSION"));

/// The mechanism that carries a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// The standard in-process client, relative to the serving origin.
    BrowserFetch,
    /// The native wrapper's HTTP bridge, against the deployed backend.
    NativeBridge,
}

impl Transport {
    /// Picks the transport for the platform the probe reports.
    pub fn select(probe: &dyn PlatformProbe) -> Self {
        if probe.is_native_platform() {
            Transport::NativeBridge
        } else {
            Transport::BrowserFetch
        }
    }

    /// Resolves a logical endpoint path to the URL this transport must hit.
    ///
    /// The endpoint is appended to the origin's path, so an origin mounted
    /// under a prefix keeps it.
    pub fn resolve(&self, origins: &Origins, endpoint: &str) -> Result<Url> {
        let base = match self {
            Transport::BrowserFetch => &origins.serving,
            Transport::NativeBridge => &origins.native,
        };
        if base.cannot_be_a_base() {
            return Err(Error::url(format!("origin {base} cannot take a path"), None));
        }
        let mut url = base.clone();
        let path = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::BrowserFetch => write!(f, "fetch"),
            Transport::NativeBridge => write!(f, "native-bridge"),
        }
    }
}

/// The two origins a request may be resolved against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origins {
    /// Origin serving the client; used by [`Transport::BrowserFetch`].
    pub serving: Url,
    /// Deployed backend; used by [`Transport::NativeBridge`].
    pub native: Url,
}

impl Origins {
    /// Parses both origins.
    pub fn parse(serving: &str, native: &str) -> Result<Self> {
        Ok(Self {
            serving: Url::parse(serving)?,
            native: Url::parse(native)?,
        })
    }
}

impl Default for Origins {
    fn default() -> Self {
        // Both constants are valid absolute URLs.
        Self {
            serving: Url::parse(DEFAULT_SERVING_ORIGIN).expect("default serving origin"),
            native: Url::parse(DEFAULT_NATIVE_ORIGIN).expect("default native origin"),
        }
    }
}

/// HTTP method of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A fully resolved request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute target URL.
    pub url: Url,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

/// A response as received, before interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can carry an [`HttpRequest`].
///
/// Implementations report failures to get a response at all as errors; any
/// response that arrived, whatever its status, is returned as `Ok`.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues the request once.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestHttp {
    client: ReqwestClient,
    timeout: Duration,
}

impl ReqwestHttp {
    /// Creates the in-process client used by [`Transport::BrowserFetch`].
    ///
    /// Requests carry the serving origin as their `Origin` header, the way a
    /// page served from that origin would.
    pub fn fetch(serving_origin: &Url, timeout: Duration) -> Result<Self> {
        let origin = serving_origin.origin().ascii_serialization();
        let origin = HeaderValue::from_str(&origin).map_err(|e| {
            Error::http_client(
                format!("Invalid origin header {origin}: {e}"),
                Some(Box::new(e)),
            )
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, origin);
        Self::build(headers, FETCH_USER_AGENT, timeout)
    }

    /// Creates the client used by [`Transport::NativeBridge`].
    ///
    /// The bridge issues requests outside any page, so no `Origin` header is
    /// sent and cross-origin rules do not apply.
    pub fn bridge(timeout: Duration) -> Result<Self> {
        Self::build(HeaderMap::new(), NATIVE_USER_AGENT, timeout)
    }

    fn build(mut headers: HeaderMap, user_agent: &'static str, timeout: Duration) -> Result<Self> {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let client = ReqwestClient::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self { client, timeout })
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestHttp {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    Some(self.timeout.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::http_client(
                format!("Failed to read response body: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Body of a chat request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub message: String,
}

impl ChatRequest {
    /// Creates a chat request.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A decoded chat reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    /// Reply text with tool-call markup removed.
    pub reply: String,
    /// Credits the call consumed, if the backend said.
    pub credits_used: Option<i64>,
}

/// Account-wide usage as reported by the usage endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountUsage {
    /// Credits used on the account.
    pub used: f64,
    /// Credits remaining on the account.
    pub remaining: f64,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct ChatBody {
    reply: Option<String>,
    #[serde(rename = "creditsUsed")]
    credits_used: Option<serde_json::Value>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct UsageBody {
    usage: Option<AccountUsage>,
    error: Option<String>,
}

/// Chooses between the fetch client and the native bridge per request.
#[derive(Clone)]
pub struct TransportSelector {
    probe: Arc<dyn PlatformProbe>,
    fetch: Arc<dyn HttpClient>,
    bridge: Arc<dyn HttpClient>,
    origins: Origins,
    logger: Option<Arc<dyn TransportLogger>>,
}

impl TransportSelector {
    /// Creates a selector over the given probe, clients, and origins.
    pub fn new(
        probe: Arc<dyn PlatformProbe>,
        fetch: Arc<dyn HttpClient>,
        bridge: Arc<dyn HttpClient>,
        origins: Origins,
    ) -> Self {
        Self {
            probe,
            fetch,
            bridge,
            origins,
            logger: None,
        }
    }

    /// Creates a selector with `reqwest` clients for both transports.
    pub fn with_reqwest(
        probe: Arc<dyn PlatformProbe>,
        origins: Origins,
        timeout: Duration,
    ) -> Result<Self> {
        let fetch = ReqwestHttp::fetch(&origins.serving, timeout)?;
        let bridge = ReqwestHttp::bridge(timeout)?;
        Ok(Self::new(probe, Arc::new(fetch), Arc::new(bridge), origins))
    }

    /// Attaches a logger that sees every request and response.
    pub fn with_logger(mut self, logger: Arc<dyn TransportLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Returns the configured origins.
    pub fn origins(&self) -> &Origins {
        &self.origins
    }

    /// Returns the transport the next request would use.
    pub fn current_transport(&self) -> Transport {
        Transport::select(self.probe.as_ref())
    }

    /// Posts `payload` to `endpoint` and decodes a chat reply.
    ///
    /// The request is sent at most once.
    pub async fn send<P: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<ChatReply> {
        let body = serde_json::to_value(payload)?;
        let response = self.dispatch(Method::Post, endpoint, Some(body)).await?;
        decode_chat(&response).inspect_err(|err| {
            TRANSPORT_ERRORS.click();
            warn!(endpoint = endpoint, status = response.status, error = %err, "chat reply rejected");
        })
    }

    /// Queries account-wide credit usage.
    pub async fn fetch_usage(&self) -> Result<AccountUsage> {
        let response = self.dispatch(Method::Get, USAGE_ENDPOINT, None).await?;
        decode_usage(&response).inspect_err(|err| {
            TRANSPORT_ERRORS.click();
            warn!(status = response.status, error = %err, "usage reply rejected");
        })
    }

    async fn dispatch(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse> {
        let transport = self.current_transport();
        let url = transport.resolve(&self.origins, endpoint)?;
        let request = HttpRequest { method, url, body };
        TRANSPORT_REQUESTS.click();
        let client = match transport {
            Transport::BrowserFetch => {
                TRANSPORT_FETCH.click();
                &self.fetch
            }
            Transport::NativeBridge => {
                TRANSPORT_NATIVE.click();
                &self.bridge
            }
        };
        debug!(%transport, %method, url = %request.url, "dispatching request");
        if let Some(logger) = &self.logger {
            logger.log_request(transport, &request);
        }
        let start = Instant::now();
        let result = client.execute(request).await;
        TRANSPORT_DURATION.add(start.elapsed().as_secs_f64());
        match result {
            Ok(response) => {
                debug!(%transport, status = response.status, "response received");
                if let Some(logger) = &self.logger {
                    logger.log_response(transport, &response);
                }
                Ok(response)
            }
            Err(err) => {
                TRANSPORT_ERRORS.click();
                warn!(%transport, error = %err, "request failed");
                if let Some(logger) = &self.logger {
                    logger.log_failure(transport, &err);
                }
                Err(err)
            }
        }
    }
}

fn decode_chat(response: &HttpResponse) -> Result<ChatReply> {
    if !response.is_success() {
        return Err(error_from_response(response));
    }
    let body: ChatBody = serde_json::from_str(&response.body).map_err(|e| {
        Error::serialization(
            format!("Failed to parse chat reply: {}", e),
            Some(Box::new(e)),
        )
    })?;
    match (body.reply, body.error) {
        (Some(reply), _) => Ok(ChatReply {
            reply: strip_tool_calls(&reply),
            credits_used: credits_from_json(body.credits_used.as_ref()),
        }),
        (None, Some(error)) => Err(Error::backend(response.status, error)),
        (None, None) => Err(Error::serialization("chat reply has no reply field", None)),
    }
}

fn decode_usage(response: &HttpResponse) -> Result<AccountUsage> {
    if !response.is_success() {
        return Err(error_from_response(response));
    }
    let body: UsageBody = serde_json::from_str(&response.body).map_err(|e| {
        Error::serialization(
            format!("Failed to parse usage reply: {}", e),
            Some(Box::new(e)),
        )
    })?;
    match (body.usage, body.error) {
        (Some(usage), _) => Ok(usage),
        (None, Some(error)) => Err(Error::backend(response.status, error)),
        (None, None) => Err(Error::serialization("usage reply has no usage field", None)),
    }
}

fn error_from_response(response: &HttpResponse) -> Error {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&response.body) {
        return Error::backend(response.status, body.error);
    }
    let message = if response.body.trim().is_empty() {
        StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("request failed")
            .to_string()
    } else {
        response.body.clone()
    };
    Error::api(response.status, message)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned results and records every request it sees.
    #[derive(Default)]
    pub struct FakeHttp {
        pub requests: Mutex<Vec<HttpRequest>>,
        pub responses: Mutex<VecDeque<Result<HttpResponse>>>,
    }

    impl FakeHttp {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn push(&self, status: u16, body: &str) {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }));
        }

        pub fn push_err(&self, err: Error) {
            self.responses.lock().unwrap().push_back(Err(err));
        }

        pub fn urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.url.to_string())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for FakeHttp {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::connection("no canned response", None)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    use super::testing::FakeHttp;
    use super::*;
    use crate::platform::{FixedProbe, Platform};

    struct ToggleProbe(AtomicBool);

    impl PlatformProbe for ToggleProbe {
        fn platform(&self) -> Platform {
            if self.0.load(Ordering::Relaxed) {
                Platform::Ios
            } else {
                Platform::Web
            }
        }
    }

    fn selector(
        probe: Arc<dyn PlatformProbe>,
    ) -> (TransportSelector, Arc<FakeHttp>, Arc<FakeHttp>) {
        let fetch = FakeHttp::new();
        let bridge = FakeHttp::new();
        let selector = TransportSelector::new(
            probe,
            fetch.clone(),
            bridge.clone(),
            Origins::parse("http://localhost:3000", "https://backend.example.com").unwrap(),
        );
        (selector, fetch, bridge)
    }

    #[test]
    fn select_follows_probe() {
        assert_eq!(
            Transport::select(&FixedProbe(Platform::Web)),
            Transport::BrowserFetch
        );
        assert_eq!(
            Transport::select(&FixedProbe(Platform::Android)),
            Transport::NativeBridge
        );
    }

    #[test]
    fn resolve_uses_transport_origin() {
        let origins = Origins::default();
        assert_eq!(
            Transport::BrowserFetch
                .resolve(&origins, CHAT_ENDPOINT)
                .unwrap()
                .as_str(),
            "http://localhost:3000/api/chat"
        );
        assert_eq!(
            Transport::NativeBridge
                .resolve(&origins, CHAT_ENDPOINT)
                .unwrap()
                .as_str(),
            "https://chatbot-4sjt.vercel.app/api/chat"
        );
    }

    #[test]
    fn resolve_keeps_origin_path_prefix() {
        let origins = Origins::parse("http://localhost:3000/", "https://host.test/prefix").unwrap();
        assert_eq!(
            Transport::NativeBridge
                .resolve(&origins, CHAT_ENDPOINT)
                .unwrap()
                .as_str(),
            "https://host.test/prefix/api/chat"
        );
        let origins = Origins::parse("http://host.test/app/", "https://host.test").unwrap();
        assert_eq!(
            Transport::BrowserFetch
                .resolve(&origins, USAGE_ENDPOINT)
                .unwrap()
                .as_str(),
            "http://host.test/app/api/usage"
        );
    }

    #[test]
    fn resolve_rejects_opaque_origin() {
        let origins = Origins::parse("mailto:someone@host.test", "https://host.test").unwrap();
        let err = Transport::BrowserFetch
            .resolve(&origins, CHAT_ENDPOINT)
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn web_platform_uses_fetch_with_serving_origin() {
        let (selector, fetch, bridge) = selector(Arc::new(FixedProbe(Platform::Web)));
        fetch.push(200, r#"{"reply": "Paris", "creditsUsed": 3}"#);

        let reply = assert_ok!(
            selector
                .send(CHAT_ENDPOINT, &ChatRequest::new("capital of France"))
                .await
        );
        assert_eq!(reply.reply, "Paris");
        assert_eq!(reply.credits_used, Some(3));
        assert_eq!(fetch.urls(), vec!["http://localhost:3000/api/chat"]);
        assert!(bridge.urls().is_empty());

        let requests = fetch.requests.lock().unwrap();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(
            requests[0].body,
            Some(json!({"message": "capital of France"}))
        );
    }

    #[tokio::test]
    async fn native_platform_uses_bridge_with_backend_origin() {
        let (selector, fetch, bridge) = selector(Arc::new(FixedProbe(Platform::Ios)));
        bridge.push(200, r#"{"reply": "Paris", "creditsUsed": 1}"#);

        assert_ok!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("q")).await);
        assert_eq!(bridge.urls(), vec!["https://backend.example.com/api/chat"]);
        assert!(fetch.urls().is_empty());
    }

    #[tokio::test]
    async fn probe_is_consulted_per_call() {
        let probe = Arc::new(ToggleProbe(AtomicBool::new(false)));
        let (selector, fetch, bridge) = selector(probe.clone());
        fetch.push(200, r#"{"reply": "one"}"#);
        bridge.push(200, r#"{"reply": "two"}"#);

        assert_ok!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("a")).await);
        probe.0.store(true, Ordering::Relaxed);
        assert_eq!(selector.current_transport(), Transport::NativeBridge);
        assert_ok!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("b")).await);

        assert_eq!(fetch.urls().len(), 1);
        assert_eq!(bridge.urls().len(), 1);
    }

    #[tokio::test]
    async fn reply_is_sanitized_and_credits_optional() {
        let (selector, fetch, _) = selector(Arc::new(FixedProbe(Platform::Web)));
        fetch.push(
            200,
            r#"{"reply": "<codebuff_tool_call>ignore</codebuff_tool_call>Paris"}"#,
        );
        let reply = assert_ok!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("q")).await);
        assert_eq!(reply.reply, "Paris");
        assert_eq!(reply.credits_used, None);
    }

    #[tokio::test]
    async fn error_payload_becomes_backend_error() {
        let (selector, fetch, _) = selector(Arc::new(FixedProbe(Platform::Web)));
        fetch.push(400, r#"{"error": "Message is required"}"#);
        let err = assert_err!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("q")).await);
        assert!(err.is_backend());
        assert_eq!(err.status_code(), Some(400));
        assert!(err.to_string().contains("Message is required"));
    }

    #[tokio::test]
    async fn non_json_failure_becomes_api_error() {
        let (selector, fetch, _) = selector(Arc::new(FixedProbe(Platform::Web)));
        fetch.push(502, "");
        let err = assert_err!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("q")).await);
        assert!(matches!(err, Error::Api { status_code: 502, ref message } if message == "Bad Gateway"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_serialization_error() {
        let (selector, fetch, _) = selector(Arc::new(FixedProbe(Platform::Web)));
        fetch.push(200, "<html>oops</html>");
        fetch.push(200, r#"{"creditsUsed": 2}"#);
        let err = assert_err!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("q")).await);
        assert!(matches!(err, Error::Serialization { .. }));
        let err = assert_err!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("q")).await);
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[tokio::test]
    async fn network_failure_is_returned_not_retried() {
        let (selector, fetch, _) = selector(Arc::new(FixedProbe(Platform::Web)));
        fetch.push_err(Error::connection("connection refused", None));
        fetch.push(200, r#"{"reply": "late"}"#);
        let err = assert_err!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("q")).await);
        assert!(err.is_connection());
        assert_eq!(fetch.urls().len(), 1);
    }

    #[tokio::test]
    async fn usage_query_decodes_payload() {
        let (selector, fetch, _) = selector(Arc::new(FixedProbe(Platform::Web)));
        fetch.push(200, r#"{"usage": {"used": 12, "remaining": 88}}"#);
        fetch.push(500, r#"{"error": "Codebuff API returned status 401"}"#);

        let usage = assert_ok!(selector.fetch_usage().await);
        assert_eq!(usage.used, 12.0);
        assert_eq!(usage.remaining, 88.0);
        assert_eq!(fetch.urls()[0], "http://localhost:3000/api/usage");
        assert_eq!(fetch.requests.lock().unwrap()[0].method, Method::Get);

        let err = assert_err!(selector.fetch_usage().await);
        assert!(err.is_backend());
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<String>>,
    }

    impl TransportLogger for RecordingLogger {
        fn log_request(&self, transport: Transport, request: &HttpRequest) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{transport} {} {}", request.method, request.url));
        }

        fn log_response(&self, transport: Transport, response: &HttpResponse) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{transport} {}", response.status));
        }

        fn log_failure(&self, transport: Transport, _: &Error) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{transport} failed"));
        }
    }

    #[tokio::test]
    async fn logger_sees_requests_and_outcomes() {
        let logger = Arc::new(RecordingLogger::default());
        let (selector, _, bridge) = selector(Arc::new(FixedProbe(Platform::Android)));
        let selector = selector.with_logger(logger.clone());
        bridge.push(200, r#"{"reply": "ok"}"#);
        bridge.push_err(Error::timeout("slow", None));

        assert_ok!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("a")).await);
        assert_err!(selector.send(CHAT_ENDPOINT, &ChatRequest::new("b")).await);

        assert_eq!(
            *logger.events.lock().unwrap(),
            vec![
                "native-bridge POST https://backend.example.com/api/chat".to_string(),
                "native-bridge 200".to_string(),
                "native-bridge POST https://backend.example.com/api/chat".to_string(),
                "native-bridge failed".to_string(),
            ]
        );
    }

    #[test]
    fn reqwest_clients_build() {
        let origins = Origins::default();
        assert_ok!(ReqwestHttp::fetch(&origins.serving, DEFAULT_TIMEOUT));
        assert_ok!(ReqwestHttp::bridge(Duration::from_secs(5)));
    }
}
