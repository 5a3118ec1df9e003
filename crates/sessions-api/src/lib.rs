//! HTTP integration for the activities service.
//!
//! Provides the two collaborators around the session computation:
//! - Fetching the raw activity list
//! - Submitting computed sessions
//!
//! Each call is attempted exactly once. Non-success statuses are mapped to a
//! [`StatusCategory`] and returned as [`ApiError::Status`].

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use sessions_core::{ActivitiesPayload, RawActivity, SessionsPayload};
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const ACTIVITIES_ENDPOINT: &str = "/challenges/v1/activities";
pub const SESSIONS_ENDPOINT: &str = "/challenges/v1/activities/sessions";

/// Human-readable category for a non-success response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    TooManyRequests,
    InternalServerError,
    Other,
}

impl StatusCategory {
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::TooManyRequests => "Too many requests",
            Self::InternalServerError => "Internal server error",
            Self::Other => "Something went wrong",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// The base URL could not be parsed.
    #[error("invalid API URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The service could not be reached or the connection failed mid-request.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("{category} (status {status})")]
    Status { status: u16, category: StatusCategory },
    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Activities service client.
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, if the
    /// base URL is not an absolute http(s) URL, or if the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(ApiError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(ApiError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let parsed = reqwest::Url::parse(&base_url).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url,
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetches the raw activity list.
    pub async fn fetch_activities(&self) -> Result<Vec<RawActivity>, ApiError> {
        let url = self.endpoint(ACTIVITIES_ENDPOINT);
        tracing::debug!(%url, "fetching activities");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let payload: ActivitiesPayload = decode(&body)?;
        tracing::debug!(count = payload.activities.len(), "fetched activities");
        Ok(payload.activities)
    }

    /// Submits computed sessions.
    pub async fn submit_sessions(&self, payload: &SessionsPayload) -> Result<(), ApiError> {
        let url = self.endpoint(SESSIONS_ENDPOINT);
        tracing::debug!(%url, users = payload.user_sessions.len(), "submitting sessions");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(payload)
            .send()
            .await?;

        read_success_body(response).await?;
        Ok(())
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let category = StatusCategory::from_status(status.as_u16());
        tracing::debug!(status = status.as_u16(), %category, %body, "request rejected");
        return Err(ApiError::Status {
            status: status.as_u16(),
            category,
        });
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves a single canned HTTP response and returns the raw request.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (base_url, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn client_rejects_empty_api_key() {
        assert!(matches!(
            Client::new("http://localhost", ""),
            Err(ApiError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_rejects_whitespace_api_key() {
        assert!(matches!(
            Client::new("http://localhost", "   "),
            Err(ApiError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_rejects_invalid_base_url() {
        assert!(matches!(
            Client::new("not a url", "key"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            Client::new("ftp://example.com", "key"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn client_debug_redacts_api_key() {
        let client = Client::new("https://api.example.com", "secret-key").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = Client::new("https://api.example.com/", "key").unwrap();
        assert_eq!(
            client.endpoint(ACTIVITIES_ENDPOINT),
            "https://api.example.com/challenges/v1/activities"
        );
        assert_eq!(
            client.endpoint(SESSIONS_ENDPOINT),
            "https://api.example.com/challenges/v1/activities/sessions"
        );
    }

    #[test]
    fn status_categories_match_known_codes() {
        let cases = [
            (400, "Bad request"),
            (401, "Unauthorized"),
            (403, "Forbidden"),
            (404, "Not found"),
            (429, "Too many requests"),
            (500, "Internal server error"),
            (502, "Something went wrong"),
            (418, "Something went wrong"),
        ];
        for (status, message) in cases {
            assert_eq!(StatusCategory::from_status(status).to_string(), message);
        }
    }

    #[tokio::test]
    async fn fetch_activities_decodes_payload_and_sends_key() {
        let body = r#"{"activities":[{"id":1,"user_id":"u1","first_seen_at":"2023-01-01T00:00:00Z","answered_at":"2023-01-01T00:00:10Z"}]}"#;
        let (base_url, server) = serve_once(http_response("200 OK", body)).await;
        let client = Client::new(base_url, "secret-key").unwrap();

        let activities = client.fetch_activities().await.unwrap();
        assert_eq!(activities.len(), 1);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /challenges/v1/activities HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: secret-key"));
    }

    #[tokio::test]
    async fn fetch_activities_maps_status() {
        let (base_url, _server) = serve_once(http_response("401 Unauthorized", "")).await;
        let client = Client::new(base_url, "key").unwrap();

        let err = client.fetch_activities().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status {
                status: 401,
                category: StatusCategory::Unauthorized
            }
        ));
        assert_eq!(err.to_string(), "Unauthorized (status 401)");
    }

    #[tokio::test]
    async fn fetch_activities_rejects_malformed_body() {
        let (base_url, _server) = serve_once(http_response("200 OK", r#"{"items":[]}"#)).await;
        let client = Client::new(base_url, "key").unwrap();

        let err = client.fetch_activities().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn submit_sessions_posts_payload() {
        let (base_url, server) = serve_once(http_response("204 No Content", "")).await;
        let client = Client::new(base_url, "key").unwrap();

        client
            .submit_sessions(&SessionsPayload::default())
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /challenges/v1/activities/sessions HTTP/1.1"));
        assert!(request.ends_with(r#"{"user_sessions":{}}"#));
    }

    #[tokio::test]
    async fn submit_sessions_maps_server_error() {
        let (base_url, _server) =
            serve_once(http_response("500 Internal Server Error", "")).await;
        let client = Client::new(base_url, "key").unwrap();

        let err = client
            .submit_sessions(&SessionsPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status {
                category: StatusCategory::InternalServerError,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new(format!("http://{addr}"), "key").unwrap();
        let err = client.fetch_activities().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
