//! Client for the Gemini `generateContent` endpoint.
//!
//! GroFlow makes exactly one kind of outbound call: a prompt goes up, a block
//! of text comes back. [`gemini::GeminiClient`] performs that single round
//! trip with no retry and no streaming; every failure is mapped onto
//! [`GenerationError`] so the dashboard can show it as a notice.
//!
//! The credential travels as the `key` query parameter. Transport errors are
//! stripped of their URL before they are stored or logged so the key never
//! ends up in a log line.

pub mod gemini;

use std::time::Duration;

use thiserror::Error;

pub use gemini::{GatewayConfig, GeminiClient, ModelInfo};
pub use groflow_types;

/// Canonical Gemini API host.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Model used when the config does not name one.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("the API key was rejected (HTTP 400); check it in Settings")]
    InvalidCredential,
    #[error("rate limited by the generation API (HTTP 429); try again shortly")]
    RateLimited,
    #[error("generation API error {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("could not reach the generation API: {0}")]
    ConnectionFailed(#[source] reqwest::Error),
    #[error("invalid generation endpoint '{0}'")]
    InvalidEndpoint(String),
}

impl GenerationError {
    fn connection(err: reqwest::Error) -> Self {
        GenerationError::ConnectionFailed(err.without_url())
    }
}

/// Build the HTTP client used for every request to `base_url`.
///
/// Only a connect timeout is set; a slow generation is allowed to take as
/// long as the endpoint needs. HTTPS is enforced whenever the base URL is
/// itself HTTPS.
pub fn http_client(base_url: &str) -> Result<reqwest::Client, GenerationError> {
    base_client_builder(base_url.starts_with("https://"))
        .build()
        .map_err(GenerationError::connection)
}

fn base_client_builder(https_only: bool) -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(concat!("groflow/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(https_only)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .default_headers(default_headers)
}

/// Read an error response body, truncated to 32 KiB.
pub async fn read_capped_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Map a non-success status onto the error taxonomy.
pub(crate) async fn error_for_status(response: reqwest::Response) -> GenerationError {
    match response.status().as_u16() {
        400 => GenerationError::InvalidCredential,
        429 => GenerationError::RateLimited,
        status => GenerationError::Upstream {
            status,
            body: read_capped_error_body(response).await,
        },
    }
}
