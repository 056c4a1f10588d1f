//! Streaming backend client

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::error::TransportError;
use super::types::{ChatRequest, SummaryRequest};
use crate::config::ClientConfig;

/// Chat replies: framed `data:<base64>` events
pub const CHAT_STREAM_PATH: &str = "/llm/stream_chat";
/// Article summaries: raw UTF-8 text
pub const SUMMARY_STREAM_PATH: &str = "/llm/ai_summary/stream";

/// Response body as a stream of chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// HTTP client for the reader backend's streaming endpoints
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        // Validate once so every endpoint URL is well-formed later
        Url::parse(&config.backend_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    fn build_request(&self, url: Url) -> RequestBuilder {
        self.http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Open a chat reply stream (framed mode)
    pub async fn open_chat(&self, request: &ChatRequest) -> Result<ByteStream, TransportError> {
        info!(
            "Opening chat stream: model={}, {} messages",
            request.model,
            request.messages.len()
        );
        self.open(CHAT_STREAM_PATH, request).await
    }

    /// Open an article summary stream (raw mode)
    pub async fn open_summary(
        &self,
        request: &SummaryRequest,
    ) -> Result<ByteStream, TransportError> {
        info!("Opening summary stream for {}", request.url);
        self.open(SUMMARY_STREAM_PATH, request).await
    }

    async fn open<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ByteStream, TransportError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let response = self.build_request(url).json(body).send().await?;
        let response = handle_error_response(response).await?;
        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(TransportError::from)),
        ))
    }
}

/// Turn a non-success response into [`TransportError::Status`], preferring
/// the backend's JSON `detail` message.
async fn handle_error_response(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
    warn!("Backend returned {}: {}", status, detail);
    Err(TransportError::Status {
        status: status.as_u16(),
        detail,
    })
}

fn error_detail(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match json.get("detail")? {
        Value::String(detail) => (!detail.trim().is_empty()).then(|| detail.clone()),
        Value::Null => None,
        // FastAPI validation errors are arrays of objects
        other => Some(other.to_string()),
    }
}
