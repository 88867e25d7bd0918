//! HTTP client for the provider's chat completion endpoint

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::error::UpstreamError;
use super::provider::{ChatProvider, LineStream};
use super::sse::sse_lines;
use super::types::{CompletionResponse, UpstreamRequest};

/// Client for an OpenAI-style chat endpoint that takes an `app_code`
pub struct LinkAiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Full URL of the chat completion endpoint
    endpoint: String,
    /// Bearer credential
    api_key: String,
}

impl LinkAiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| {
                UpstreamError::Unreachable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Post the request and check the response status
    async fn post(&self, request: &UpstreamRequest) -> Result<reqwest::Response, UpstreamError> {
        debug!(
            messages = request.messages.len(),
            stream = request.stream,
            "Posting to upstream"
        );

        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if request.stream {
            builder = builder.header("Accept", "text/event-stream");
        }

        let response = builder.json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for LinkAiClient {
    async fn send_buffered(&self, request: UpstreamRequest) -> Result<String, UpstreamError> {
        let response = self.post(&request).await?;
        let body = response.text().await?;

        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::MalformedResponse(format!("{}: {}", e, body)))?;

        completion.reply_text().ok_or_else(|| {
            UpstreamError::MalformedResponse(format!("missing choices[0].message.content: {}", body))
        })
    }

    async fn send_streamed(&self, request: UpstreamRequest) -> Result<LineStream, UpstreamError> {
        let response = self.post(&request).await?;
        Ok(sse_lines(response.bytes_stream()))
    }
}
