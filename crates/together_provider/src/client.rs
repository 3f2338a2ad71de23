//! Together API client.

use crate::config::TogetherConfig;
use crate::types::{
    CompletionChunk, CompletionRequest, CompletionResponse, ModelDescriptor, ModelList,
};
use core::pin::Pin;
use core::time::Duration;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use together_models::ModelError;

/// Marks the end of a streamed completion.
const DONE: &str = "[DONE]";

/// Chunks of a streamed completion, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<CompletionChunk, ModelError>> + Send>>;

/// HTTP client for the Together completions and models endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct TogetherClient {
    client: reqwest::Client,
    config: TogetherConfig,
}

impl TogetherClient {
    /// Creates a new client.
    #[must_use]
    pub fn new(config: TogetherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Returns the connection settings.
    #[must_use]
    pub fn config(&self) -> &TogetherConfig {
        &self.config
    }

    /// Lists the models in the catalog, in the order the API returns them.
    ///
    /// Entries without a string `id` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ModelError> {
        let url = format!("{}/models", self.config.base_url);
        let request = self.authorized(self.client.get(&url), None);
        let body = Self::send(request).await?;

        let list: ModelList = serde_json::from_str(&body).map_err(|err| {
            ModelError::InvalidResponse(format!(
                "Failed to parse model list: expected a list or a `data` list: {err}"
            ))
        })?;
        Ok(list.into_models())
    }

    /// Sends a blocking completion request.
    ///
    /// `api_key` overrides the configured key for this request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn create_completion(
        &self,
        request: &CompletionRequest,
        api_key: Option<&str>,
    ) -> Result<CompletionResponse, ModelError> {
        let url = format!("{}/completions", self.config.base_url);
        let builder = self.authorized(self.client.post(&url), api_key).json(request);
        let body = Self::send(builder).await?;

        serde_json::from_str(&body).map_err(|err| {
            ModelError::InvalidResponse(format!("Failed to parse response: {err}\nBody: {body}"))
        })
    }

    /// Sends a streaming completion request and returns its chunks.
    ///
    /// The request is sent with `stream: true` regardless of `request.stream`.
    /// The returned stream ends at the `[DONE]` event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with an error
    /// status. Failures after the response starts are yielded by the stream.
    pub async fn stream_completion(
        &self,
        request: &CompletionRequest,
        api_key: Option<&str>,
    ) -> Result<ChunkStream, ModelError> {
        let url = format!("{}/completions", self.config.base_url);
        let mut request = request.clone();
        request.stream = Some(true);

        let response = self
            .authorized(self.client.post(&url), api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| ModelError::Http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response
                .text()
                .await
                .map_err(|err| ModelError::Http(err.to_string()))?;
            return Err(status_error(status, &headers, body));
        }

        let events = response.bytes_stream().eventsource();
        let chunks = events
            .take_while(|event| {
                let done = matches!(event, Ok(event) if event.data.trim() == DONE);
                async move { !done }
            })
            .map(|event| {
                let event = event.map_err(|err| ModelError::Http(err.to_string()))?;
                parse_chunk(&event.data)
            });
        Ok(Box::pin(chunks))
    }

    fn authorized(&self, builder: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
        builder.bearer_auth(api_key.unwrap_or(self.config.api_key.as_str()))
    }

    async fn send(builder: RequestBuilder) -> Result<String, ModelError> {
        let response = builder
            .send()
            .await
            .map_err(|err| ModelError::Http(err.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|err| ModelError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &headers, body));
        }
        Ok(body)
    }
}

fn parse_chunk(data: &str) -> Result<CompletionChunk, ModelError> {
    let mut chunk: CompletionChunk = serde_json::from_str(data).map_err(|err| {
        ModelError::InvalidResponse(format!("Failed to parse chunk: {err}\nData: {data}"))
    })?;
    if let Some(error) = chunk.error.take() {
        return Err(ModelError::Provider {
            status: None,
            message: error.message,
            source: None,
        });
    }
    Ok(chunk)
}

fn status_error(status: StatusCode, headers: &HeaderMap, body: String) -> ModelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => ModelError::RateLimited {
            retry_after: headers
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        },
        _ => ModelError::Provider {
            status: Some(status.as_u16()),
            message: body,
            source: None,
        },
    }
}

impl core::fmt::Debug for TogetherClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TogetherClient")
            .field("base_url", &self.config.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
