//! [`TogetherModel`]: one catalog model exposed to the host.

use crate::client::TogetherClient;
use crate::config::KEY_ENV_VAR;
use crate::options::TogetherOptions;
use crate::prompt;
use crate::types::{CompletionRequest, ModelDescriptor};
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use together_models::{Conversation, Model, ModelError, Prompt, TextStream};

/// Everything one call to [`TogetherModel::run`] needs.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    /// The prompt text.
    pub prompt: &'a str,
    /// Optional system prefix.
    pub system: Option<&'a str>,
    /// Prior exchanges, oldest first.
    pub conversation: Option<&'a Conversation>,
    /// Validated generation options.
    pub options: TogetherOptions,
    /// Whether to stream fragments as they are generated.
    pub stream: bool,
    /// Key overriding the one the client was created with.
    pub api_key: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    /// Creates a blocking invocation with default options.
    #[must_use]
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            system: None,
            conversation: None,
            options: TogetherOptions::default(),
            stream: false,
            api_key: None,
        }
    }
}

/// A completion model from the Together catalog.
///
/// Created by [`TogetherPlugin`](crate::TogetherPlugin), one per catalog
/// entry. All models from one plugin share its HTTP client.
#[derive(Debug, Clone)]
pub struct TogetherModel {
    descriptor: ModelDescriptor,
    client: Arc<TogetherClient>,
}

impl TogetherModel {
    /// Binds a catalog entry to a client.
    #[must_use]
    pub fn new(descriptor: ModelDescriptor, client: Arc<TogetherClient>) -> Self {
        Self { descriptor, client }
    }

    /// The catalog entry this model was created from.
    #[must_use]
    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Runs one completion and returns its text fragments.
    ///
    /// The prompt is assembled before this returns; the request itself is
    /// sent when the stream is first polled.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the model's config block, prompt
    /// template or stop sequences are malformed.
    pub fn run(&self, invocation: &Invocation<'_>) -> Result<TextStream, ModelError> {
        let assembled = prompt::assemble(
            self.descriptor.config()?,
            invocation.system,
            invocation.prompt,
            invocation.conversation,
        )?;

        let request = CompletionRequest {
            model: self.descriptor.id.clone(),
            prompt: assembled.text,
            stream: None,
            stop: assembled.stop,
            params: invocation.options.normalized(),
        };

        tracing::debug!(
            model = %request.model,
            stream = invocation.stream,
            prompt_len = request.prompt.len(),
            stop = request.stop.len(),
            "running completion"
        );

        let client = Arc::clone(&self.client);
        let api_key = invocation.api_key.map(ToOwned::to_owned);

        if invocation.stream {
            return Ok(TextStream::new(async_stream::stream! {
                let mut chunks = match client.stream_completion(&request, api_key.as_deref()).await {
                    Ok(chunks) => chunks,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                };
                while let Some(chunk) = chunks.next().await {
                    match chunk {
                        Ok(chunk) => {
                            if let Some(text) = chunk.into_text() {
                                yield Ok(text);
                            }
                        }
                        Err(err) => {
                            yield Err(err);
                            return;
                        }
                    }
                }
            }));
        }

        Ok(TextStream::new(async_stream::stream! {
            match client.create_completion(&request, api_key.as_deref()).await {
                Ok(response) => {
                    if let Some(text) = response.into_text() {
                        yield Ok(text);
                    }
                }
                Err(err) => yield Err(err),
            }
        }))
    }
}

impl Model for TogetherModel {
    fn model_id(&self) -> &str {
        &self.descriptor.id
    }

    fn needs_key(&self) -> Option<&str> {
        Some("together")
    }

    fn key_env_var(&self) -> Option<&str> {
        Some(KEY_ENV_VAR)
    }

    fn can_stream(&self) -> bool {
        true
    }

    fn options_schema(&self) -> Value {
        TogetherOptions::schema()
    }

    fn execute(
        &self,
        prompt: &Prompt,
        stream: bool,
        conversation: Option<&Conversation>,
        key: Option<&str>,
    ) -> Result<TextStream, ModelError> {
        let options = TogetherOptions::from_options(&prompt.options)?;
        self.run(&Invocation {
            prompt: &prompt.prompt,
            system: prompt.system.as_deref(),
            conversation,
            options,
            stream,
            api_key: key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TogetherConfig;
    use crate::types::ModelConfig;
    use futures::TryStreamExt;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model(server: &MockServer, descriptor: ModelDescriptor) -> TogetherModel {
        let config = TogetherConfig::new("sk-test").with_base_url(server.uri());
        TogetherModel::new(descriptor, Arc::new(TogetherClient::new(config)))
    }

    async fn sent_body(server: &MockServer) -> Value {
        server.received_requests().await.unwrap()[0]
            .body_json()
            .unwrap()
    }

    #[tokio::test]
    async fn streaming_skips_chunks_without_choices() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"text\":\"a\"}]}\n\n",
            "data: {\"choices\":[]}\n\n",
            "data: {\"choices\":[{\"text\":\"b\"}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let invocation = Invocation {
            stream: true,
            ..Invocation::new("Hi")
        };
        let fragments: Vec<String> = model(&server, ModelDescriptor::new("m"))
            .run(&invocation)
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(fragments, ["a", "b"]);
    }

    #[tokio::test]
    async fn streaming_skips_chunks_with_null_choices() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"text\":\"a\"}]}\n\n",
            "data: {\"choices\":null}\n\n",
            "data: {\"choices\":[{\"text\":\"b\"}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let invocation = Invocation {
            stream: true,
            ..Invocation::new("Hi")
        };
        let fragments: Vec<String> = model(&server, ModelDescriptor::new("m"))
            .run(&invocation)
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(fragments, ["a", "b"]);
    }

    #[tokio::test]
    async fn blocking_call_yields_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cmpl-1",
                "choices": [{ "text": "hello" }, { "text": "ignored" }]
            })))
            .mount(&server)
            .await;

        let fragments: Vec<String> = model(&server, ModelDescriptor::new("m"))
            .run(&Invocation::new("Hi"))
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(fragments, ["hello"]);
        let sent = sent_body(&server).await;
        assert!(sent.get("stream").is_none());
    }

    #[tokio::test]
    async fn blocking_call_without_choices_yields_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let text = model(&server, ModelDescriptor::new("m"))
            .run(&Invocation::new("Hi"))
            .unwrap()
            .text()
            .await
            .unwrap();

        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn blocking_call_with_null_choices_yields_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": null })))
            .mount(&server)
            .await;

        let fragments: Vec<String> = model(&server, ModelDescriptor::new("m"))
            .run(&Invocation::new("Hi"))
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert!(fragments.is_empty());
    }

    #[tokio::test]
    async fn request_carries_assembled_prompt_and_set_options_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let prompt = Prompt::new("Hi").option("temperature", 0.5);
        model(&server, ModelDescriptor::new("m"))
            .execute(&prompt, false, None, None)
            .unwrap()
            .text()
            .await
            .unwrap();

        assert_eq!(
            sent_body(&server).await,
            json!({
                "model": "m",
                "prompt": "\n\n\nHi",
                "stop": ["<human>"],
                "temperature": 0.5,
                "max_tokens": 8192
            })
        );
    }

    #[tokio::test]
    async fn config_shapes_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(body_partial_json(json!({
                "prompt": "[INST] Q1 [/INST] A1\n\n[INST] \n\nHi [/INST]",
                "stop": ["X"]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "choices": [{ "text": "ok" }] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let descriptor = ModelDescriptor::new("m").with_config(
            ModelConfig::default()
                .with_prompt_format("[INST] {prompt} [/INST]")
                .with_stop("X"),
        );
        let conversation = Conversation::new().turn("Q1", "A1");

        let text = model(&server, descriptor)
            .execute(&Prompt::new("Hi"), false, Some(&conversation), None)
            .unwrap()
            .text()
            .await
            .unwrap();

        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn key_override_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(header("authorization", "Bearer sk-other"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .expect(1)
            .mount(&server)
            .await;

        model(&server, ModelDescriptor::new("m"))
            .execute(&Prompt::new("Hi"), true, None, Some("sk-other"))
            .unwrap()
            .text()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn nothing_is_sent_until_polled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .expect(0)
            .mount(&server)
            .await;

        let stream = model(&server, ModelDescriptor::new("m"))
            .run(&Invocation::new("Hi"))
            .unwrap();
        drop(stream);
    }

    #[tokio::test]
    async fn invalid_options_fail_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let prompt = Prompt::new("Hi").option("temperature", 3.0);
        let err = model(&server, ModelDescriptor::new("m"))
            .execute(&prompt, false, None, None)
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidOptions(_)));
    }

    #[tokio::test]
    async fn malformed_config_fails_before_any_request() {
        let server = MockServer::start().await;
        let descriptor = ModelDescriptor::new("m")
            .with_config(ModelConfig::default().with_prompt_format("{question}"));

        let err = model(&server, descriptor)
            .run(&Invocation::new("Hi"))
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidConfig(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_object_config_fails_before_any_request() {
        let server = MockServer::start().await;
        let descriptor: ModelDescriptor =
            serde_json::from_value(json!({ "id": "m", "config": "oops" })).unwrap();

        let err = model(&server, descriptor)
            .run(&Invocation::new("Hi"))
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidConfig(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_is_yielded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = model(&server, ModelDescriptor::new("m"))
            .run(&Invocation::new("Hi"))
            .unwrap()
            .text()
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Auth(_)));
    }

    #[test]
    fn host_identity() {
        let config = TogetherConfig::new("sk-test");
        let model = TogetherModel::new(
            ModelDescriptor::new("org/model"),
            Arc::new(TogetherClient::new(config)),
        );

        assert_eq!(model.model_id(), "org/model");
        assert_eq!(model.needs_key(), Some("together"));
        assert_eq!(model.key_env_var(), Some("TOGETHER_API_KEY"));
        assert!(model.can_stream());
        assert!(model.options_schema()["properties"]["max_tokens"].is_object());
    }
}
