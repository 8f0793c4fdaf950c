//! HTTP client for the deployed instruct endpoint
//!
//! Maps a generic "complete this prompt" request onto the model's
//! OpenAI-style chat API: one POST per call, bearer auth, a fixed
//! system+user message pair, and a JSON response carrying choices plus
//! token counts. No retries; every error surfaces to the caller.

use crate::config::{env_nonempty, ApiKey, InstructOptions};
use crate::error::{RagseedError, Result};
use crate::llm::CompletionModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Stop token used when the caller does not supply any.
pub const DEFAULT_STOP: &str = "<|endoftext|>";

/// Deployed models and their context windows.
const MODEL_CONTEXT_SIZES: &[(&str, u32)] = &[
    ("ibm/merlinite-7b", 4096),
    ("instructlab/granite-7b-lab", 4096),
];

/// Chat message as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// One choice in the endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
    /// Some deployments spell this `finished_reason`.
    #[serde(default, alias = "finished_reason")]
    pub finish_reason: Option<String>,
}

/// Token counts as reported by the endpoint. Every field is optional on
/// the wire; absent counts are treated as zero when aggregating.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageRecord {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// Full response body from the endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub system_fingerprint: Option<String>,
    #[serde(default)]
    pub usage: Option<UsageRecord>,
}

/// One generated completion and the reason generation stopped.
#[derive(Debug, Clone)]
pub struct GeneratedText {
    pub text: String,
    pub finish_reason: Option<String>,
}

/// Aggregate token accounting across provider responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Sum token counts over responses, counting absent fields as zero.
    pub fn aggregate<'a, I>(responses: I) -> Self
    where
        I: IntoIterator<Item = &'a ProviderResponse>,
    {
        let mut usage = TokenUsage::default();
        for response in responses {
            if let Some(record) = &response.usage {
                usage.prompt_tokens += record.prompt_tokens.unwrap_or(0);
                usage.completion_tokens += record.completion_tokens.unwrap_or(0);
                usage.total_tokens += record.total_tokens.unwrap_or(0);
            }
        }
        usage
    }
}

/// Result of a generate call: one entry per prompt actually processed.
#[derive(Debug, Clone)]
pub struct Completion {
    pub generations: Vec<GeneratedText>,
    pub usage: TokenUsage,
    pub model_name: String,
}

/// Client for the deployed instruct endpoint.
///
/// Holds immutable options and a pooled HTTP client. Safe to share across
/// tasks; every call performs exactly one outbound request.
#[derive(Debug)]
pub struct InstructClient {
    http_client: reqwest::Client,
    options: InstructOptions,
    apikey: Option<ApiKey>,
}

impl InstructClient {
    /// Create a client from options.
    ///
    /// Fails if `streaming` is requested. The API key falls back to the
    /// `MODEL_TOKEN` environment variable, the model name to `MODEL_NAME`;
    /// an ultimately empty model name is tolerated and left for the
    /// endpoint to reject.
    pub fn new(options: InstructOptions) -> Result<Self> {
        if options.streaming {
            return Err(RagseedError::Config(
                "streaming has not yet been implemented".to_string(),
            ));
        }

        let apikey = options
            .apikey
            .clone()
            .or_else(|| env_nonempty("MODEL_TOKEN").map(ApiKey::new));

        let mut options = options;
        if options.model_name.is_empty() {
            if let Some(name) = env_nonempty("MODEL_NAME") {
                options.model_name = name;
            }
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            options,
            apikey,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(InstructOptions::default())
    }

    pub fn options(&self) -> &InstructOptions {
        &self.options
    }

    /// Known model identifiers with their context windows.
    pub fn known_models() -> &'static [(&'static str, u32)] {
        MODEL_CONTEXT_SIZES
    }

    /// Context window for a known model identifier.
    pub fn context_size_for(model: &str) -> Result<u32> {
        MODEL_CONTEXT_SIZES
            .iter()
            .find(|(name, _)| *name == model)
            .map(|(_, size)| *size)
            .ok_or_else(|| {
                let known: Vec<&str> = MODEL_CONTEXT_SIZES.iter().map(|(name, _)| *name).collect();
                RagseedError::UnknownModel(format!(
                    "Unknown model: {}. Known models are: {}",
                    model,
                    known.join(", ")
                ))
            })
    }

    /// Context window for the configured model.
    pub fn max_context_size(&self) -> Result<u32> {
        Self::context_size_for(&self.options.model_name)
    }

    /// Effective parameter set for one invocation.
    ///
    /// Priority, lowest first: stored sampling options, `extra_params`,
    /// per-call overrides. `model_name` and `model_endpoint` are pinned
    /// last and always win.
    fn invocation_params(&self, overrides: &Map<String, Value>) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("temperature".to_string(), json!(self.options.temperature));
        params.insert("top_p".to_string(), json!(self.options.top_p));
        params.insert(
            "frequency_penalty".to_string(),
            json!(self.options.frequency_penalty),
        );
        params.insert(
            "presence_penalty".to_string(),
            json!(self.options.repetition_penalty),
        );
        params.insert("max_tokens".to_string(), json!(self.options.max_tokens));
        for (key, value) in &self.options.extra_params {
            params.insert(key.clone(), value.clone());
        }
        for (key, value) in overrides {
            params.insert(key.clone(), value.clone());
        }
        params.insert("model_name".to_string(), json!(self.options.model_name));
        params.insert(
            "model_endpoint".to_string(),
            json!(self.options.model_endpoint),
        );
        params
    }

    /// Build the JSON body for one prompt.
    ///
    /// `repetition_penalty` and `stream` ride along only when the
    /// effective set carries those keys (via `extra_params` or per-call
    /// overrides).
    fn build_request_body(
        &self,
        params: &Map<String, Value>,
        prompt: &str,
        stop: &[String],
    ) -> Value {
        let mut body = Map::new();
        body.insert(
            "model".to_string(),
            params.get("model_name").cloned().unwrap_or(Value::Null),
        );
        body.insert(
            "messages".to_string(),
            json!([
                { "role": "system", "content": self.options.system_prompt },
                { "role": "user", "content": prompt },
            ]),
        );
        body.insert(
            "temperature".to_string(),
            params.get("temperature").cloned().unwrap_or(Value::Null),
        );
        body.insert(
            "max_tokens".to_string(),
            params.get("max_tokens").cloned().unwrap_or(Value::Null),
        );
        body.insert(
            "top_p".to_string(),
            params.get("top_p").cloned().unwrap_or(Value::Null),
        );
        body.insert("stop".to_string(), json!(stop));
        body.insert("logprobs".to_string(), json!(false));

        if let Some(penalty) = params.get("repetition_penalty") {
            body.insert("repetition_penalty".to_string(), penalty.clone());
        }
        if let Some(stream) = params.get("streaming") {
            body.insert("stream".to_string(), stream.clone());
        }

        Value::Object(body)
    }

    /// POST the body and parse the response as JSON.
    ///
    /// HTTP status is not consulted; the endpoint reports failures inside
    /// the JSON body.
    async fn send_request(&self, body: &Value) -> Result<ProviderResponse> {
        let mut request = self
            .http_client
            .post(&self.options.model_endpoint)
            .json(body);

        if let Some(key) = &self.apikey {
            request = request.header("Authorization", format!("Bearer {}", key.expose()));
        }

        let response = request.send().await?;
        let parsed: ProviderResponse = response.json().await?;
        Ok(parsed)
    }

    fn completion_from_response(&self, response: ProviderResponse) -> Result<Completion> {
        if let Some(error) = &response.error {
            if !error.is_null() {
                let message = match error {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Err(RagseedError::Provider(message));
            }
        }

        if response.choices.is_empty() {
            return Err(RagseedError::EmptyResponse);
        }

        if let Some(fingerprint) = &response.system_fingerprint {
            tracing::debug!(%fingerprint, "provider system fingerprint");
        }

        let generations = response
            .choices
            .iter()
            .map(|choice| GeneratedText {
                text: choice.message.content.clone(),
                finish_reason: choice.finish_reason.clone(),
            })
            .collect();
        let usage = TokenUsage::aggregate([&response]);

        Ok(Completion {
            generations,
            usage,
            model_name: self.options.model_name.clone(),
        })
    }

    /// Complete one prompt, returning the first generated message's text.
    pub async fn call(&self, prompt: &str, stop: Option<&[String]>) -> Result<String> {
        self.call_with_params(prompt, stop, &Map::new()).await
    }

    /// [`call`](Self::call) with per-call parameter overrides.
    pub async fn call_with_params(
        &self,
        prompt: &str,
        stop: Option<&[String]>,
        overrides: &Map<String, Value>,
    ) -> Result<String> {
        let params = self.invocation_params(overrides);
        let stop = resolve_stop(stop);
        let body = self.build_request_body(&params, prompt, &stop);

        tracing::debug!(model = %self.options.model_name, "sending completion request");
        let response = self.send_request(&body).await?;
        let completion = self.completion_from_response(response)?;

        completion
            .generations
            .into_iter()
            .next()
            .map(|generation| generation.text)
            .ok_or(RagseedError::EmptyResponse)
    }

    /// Complete a batch of prompts.
    ///
    /// Only the first prompt is submitted; the endpoint takes a single
    /// message exchange per request and multi-prompt fan-out is not
    /// implemented. Remaining prompts are ignored with a warning.
    pub async fn generate(&self, prompts: &[String], stop: Option<&[String]>) -> Result<Completion> {
        self.generate_with_params(prompts, stop, &Map::new()).await
    }

    /// [`generate`](Self::generate) with per-call parameter overrides.
    pub async fn generate_with_params(
        &self,
        prompts: &[String],
        stop: Option<&[String]>,
        overrides: &Map<String, Value>,
    ) -> Result<Completion> {
        let first = prompts.first().ok_or_else(|| {
            RagseedError::InvalidInput("generate requires at least one prompt".to_string())
        })?;
        if prompts.len() > 1 {
            tracing::warn!(
                ignored = prompts.len() - 1,
                "only the first prompt is submitted per request"
            );
        }

        let params = self.invocation_params(overrides);
        let stop = resolve_stop(stop);
        let body = self.build_request_body(&params, first, &stop);

        tracing::debug!(model = %self.options.model_name, "sending generate request");
        let response = self.send_request(&body).await?;
        self.completion_from_response(response)
    }
}

#[async_trait]
impl CompletionModel for InstructClient {
    async fn call(&self, prompt: &str, stop: Option<&[String]>) -> Result<String> {
        InstructClient::call(self, prompt, stop).await
    }

    async fn generate(&self, prompts: &[String], stop: Option<&[String]>) -> Result<Completion> {
        InstructClient::generate(self, prompts, stop).await
    }

    fn model_name(&self) -> &str {
        &self.options.model_name
    }
}

fn resolve_stop(stop: Option<&[String]>) -> Vec<String> {
    match stop {
        Some(sequences) => sequences.to_vec(),
        None => vec![DEFAULT_STOP.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_options() -> InstructOptions {
        InstructOptions {
            model_endpoint: "http://localhost:8001".to_string(),
            model_name: "ibm/merlinite-7b".to_string(),
            apikey: Some(ApiKey::new("test-key")),
            ..Default::default()
        }
    }

    fn test_client() -> InstructClient {
        InstructClient::new(test_options()).unwrap()
    }

    #[test]
    fn test_streaming_is_rejected() {
        let options = InstructOptions {
            streaming: true,
            ..test_options()
        };
        let err = InstructClient::new(options).unwrap_err();
        assert!(matches!(err, RagseedError::Config(_)));
        assert!(err.to_string().contains("streaming"));
    }

    #[test]
    fn test_body_has_system_then_user_message() {
        let client = test_client();
        let params = client.invocation_params(&Map::new());
        let body = client.build_request_body(&params, "What is a molecule?", &resolve_stop(None));

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "What is a molecule?");
        assert_eq!(body["model"], "ibm/merlinite-7b");
        assert_eq!(body["logprobs"], false);
    }

    #[test]
    fn test_default_stop_sequence() {
        let client = test_client();
        let params = client.invocation_params(&Map::new());
        let body = client.build_request_body(&params, "hi", &resolve_stop(None));
        assert_eq!(body["stop"], json!(["<|endoftext|>"]));
    }

    #[test]
    fn test_explicit_stop_sequences() {
        let client = test_client();
        let params = client.invocation_params(&Map::new());
        let stop = vec!["\n\n".to_string(), "###".to_string()];
        let body = client.build_request_body(&params, "hi", &resolve_stop(Some(&stop)));
        assert_eq!(body["stop"], json!(["\n\n", "###"]));
    }

    #[test]
    fn test_repetition_penalty_only_via_passthrough() {
        let client = test_client();
        let params = client.invocation_params(&Map::new());
        let body = client.build_request_body(&params, "hi", &resolve_stop(None));
        assert!(body.get("repetition_penalty").is_none());
        assert!(body.get("stream").is_none());

        let mut extras = test_options();
        extras
            .extra_params
            .insert("repetition_penalty".to_string(), json!(1.05));
        extras.extra_params.insert("streaming".to_string(), json!(false));
        let client = InstructClient::new(extras).unwrap();
        let params = client.invocation_params(&Map::new());
        let body = client.build_request_body(&params, "hi", &resolve_stop(None));
        assert_eq!(body["repetition_penalty"], json!(1.05));
        assert_eq!(body["stream"], json!(false));
    }

    #[test]
    fn test_override_priority() {
        let mut options = test_options();
        options
            .extra_params
            .insert("temperature".to_string(), json!(0.2));
        let client = InstructClient::new(options).unwrap();

        // extra_params beats the stored field
        let params = client.invocation_params(&Map::new());
        assert_eq!(params["temperature"], json!(0.2));

        // per-call overrides beat extra_params
        let mut overrides = Map::new();
        overrides.insert("temperature".to_string(), json!(0.9));
        let params = client.invocation_params(&overrides);
        assert_eq!(params["temperature"], json!(0.9));
    }

    #[test]
    fn test_identity_params_cannot_be_overridden() {
        let client = test_client();
        let mut overrides = Map::new();
        overrides.insert("model_name".to_string(), json!("other-model"));
        overrides.insert("model_endpoint".to_string(), json!("http://elsewhere"));
        let params = client.invocation_params(&overrides);
        assert_eq!(params["model_name"], json!("ibm/merlinite-7b"));
        assert_eq!(params["model_endpoint"], json!("http://localhost:8001"));
    }

    #[test]
    fn test_provider_error_message_is_payload_value() {
        let client = test_client();
        let response: ProviderResponse = serde_json::from_value(json!({
            "choices": [],
            "error": "model overloaded"
        }))
        .unwrap();
        let err = client.completion_from_response(response).unwrap_err();
        match err {
            RagseedError::Provider(message) => assert_eq!(message, "model overloaded"),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_choices_is_empty_response() {
        let client = test_client();
        let response: ProviderResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        let err = client.completion_from_response(response).unwrap_err();
        assert!(matches!(err, RagseedError::EmptyResponse));
    }

    #[test]
    fn test_finished_reason_alias() {
        let client = test_client();
        let response: ProviderResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "hello" }, "finished_reason": "stop" }
            ]
        }))
        .unwrap();
        let completion = client.completion_from_response(response).unwrap();
        assert_eq!(completion.generations[0].text, "hello");
        assert_eq!(completion.generations[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_usage_aggregation_defaults_missing_to_zero() {
        let first: ProviderResponse = serde_json::from_value(json!({
            "choices": [],
            "usage": { "prompt_tokens": 3, "completion_tokens": 7, "total_tokens": 10 }
        }))
        .unwrap();
        let second: ProviderResponse = serde_json::from_value(json!({
            "choices": [],
            "usage": { "prompt_tokens": 5, "total_tokens": 5 }
        }))
        .unwrap();

        let usage = TokenUsage::aggregate([&first, &second]);
        assert_eq!(usage.prompt_tokens, 8);
        assert_eq!(usage.completion_tokens, 7);
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn test_usage_absent_entirely() {
        let response: ProviderResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        let usage = TokenUsage::aggregate([&response]);
        assert_eq!(usage, TokenUsage::default());
    }

    #[test]
    fn test_context_size_for_known_models() {
        assert_eq!(
            InstructClient::context_size_for("ibm/merlinite-7b").unwrap(),
            4096
        );
        assert_eq!(
            InstructClient::context_size_for("instructlab/granite-7b-lab").unwrap(),
            4096
        );
    }

    #[test]
    fn test_context_size_for_unknown_model() {
        let err = InstructClient::context_size_for("gpt-4").unwrap_err();
        match err {
            RagseedError::UnknownModel(message) => {
                assert!(message.contains("gpt-4"));
                assert!(message.contains("ibm/merlinite-7b"));
                assert!(message.contains("instructlab/granite-7b-lab"));
            }
            other => panic!("expected unknown model error, got {:?}", other),
        }
    }
}
