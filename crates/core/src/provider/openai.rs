use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{error_message, require_credential, GenerationParams, Generator};
use crate::error::{Error, Result};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
	#[serde(default)]
	choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
	message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
	content: Option<String>,
}

/// Chat Completions client for OpenAI and compatible endpoints. The credential
/// is sent as a bearer token.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
	client: reqwest::Client,
	base_url: String,
}

impl Default for OpenAiClient {
	fn default() -> Self {
		Self::new()
	}
}

impl OpenAiClient {
	#[must_use]
	pub fn new() -> Self {
		Self::with_base_url(OPENAI_API_BASE)
	}

	#[must_use]
	pub fn with_base_url(base_url: impl Into<String>) -> Self {
		Self::with_client(reqwest::Client::new(), base_url)
	}

	#[must_use]
	pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
		Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		}
	}

	fn build_request_body(prompt: &str, params: &GenerationParams) -> Value {
		json!({
			"model": params.model,
			"messages": [{ "role": "user", "content": prompt }],
			"temperature": params.temperature,
			"max_tokens": params.max_output_tokens,
		})
	}
}

impl Generator for OpenAiClient {
	async fn generate(&self, prompt: &str, credential: &str, params: &GenerationParams) -> Result<String> {
		let key = require_credential(credential)?;
		let url = format!("{}/chat/completions", self.base_url);

		debug!(model = %params.model, prompt_len = prompt.len(), "sending chat completion request");

		let response = self
			.client
			.post(&url)
			.bearer_auth(key)
			.json(&Self::build_request_body(prompt, params))
			.send()
			.await
			.map_err(|err| Error::transport(None, err.to_string()))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|err| Error::transport(Some(status.as_u16()), err.to_string()))?;

		if !status.is_success() {
			return Err(Error::transport(Some(status.as_u16()), error_message(&body)));
		}

		let parsed: ChatCompletionResponse = serde_json::from_str(&body)
			.map_err(|err| Error::transport(Some(status.as_u16()), format!("unexpected response body: {err}")))?;

		parsed
			.choices
			.into_iter()
			.next()
			.and_then(|choice| choice.message)
			.and_then(|message| message.content)
			.filter(|text| !text.is_empty())
			.ok_or_else(|| Error::transport(Some(status.as_u16()), "response contained no completion text"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_body_carries_model_and_params() {
		let params = GenerationParams {
			model: "gpt-4o-mini".into(),
			temperature: 0.0,
			max_output_tokens: 1024,
		};

		let body = OpenAiClient::build_request_body("Extract deadlines", &params);

		assert_eq!(body["model"], "gpt-4o-mini");
		assert_eq!(body["messages"][0]["role"], "user");
		assert_eq!(body["messages"][0]["content"], "Extract deadlines");
		assert_eq!(body["max_tokens"], 1024);
	}

	#[test]
	fn temperature_serializes_exactly() {
		let params = GenerationParams {
			temperature: 0.2,
			..GenerationParams::for_provider(crate::provider::Provider::OpenAi)
		};

		let body = OpenAiClient::build_request_body("prompt", &params);

		assert_eq!(serde_json::to_string(&body["temperature"]).unwrap(), "0.2");
	}

	#[test]
	fn parse_choice_content() {
		let json = r#"{"id":"chatcmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"[]"},"finish_reason":"stop"}]}"#;
		let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();

		let message = response.choices[0].message.as_ref().unwrap();
		assert_eq!(message.content.as_deref(), Some("[]"));
	}
}
