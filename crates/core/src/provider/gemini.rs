use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{error_message, require_credential, GenerationParams, Generator};
use crate::error::{Error, Result};

const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
	content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
	text: Option<String>,
}

/// Google Generative AI `generateContent` client. The credential is an API
/// key passed as the `key` query parameter.
#[derive(Debug, Clone)]
pub struct GeminiClient {
	client: reqwest::Client,
	base_url: String,
}

impl Default for GeminiClient {
	fn default() -> Self {
		Self::new()
	}
}

impl GeminiClient {
	#[must_use]
	pub fn new() -> Self {
		Self::with_base_url(GOOGLE_API_BASE)
	}

	#[must_use]
	pub fn with_base_url(base_url: impl Into<String>) -> Self {
		Self::with_client(reqwest::Client::new(), base_url)
	}

	/// Use a custom HTTP client and models base URL (proxies, tests).
	#[must_use]
	pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
		Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		}
	}

	fn build_request_body(prompt: &str, params: &GenerationParams) -> Value {
		json!({
			"contents": [{ "parts": [{ "text": prompt }] }],
			"generationConfig": {
				"temperature": params.temperature,
				"maxOutputTokens": params.max_output_tokens,
			},
		})
	}
}

impl Generator for GeminiClient {
	async fn generate(&self, prompt: &str, credential: &str, params: &GenerationParams) -> Result<String> {
		let key = require_credential(credential)?;
		let url = format!("{}/{}:generateContent", self.base_url, params.model);

		debug!(model = %params.model, prompt_len = prompt.len(), "sending generateContent request");

		let response = self
			.client
			.post(&url)
			.query(&[("key", key)])
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

		let parsed: GenerateContentResponse = serde_json::from_str(&body)
			.map_err(|err| Error::transport(Some(status.as_u16()), format!("unexpected response body: {err}")))?;

		// all text parts of the first candidate
		parsed
			.candidates
			.into_iter()
			.next()
			.and_then(|candidate| candidate.content)
			.map(|content| {
				content
					.parts
					.into_iter()
					.filter_map(|part| part.text)
					.collect::<String>()
			})
			.filter(|text| !text.is_empty())
			.ok_or_else(|| Error::transport(Some(status.as_u16()), "response contained no completion text"))
	}
}
