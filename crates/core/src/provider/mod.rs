//! Generative-text collaborators.
//!
//! The pipeline only needs `prompt -> text`; everything provider specific
//! (endpoints, request bodies, where the completion lives in the response)
//! stays behind [`Generator`].

#[cfg(feature = "http")]
mod gemini;
#[cfg(feature = "http")]
mod openai;

use std::{fmt, str::FromStr};

#[cfg(feature = "http")]
pub use gemini::GeminiClient;
#[cfg(feature = "http")]
pub use openai::OpenAiClient;
#[cfg(feature = "http")]
use serde::Deserialize;

use crate::error::{Error, Result};

/// Sampling options sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
	pub model: String,
	/// Lower is more deterministic.
	pub temperature: f64,
	pub max_output_tokens: u32,
}

impl GenerationParams {
	#[must_use]
	pub fn for_provider(provider: Provider) -> Self {
		Self {
			model: provider.default_model().to_string(),
			..Self::default()
		}
	}
}

impl Default for GenerationParams {
	fn default() -> Self {
		Self {
			model: Provider::Gemini.default_model().to_string(),
			temperature: 0.2,
			max_output_tokens: 2000,
		}
	}
}

/// Produces completion text for a prompt.
#[allow(async_fn_in_trait)]
pub trait Generator {
	/// Returns the raw, unparsed completion text.
	///
	/// # Errors
	///
	/// [`Error::Credential`] for a blank credential (before any request) and
	/// [`Error::Transport`] when the request fails.
	async fn generate(&self, prompt: &str, credential: &str, params: &GenerationParams) -> Result<String>;
}

/// The generative-text APIs with built-in clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
	#[default]
	Gemini,
	OpenAi,
}

impl Provider {
	#[must_use]
	pub fn default_model(self) -> &'static str {
		match self {
			Self::Gemini => "gemini-1.5-flash-latest",
			Self::OpenAi => "gpt-4o-mini",
		}
	}

	/// Key under which this provider's credential is persisted.
	#[must_use]
	pub fn credential_key(self) -> &'static str {
		match self {
			Self::Gemini => "gemini_api_key",
			Self::OpenAi => "openai_api_key",
		}
	}
}

impl fmt::Display for Provider {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::Gemini => "gemini",
			Self::OpenAi => "openai",
		})
	}
}

impl FromStr for Provider {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.to_ascii_lowercase().as_str() {
			"gemini" | "google" => Self::Gemini,
			"openai" => Self::OpenAi,
			_ => return Err(format!("unknown provider {s:?} (expected gemini or openai)")),
		})
	}
}

/// Returns the trimmed credential, or [`Error::Credential`] if it is blank.
///
/// # Errors
///
/// [`Error::Credential`] when `credential` is empty or whitespace.
pub fn require_credential(credential: &str) -> Result<&str> {
	let credential = credential.trim();

	if credential.is_empty() {
		Err(Error::Credential)
	} else {
		Ok(credential)
	}
}

/// `{"error": {"message": ...}}`, the failure body shape shared by both APIs.
#[cfg(feature = "http")]
#[derive(Debug, Deserialize)]
struct ErrorResponse {
	error: ApiError,
}

#[cfg(feature = "http")]
#[derive(Debug, Deserialize)]
struct ApiError {
	message: Option<String>,
}

/// Message for a non-success response body, falling back to a generic one.
#[cfg(feature = "http")]
fn error_message(body: &str) -> String {
	serde_json::from_str::<ErrorResponse>(body)
		.ok()
		.and_then(|response| response.error.message)
		.filter(|message| !message.is_empty())
		.unwrap_or_else(|| String::from("API request failed"))
}
