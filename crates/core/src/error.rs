use thiserror::Error;

/// Failures of a single extraction run. None of them are retried.
#[derive(Debug, Error)]
pub enum Error {
	#[error("no syllabus text to extract deadlines from")]
	EmptySyllabus,

	/// The API credential is missing or blank. Checked before any request is made.
	#[error("no API key configured")]
	Credential,

	/// The request could not complete or the API answered with a failure.
	#[error("request failed: {message}")]
	Transport {
		status: Option<u16>,
		message: String,
	},

	/// The completion text did not contain a usable JSON array. `raw` is kept
	/// for logs and tests and is never part of the display message.
	#[error("could not parse the deadlines returned by the model")]
	MalformedResponse { raw: String, reason: String },
}

impl Error {
	pub(crate) fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
		Self::Transport {
			status,
			message: message.into(),
		}
	}

	pub(crate) fn malformed(raw: &str, reason: impl Into<String>) -> Self {
		Self::MalformedResponse {
			raw: raw.to_string(),
			reason: reason.into(),
		}
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn malformed_display_hides_raw_text() {
		let err = Error::malformed("Sorry, I can't help with that.", "no JSON array found");

		let display = err.to_string();
		assert!(!display.contains("Sorry"));
		assert!(display.contains("could not parse"));
	}

	#[test]
	fn transport_display_carries_api_message() {
		let err = Error::transport(Some(400), "API key not valid. Please pass a valid API key.");

		assert_eq!(
			err.to_string(),
			"request failed: API key not valid. Please pass a valid API key."
		);
	}
}
