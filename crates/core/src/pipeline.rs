use chrono::{Datelike, Local};
use tracing::{debug, info, warn};

use crate::{
	error::{Error, Result},
	normalize::{normalize, Normalized},
	prompt::build_prompt,
	provider::{require_credential, GenerationParams, Generator},
	response,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
	/// Year assumed for dates written without one.
	pub default_year: i32,
	pub params: GenerationParams,
}

impl Default for ExtractOptions {
	fn default() -> Self {
		Self {
			default_year: Local::now().year(),
			params: GenerationParams::default(),
		}
	}
}

/// Extract deadlines from `syllabus`: build the prompt, ask `generator` for a
/// completion, then repair, parse and normalize it.
///
/// # Errors
///
/// - [`Error::EmptySyllabus`] if `syllabus` is blank.
/// - [`Error::Credential`] if `credential` is blank; no request is made.
/// - [`Error::Transport`] from the generator.
/// - [`Error::MalformedResponse`] if the completion holds no JSON array.
pub async fn extract<G: Generator>(
	generator: &G,
	syllabus: &str,
	credential: &str,
	options: &ExtractOptions,
) -> Result<Normalized> {
	if syllabus.trim().is_empty() {
		return Err(Error::EmptySyllabus);
	}

	let credential = require_credential(credential)?;
	let prompt = build_prompt(syllabus, options.default_year);

	info!(
		model = %options.params.model,
		syllabus_len = syllabus.len(),
		default_year = options.default_year,
		"extracting deadlines"
	);

	let raw = generator.generate(&prompt, credential, &options.params).await?;
	debug!(completion_len = raw.len(), "received completion");

	let drafts = response::parse(&raw).inspect_err(|err| {
		if let Error::MalformedResponse { reason, raw } = err {
			warn!(%reason, raw = %raw, "unparseable completion");
		}
	})?;

	let normalized = normalize(&drafts, options.default_year);

	for dropped in &normalized.dropped {
		info!(index = dropped.index, reason = %dropped.reason, "dropped draft deadline");
	}

	info!(
		deadlines = normalized.deadlines.len(),
		dropped = normalized.dropped.len(),
		"extraction finished"
	);

	Ok(normalized)
}
