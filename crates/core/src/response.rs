//! Turning model completion text into draft records.
//!
//! Models are unreliable producers of JSON: they wrap it in code fences or
//! surround it with prose even when asked not to. [`repair`] strips the fences
//! and whitespace, and [`parse`] falls back to the first balanced `[...]`
//! region holding an array of objects when the repaired text is still not
//! JSON.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// An unvalidated element of the model's JSON array.
pub type Draft = Value;

const FENCE: &str = "```";

/// Remove every code-fence marker and trim surrounding whitespace. A language
/// tag is dropped only where it ends its line, as on an opening fence.
#[must_use]
pub fn repair(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());
	let mut rest = raw;

	while let Some(pos) = rest.find(FENCE) {
		out.push_str(&rest[..pos]);
		rest = &rest[pos + FENCE.len()..];

		let after_tag = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'));
		if after_tag.is_empty() || after_tag.starts_with(['\n', '\r']) {
			rest = after_tag;
		}
	}

	out.push_str(rest);
	out.trim().to_string()
}

/// Repair `raw` and parse it as a JSON array of drafts.
///
/// # Errors
///
/// [`Error::MalformedResponse`] when no JSON array can be recovered, or the
/// top-level value is something other than an array.
pub fn parse(raw: &str) -> Result<Vec<Draft>> {
	let repaired = repair(raw);

	let value = match serde_json::from_str::<Value>(&repaired) {
		Ok(value) => value,
		Err(err) => {
			debug!("completion is not plain JSON ({err}), searching for an array");

			return array_regions(&repaired)
				.filter_map(|region| match serde_json::from_str(region) {
					Ok(Value::Array(drafts)) if drafts.iter().all(Value::is_object) => Some(drafts),
					_ => None,
				})
				.next()
				.ok_or_else(|| Error::malformed(raw, "no JSON array of objects found"));
		}
	};

	match value {
		Value::Array(drafts) => Ok(drafts),
		other => Err(Error::malformed(
			raw,
			format!("expected a JSON array, found {}", kind_of(&other)),
		)),
	}
}

/// Every `[` paired with its matching `]`, in order of the opening bracket.
/// Brackets inside strings are ignored.
fn array_regions(content: &str) -> impl Iterator<Item = &str> {
	content
		.match_indices('[')
		.filter_map(|(start, _)| balanced_from(content, start))
}

fn balanced_from(content: &str, start: usize) -> Option<&str> {
	let mut depth = 0usize;
	let mut in_string = false;
	let mut escape_next = false;

	for (i, ch) in content[start..].char_indices() {
		if escape_next {
			escape_next = false;
			continue;
		}

		match ch {
			'\\' if in_string => escape_next = true,
			'"' => in_string = !in_string,
			'[' if !in_string => depth += 1,
			']' if !in_string => {
				depth -= 1;
				if depth == 0 {
					return Some(&content[start..start + i + ch.len_utf8()]);
				}
			}
			_ => {}
		}
	}

	None
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
