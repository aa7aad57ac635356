#![warn(clippy::pedantic)]

use syl2ics_core::{
	create_calendar, deadline::Deadline, normalize::normalize, prompt, response, ExportOptions,
};
use wasm_bindgen::{prelude::wasm_bindgen, JsError};

/// Prompt for the page to send with its own `fetch`.
#[wasm_bindgen]
#[must_use]
pub fn build_prompt(text: &str, default_year: i32) -> String {
	prompt::build_prompt(text, default_year)
}

/// Completion text in, sorted deadline list (JSON) out.
///
/// # Errors
///
/// When the completion holds no JSON array.
#[wasm_bindgen]
pub fn parse_response(raw: &str, default_year: i32) -> Result<String, JsError> {
	let drafts = response::parse(raw).map_err(|err| JsError::new(&err.to_string()))?;
	let normalized = normalize(&drafts, default_year);

	serde_json::to_string(&normalized.deadlines).map_err(|err| JsError::new(&err.to_string()))
}

/// Stored deadline list (JSON) in, iCalendar text out.
///
/// # Errors
///
/// When `deadlines` is not a deadline list.
#[wasm_bindgen]
pub fn to_ics(deadlines: &str) -> Result<String, JsError> {
	let deadlines: Vec<Deadline> =
		serde_json::from_str(deadlines).map_err(|err| JsError::new(&err.to_string()))?;

	Ok(create_calendar(&deadlines, &ExportOptions::default()).to_string())
}
