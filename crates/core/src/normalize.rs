use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::{
	deadline::{Deadline, Kind},
	response::Draft,
};

/// Formats that carry their own year.
const DATED_FORMATS: [&str; 8] = [
	"%Y-%m-%d",
	"%Y/%m/%d",
	"%m/%d/%Y",
	"%m/%d/%y",
	"%B %d, %Y",
	"%B %d %Y",
	"%d %B %Y",
	"%d %B, %Y",
];

/// Formats without a year; the default year is appended before parsing.
const YEARLESS_FORMATS: [&str; 5] = ["%m-%d", "--%m-%d", "%m/%d", "%B %d", "%d %B"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
	NotAnObject,
	MissingTitle,
	MissingDate,
	InvalidDate(String),
}

impl fmt::Display for DropReason {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::NotAnObject => f.write_str("not a JSON object"),
			Self::MissingTitle => f.write_str("missing title"),
			Self::MissingDate => f.write_str("missing date"),
			Self::InvalidDate(date) => write!(f, "unrecognized date {date:?}"),
		}
	}
}

/// A draft that did not survive validation. `index` is its position in the
/// model's array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropped {
	pub index: usize,
	pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
	/// Sorted by date; equal dates keep the model's order.
	pub deadlines: Vec<Deadline>,
	pub dropped: Vec<Dropped>,
}

/// Validate drafts into deadlines, sorted ascending by date.
#[must_use]
pub fn normalize(drafts: &[Draft], default_year: i32) -> Normalized {
	let mut normalized = Normalized::default();

	for (index, draft) in drafts.iter().enumerate() {
		match to_deadline(draft, default_year) {
			Ok(deadline) => normalized.deadlines.push(deadline),
			Err(reason) => normalized.dropped.push(Dropped { index, reason }),
		}
	}

	// stable
	normalized.deadlines.sort_by_key(|deadline| deadline.date);
	normalized
}

fn to_deadline(draft: &Draft, default_year: i32) -> Result<Deadline, DropReason> {
	let Value::Object(fields) = draft else {
		return Err(DropReason::NotAnObject);
	};

	let text = |key: &str| {
		fields
			.get(key)
			.and_then(Value::as_str)
			.map(str::trim)
			.filter(|s| !s.is_empty())
	};

	let title = text("title").ok_or(DropReason::MissingTitle)?;
	let raw_date = text("date").ok_or(DropReason::MissingDate)?;
	let date = parse_date(raw_date, default_year)
		.ok_or_else(|| DropReason::InvalidDate(raw_date.to_string()))?;
	let kind = text("type").and_then(|s| s.parse().ok()).unwrap_or_default();
	let description = fields
		.get("description")
		.and_then(Value::as_str)
		.map(String::from);

	Ok(Deadline {
		title: title.to_string(),
		date,
		kind,
		description,
	})
}

/// Parse a date the way models tend to write them. A missing year becomes
/// `default_year`.
#[must_use]
pub fn parse_date(s: &str, default_year: i32) -> Option<NaiveDate> {
	let s = s.trim();

	// "2026-01-25T23:59:00Z" or "2026-01-25 23:59"
	let date_part = s
		.split_once(['T', ' '])
		.map(|(date, _)| date)
		.filter(|date| date.len() == 10 && date.as_bytes()[4] == b'-');

	if let Some(date) = date_part.and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()) {
		return Some(date);
	}

	let s = strip_ordinal(s);

	DATED_FORMATS
		.iter()
		.find_map(|format| parse_plausible(&s, format))
		.or_else(|| {
			let with_year = format!("{s} {default_year}");

			YEARLESS_FORMATS
				.iter()
				.find_map(|format| parse_plausible(&with_year, &format!("{format} %Y")))
		})
}

/// Rejects four-digit-year formats matching two-digit years ("1/25/26" as 0026).
fn parse_plausible(s: &str, format: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(s, format)
		.ok()
		.filter(|date| date.year() >= 1000)
}

/// "Jan 22nd" -> "Jan 22"
fn strip_ordinal(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let mut chars = s.char_indices();

	while let Some((i, c)) = chars.next() {
		out.push(c);

		if c.is_ascii_digit() {
			let suffix = s[i + 1..].get(..2).map(str::to_ascii_lowercase);
			let ends_word = s[i + 1..]
				.chars()
				.nth(2)
				.map_or(true, |next| !next.is_alphanumeric());

			if matches!(suffix.as_deref(), Some("st" | "nd" | "rd" | "th")) && ends_word {
				chars.next();
				chars.next();
			}
		}
	}

	out
}
