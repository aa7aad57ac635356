use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum Kind {
	Assignment,
	Exam,
	Quiz,
	Project,
	Presentation,
	Deadline,
	#[default]
	Other,
}

impl Kind {
	pub const ALL: [Self; 7] = [
		Self::Assignment,
		Self::Exam,
		Self::Quiz,
		Self::Project,
		Self::Presentation,
		Self::Deadline,
		Self::Other,
	];

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Assignment => "assignment",
			Self::Exam => "exam",
			Self::Quiz => "quiz",
			Self::Project => "project",
			Self::Presentation => "presentation",
			Self::Deadline => "deadline",
			Self::Other => "other",
		}
	}
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Kind {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();

		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(s))
			.ok_or(())
	}
}

/// Unknown categories collapse into [`Kind::Other`].
impl From<String> for Kind {
	fn from(s: String) -> Self {
		s.parse().unwrap_or_default()
	}
}

/// A `null` category is [`Kind::Other`] too.
impl From<Option<String>> for Kind {
	fn from(s: Option<String>) -> Self {
		s.map(Self::from).unwrap_or_default()
	}
}

/// A normalized deadline. Serializes to the same `{title, date, type, description}`
/// shape the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
	pub title: String,
	pub date: NaiveDate,
	#[serde(rename = "type", default)]
	pub kind: Kind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

impl Deadline {
	#[must_use]
	pub fn days_until(&self, today: NaiveDate) -> i64 {
		(self.date - today).num_days()
	}

	#[must_use]
	pub fn urgency(&self, today: NaiveDate) -> Urgency {
		Urgency::from_days(self.days_until(today))
	}
}

/// How close a deadline is, relative to some day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
	Overdue,
	Today,
	/// Within the next week.
	Soon(u32),
	Later(u32),
}

impl Urgency {
	const SOON_DAYS: i64 = 7;

	#[must_use]
	pub fn from_days(days: i64) -> Self {
		match days {
			..=-1 => Self::Overdue,
			0 => Self::Today,
			1..=Self::SOON_DAYS => Self::Soon(u32::try_from(days).unwrap_or(u32::MAX)),
			_ => Self::Later(u32::try_from(days).unwrap_or(u32::MAX)),
		}
	}
}

impl fmt::Display for Urgency {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Overdue => f.write_str("Overdue"),
			Self::Today => f.write_str("Today!"),
			Self::Soon(days) | Self::Later(days) => write!(f, "{days} days"),
		}
	}
}
