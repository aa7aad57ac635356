#![warn(clippy::pedantic)]

use chrono::NaiveTime;
use chrono_tz::Tz;
use deadline::Deadline;
use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike};

pub mod deadline;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod response;
pub mod store;
pub mod syllabus;

pub use error::{Error, Result};
pub use normalize::Normalized;
pub use pipeline::{extract, ExtractOptions};

pub const CALENDAR_NAME: &str = "Syllabus Deadlines";
const UID_DOMAIN: &str = "syl2ics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
	pub name: String,
	/// Time of day the deadlines fall due. `None` exports all-day events.
	pub due_time: Option<NaiveTime>,
	/// Zone `due_time` is read in.
	pub timezone: Tz,
}

impl Default for ExportOptions {
	fn default() -> Self {
		Self {
			name: CALENDAR_NAME.to_string(),
			due_time: None,
			timezone: chrono_tz::UTC,
		}
	}
}

/// One event per deadline, in order. Identifiers and stamps are derived from
/// the deadlines so the same list always renders to the same bytes.
#[must_use]
pub fn create_calendar(deadlines: &[Deadline], options: &ExportOptions) -> Calendar {
	let mut calendar = Calendar::new();

	calendar.name(&options.name);

	if options.due_time.is_some() {
		calendar.timezone(options.timezone.name());
	}

	for (index, deadline) in deadlines.iter().enumerate() {
		let mut event = Event::new();
		let day = deadline.date.format("%Y%m%d");

		event
			.uid(&format!("{index}-{day}@{UID_DOMAIN}"))
			.timestamp(deadline.date.and_time(NaiveTime::MIN).and_utc())
			.summary(&deadline.title)
			.add_property("CATEGORIES", deadline.kind.as_str());

		if let Some(description) = &deadline.description {
			event.description(description);
		}

		match options.due_time {
			Some(time) => event.starts(CalendarDateTime::WithTimezone {
				date_time: deadline.date.and_time(time),
				tzid: options.timezone.name().to_string(),
			}),
			None => event.starts(deadline.date),
		};

		calendar.push(event);
	}

	calendar
}
