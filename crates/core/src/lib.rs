#![warn(clippy::pedantic)]

use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike};
use reminder::Reminder;
use schedule::RawRow;
use time::{ResolvedEvent, Resolver};

mod error;
pub mod link;
pub mod reminder;
pub mod schedule;
pub mod time;

pub use error::{Error, Field, Result};

/// Time zone the schedule is written in.
pub const TZ: chrono_tz::Tz = chrono_tz::America::Campo_Grande;

/// Extract and resolve every event row, in order.
///
/// # Errors
/// Fails on the first row with an unexpected shape or an unreadable date
/// or hour.
pub fn resolve_rows(rows: &[RawRow], resolver: &Resolver) -> Result<Vec<ResolvedEvent>> {
	resolver.resolve(&schedule::extract(rows)?)
}

fn local(instant: chrono::DateTime<chrono::Utc>) -> CalendarDateTime {
	CalendarDateTime::WithTimezone {
		date_time: instant.with_timezone(&TZ).naive_local(),
		tzid: TZ.name().to_string(),
	}
}

#[must_use]
pub fn create_calendar(events: &[ResolvedEvent]) -> Calendar {
	let mut calendar = Calendar::new();

	calendar.name("Agenda");
	calendar.timezone(TZ.name());

	for event in events {
		let reminder = Reminder::from_event(event);
		let mut entry = Event::new();

		entry
			.uid(reminder.id.as_str())
			.summary(&event.title)
			.starts(local(event.start))
			.ends(local(event.end))
			.add_property("URL", &reminder.url)
			// add a reminder 30 minutes before
			.add_property(
				"VALARM",
				"TRIGGER:-PT30M;ACTION=DISPLAY;DESCRIPTION=Reminder",
			);

		if !event.details.is_empty() {
			entry.description(&event.details);
		}

		calendar.push(entry);
	}

	calendar
}
