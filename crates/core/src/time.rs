use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{schedule::ScheduleEntry, Error, Field, Result, TZ};

/// Length given to the last event of a schedule.
pub const DEFAULT_LENGTH: Duration = Duration::hours(1);

/// An event with absolute start and end instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEvent {
	pub title: String,
	pub details: String,
	pub start: DateTime<Utc>,
	pub end: DateTime<Utc>,
}

/// Calendar description for an event shown to the given courses.
#[must_use]
pub fn details_for(courses: Option<&str>) -> String {
	courses.map_or_else(String::new, |c| format!("Evento para as turmas de {c}"))
}

fn parse_pair(s: &str, sep: char) -> Option<(u32, u32)> {
	let (a, b) = s.split_once(sep)?;

	Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Turns `day/month` dates and `HH:MM` hours into instants.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
	year: i32,
	tz: Tz,
}

impl Resolver {
	#[must_use]
	pub fn new(year: i32) -> Self {
		Self { year, tz: TZ }
	}

	/// Resolver for the current year in the schedule time zone.
	#[must_use]
	pub fn current() -> Self {
		Self::new(Utc::now().with_timezone(&TZ).year())
	}

	#[must_use]
	pub fn year(&self) -> i32 {
		self.year
	}

	/// Start instant of the entry at `row`.
	///
	/// # Errors
	/// Fails when the entry has no date, or when the date or hour do not
	/// name a valid local time.
	pub fn start_of(&self, row: usize, entry: &ScheduleEntry) -> Result<DateTime<Utc>> {
		let date = entry.date.as_deref().ok_or(Error::MissingDate { row })?;
		let invalid = |field, value: &str| Error::Parse {
			row,
			field,
			value: value.to_string(),
		};

		let day = parse_pair(date, '/')
			.and_then(|(day, month)| NaiveDate::from_ymd_opt(self.year, month, day))
			.ok_or_else(|| invalid(Field::Date, date))?;
		let time = parse_pair(&entry.hour, ':')
			.and_then(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
			.ok_or_else(|| invalid(Field::Hour, &entry.hour))?;

		self.tz
			.from_local_datetime(&day.and_time(time))
			.earliest()
			.map(|start| start.with_timezone(&Utc))
			.ok_or_else(|| invalid(Field::Hour, &entry.hour))
	}

	/// Resolve every entry. Each event ends when the next one starts; the
	/// last one lasts [`DEFAULT_LENGTH`].
	///
	/// # Errors
	/// Fails on the first entry whose start cannot be resolved.
	pub fn resolve(&self, entries: &[ScheduleEntry]) -> Result<Vec<ResolvedEvent>> {
		let starts = entries
			.iter()
			.enumerate()
			.map(|(row, entry)| self.start_of(row, entry))
			.collect::<Result<Vec<_>>>()?;

		Ok(entries
			.iter()
			.zip(&starts)
			.enumerate()
			.map(|(i, (entry, &start))| ResolvedEvent {
				title: entry.title.clone(),
				details: details_for(entry.courses.as_deref()),
				start,
				end: starts.get(i + 1).copied().unwrap_or(start + DEFAULT_LENGTH),
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schedule::{extract, RawRow};

	fn utc(s: &str) -> DateTime<Utc> {
		s.parse().unwrap()
	}

	#[test]
	fn last_event_lasts_one_hour() {
		let rows = [
			RawRow::new(true, ["10/05", "08:00", "A"]),
			RawRow::new(false, ["09:00", "B"]),
		];
		let events = Resolver::new(2024).resolve(&extract(&rows).unwrap()).unwrap();

		// Campo Grande is UTC-4 all year since 2019.
		assert_eq!(events[0].start, utc("2024-05-10T12:00:00Z"));
		assert_eq!(events[0].end, utc("2024-05-10T13:00:00Z"));
		assert_eq!(events[1].start, events[0].end);
		assert_eq!(events[1].end, utc("2024-05-10T14:00:00Z"));
	}

	#[test]
	fn ends_chain_across_dates() {
		let rows = [
			RawRow::new(true, ["10/05", "17:00", "A", "1A"]),
			RawRow::new(true, ["11/05", "08:00", "B"]),
			RawRow::new(false, ["08:30", "C", "2B"]),
		];
		let events = Resolver::new(2024).resolve(&extract(&rows).unwrap()).unwrap();

		for pair in events.windows(2) {
			assert_eq!(pair[0].end, pair[1].start);
		}
		assert_eq!(events[2].end - events[2].start, DEFAULT_LENGTH);
		assert_eq!(events[0].details, "Evento para as turmas de 1A");
		assert_eq!(events[1].details, "Evento para as turmas de 1A");
		assert_eq!(events[2].details, "Evento para as turmas de 2B");
	}

	#[test]
	fn details_are_empty_without_courses() {
		let rows = [RawRow::new(true, ["10/05", "08:00", "A"])];
		let events = Resolver::new(2024).resolve(&extract(&rows).unwrap()).unwrap();

		assert_eq!(events[0].details, "");
	}

	#[test]
	fn names_the_unparseable_field() {
		let resolver = Resolver::new(2024);
		let rows = [
			RawRow::new(true, ["10/05", "08:00", "A"]),
			RawRow::new(false, ["8h", "B"]),
		];

		assert!(matches!(
			resolver.resolve(&extract(&rows).unwrap()),
			Err(Error::Parse { row: 1, field: Field::Hour, ref value }) if value == "8h"
		));

		let rows = [RawRow::new(true, ["31/02", "08:00", "A"])];

		assert!(matches!(
			resolver.resolve(&extract(&rows).unwrap()),
			Err(Error::Parse { row: 0, field: Field::Date, .. })
		));
	}

	#[test]
	fn current_resolver_uses_this_year() {
		assert_eq!(Resolver::new(2024).year(), 2024);
		assert_eq!(Resolver::current().year(), Utc::now().with_timezone(&TZ).year());
	}

	#[test]
	fn first_row_needs_a_date() {
		let rows = [RawRow::new(false, ["08:00", "A"])];

		assert!(matches!(
			Resolver::new(2024).resolve(&extract(&rows).unwrap()),
			Err(Error::MissingDate { row: 0 })
		));
	}
}
