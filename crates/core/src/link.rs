//! Google Calendar event-creation links.

use chrono::{DateTime, NaiveDateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{time::ResolvedEvent, TZ};

pub const CALENDAR_BASE: &str = "https://calendar.google.com/calendar/u/0/r/eventedit";

/// Compact UTC form used by the calendar service, e.g. `20240510T080000Z`.
const FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Length of an encoded instant.
pub const ENCODED_LEN: usize = 16;

#[must_use]
pub fn encode(instant: DateTime<Utc>) -> String {
	instant.format(FORMAT).to_string()
}

/// Inverse of [`encode`].
///
/// # Errors
/// Fails when `s` is not in the compact form.
pub fn decode(s: &str) -> chrono::ParseResult<DateTime<Utc>> {
	NaiveDateTime::parse_from_str(s, FORMAT).map(|naive| naive.and_utc())
}

/// Everything but RFC 3986 unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'.')
	.remove(b'_')
	.remove(b'~');

fn escape(s: &str) -> String {
	utf8_percent_encode(s, QUERY_VALUE).to_string()
}

/// Link that opens the calendar's "new event" page prefilled with `event`.
#[must_use]
pub fn calendar_url(event: &ResolvedEvent) -> String {
	format!(
		"{CALENDAR_BASE}?text={}&details={}&dates={}/{}&ctz={}",
		escape(&event.title),
		escape(&event.details),
		encode(event.start),
		encode(event.end),
		TZ.name(),
	)
}
