//! Persisted reminder toggles and the controls that display them.

use std::{collections::HashMap, fmt, str::FromStr, time::Duration};

use crate::{
	link::{self, ENCODED_LEN},
	time::ResolvedEvent,
	Error, Result,
};

/// Wait between a control's activation and its repaint, so the browser
/// starts following the link before the anchor is replaced.
pub const NAVIGATION_DELAY: Duration = Duration::from_millis(100);

/// Stored value for a reminder that is on.
pub const ON_VALUE: &str = "true";

// https://heroicons.com/
const BELL_ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24" stroke="#a0a0a0" width="20px"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M15 17h5l-1.405-1.405A2.032 2.032 0 0118 14.158V11a6.002 6.002 0 00-4-5.659V5a2 2 0 10-4 0v.341C7.67 6.165 6 8.388 6 11v3.159c0 .538-.214 1.055-.595 1.436L4 17h5m6 0v1a3 3 0 11-6 0v-1m6 0H9"/></svg>"##;
const SOLID_BELL_ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 20 20" fill="#a0a0a0" width="20px"><path d="M10 2a6 6 0 00-6 6v3.586l-.707.707A1 1 0 004 14h12a1 1 0 00.707-1.707L16 11.586V8a6 6 0 00-6-6zM10 18a3 3 0 01-3-3h6a3 3 0 01-3 3z" /></svg>"##;

/// Key of a reminder: the encoded start followed by the encoded end.
///
/// Two events sharing both instants share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderId(String);

impl ReminderId {
	#[must_use]
	pub fn new(event: &ResolvedEvent) -> Self {
		Self(link::encode(event.start) + &link::encode(event.end))
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ReminderId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for ReminderId {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let valid = s.len() == 2 * ENCODED_LEN
			&& s.is_char_boundary(ENCODED_LEN)
			&& link::decode(&s[..ENCODED_LEN]).is_ok()
			&& link::decode(&s[ENCODED_LEN..]).is_ok();

		if valid {
			Ok(Self(s.to_string()))
		} else {
			Err(Error::InvalidIdentity(s.to_string()))
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderState {
	#[default]
	Off,
	On,
}

impl ReminderState {
	fn from_stored(value: Option<&str>) -> Self {
		if value == Some(ON_VALUE) {
			Self::On
		} else {
			Self::Off
		}
	}

	#[must_use]
	pub fn toggled(self) -> Self {
		match self {
			Self::Off => Self::On,
			Self::On => Self::Off,
		}
	}
}

impl fmt::Display for ReminderState {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::Off => "off",
			Self::On => "on",
		})
	}
}

/// String key-value storage holding reminder states.
pub trait Store {
	/// # Errors
	/// Fails when the backing storage cannot be read.
	fn get(&self, key: &str) -> Result<Option<String>>;
	/// # Errors
	/// Fails when the backing storage cannot be written.
	fn set(&mut self, key: &str, value: &str) -> Result<()>;
	/// # Errors
	/// Fails when the backing storage cannot be written.
	fn remove(&mut self, key: &str) -> Result<()>;
}

/// Store kept in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore(HashMap<String, String>);

impl Store for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.0.get(key).cloned())
	}

	fn set(&mut self, key: &str, value: &str) -> Result<()> {
		self.0.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&mut self, key: &str) -> Result<()> {
		self.0.remove(key);
		Ok(())
	}
}

/// Current state of a reminder; a missing entry means [`ReminderState::Off`].
///
/// # Errors
/// Propagates store read failures.
pub fn state<S: Store + ?Sized>(store: &S, id: &ReminderId) -> Result<ReminderState> {
	Ok(ReminderState::from_stored(store.get(id.as_str())?.as_deref()))
}

/// Flip a reminder and return its new state.
///
/// # Errors
/// Returns the store error untouched; on failure the stored state is
/// whatever the store kept, and callers should not repaint.
pub fn toggle<S: Store + ?Sized>(store: &mut S, id: &ReminderId) -> Result<ReminderState> {
	let next = state(&*store, id)?.toggled();

	match next {
		ReminderState::On => store.set(id.as_str(), ON_VALUE)?,
		ReminderState::Off => store.remove(id.as_str())?,
	}

	tracing::debug!(%id, state = %next, "toggled reminder");

	Ok(next)
}

/// A reminder anchor as it should be painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
	pub id: ReminderId,
	pub state: ReminderState,
	/// Calendar link, wherever it currently sits.
	pub url: String,
}

fn escape_attr(s: &str) -> String {
	s.replace('&', "&amp;").replace('"', "&quot;")
}

impl Control {
	#[must_use]
	pub fn render(id: ReminderId, state: ReminderState, url: impl Into<String>) -> Self {
		Self {
			id,
			state,
			url: url.into(),
		}
	}

	/// Rebuild a control from a painted anchor's `href` and `data-href`.
	#[must_use]
	pub fn from_attributes(id: ReminderId, href: &str, data_href: &str) -> Self {
		if href == "#" {
			Self::render(id, ReminderState::On, data_href)
		} else {
			Self::render(id, ReminderState::Off, href)
		}
	}

	#[must_use]
	pub fn with_state(self, state: ReminderState) -> Self {
		Self { state, ..self }
	}

	#[must_use]
	pub fn href(&self) -> &str {
		match self.state {
			ReminderState::On => "#",
			ReminderState::Off => &self.url,
		}
	}

	/// The link the anchor switches to once toggled.
	#[must_use]
	pub fn data_href(&self) -> &str {
		match self.state {
			ReminderState::On => &self.url,
			ReminderState::Off => "#",
		}
	}

	#[must_use]
	pub fn target(&self) -> &'static str {
		match self.state {
			ReminderState::On => "",
			ReminderState::Off => "_blank",
		}
	}

	#[must_use]
	pub fn icon(&self) -> &'static str {
		match self.state {
			ReminderState::On => SOLID_BELL_ICON,
			ReminderState::Off => BELL_ICON,
		}
	}

	/// The anchor wrapped in a table cell.
	#[must_use]
	pub fn cell(&self) -> String {
		format!("<td>{self}</td>")
	}
}

impl fmt::Display for Control {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			r#"<a id="{id}" onclick="toggleReminder('{id}')" data-href="{}" href="{}" target="{}">{}</a>"#,
			escape_attr(self.data_href()),
			escape_attr(self.href()),
			self.target(),
			self.icon(),
			id = self.id,
		)
	}
}

/// Identity and calendar link of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
	pub id: ReminderId,
	pub url: String,
}

impl Reminder {
	#[must_use]
	pub fn from_event(event: &ResolvedEvent) -> Self {
		Self {
			id: ReminderId::new(event),
			url: link::calendar_url(event),
		}
	}

	/// # Errors
	/// Propagates store read failures.
	pub fn state<S: Store + ?Sized>(&self, store: &S) -> Result<ReminderState> {
		state(store, &self.id)
	}

	/// The control for this reminder in its stored state.
	///
	/// # Errors
	/// Propagates store read failures.
	pub fn control<S: Store + ?Sized>(&self, store: &S) -> Result<Control> {
		Ok(Control::render(self.id.clone(), self.state(store)?, self.url.clone()))
	}
}
