#![warn(clippy::pedantic)]

//! Browser bindings. The page loads the module, exposes `toggleReminder`
//! on `window` for the anchors' `onclick`, and calls `attach` once.

use std::time::Duration;

use reminders_core::{
	reminder::{self, Control, Reminder, ReminderId, ReminderState, Store},
	schedule::{RawRow, DATE_CLASS, EVENT_CLASS},
	time::Resolver,
};
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, Element, HtmlCollection, Storage, Window};

/// `window.localStorage` as a reminder store.
struct LocalStorage(Storage);

#[allow(clippy::needless_pass_by_value)]
fn persistence(err: JsValue) -> reminders_core::Error {
	reminders_core::Error::Persistence(format!("{err:?}"))
}

impl Store for LocalStorage {
	fn get(&self, key: &str) -> reminders_core::Result<Option<String>> {
		self.0.get_item(key).map_err(persistence)
	}

	fn set(&mut self, key: &str, value: &str) -> reminders_core::Result<()> {
		self.0.set_item(key, value).map_err(persistence)
	}

	fn remove(&mut self, key: &str) -> reminders_core::Result<()> {
		self.0.remove_item(key).map_err(persistence)
	}
}

#[allow(clippy::needless_pass_by_value)]
fn to_js(err: reminders_core::Error) -> JsValue {
	JsValue::from_str(&err.to_string())
}

/// Report on the page console, where the user can see it, and to
/// `tracing` for hosts that install a subscriber.
fn warn(message: &str) {
	console::warn_1(&JsValue::from_str(message));
	tracing::warn!("{message}");
}

fn window() -> Result<Window, JsValue> {
	web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

fn local_storage(window: &Window) -> Result<LocalStorage, JsValue> {
	window
		.local_storage()?
		.map(LocalStorage)
		.ok_or_else(|| JsValue::from_str("localStorage is unavailable"))
}

fn elements(collection: &HtmlCollection) -> Vec<Element> {
	(0..collection.length())
		.filter_map(|i| collection.item(i))
		.collect()
}

fn raw_row(row: &Element) -> RawRow {
	let cells = elements(&row.children());
	let dated = cells
		.first()
		.is_some_and(|c| c.class_list().contains(DATE_CLASS));

	RawRow::new(dated, cells.iter().map(|c| c.text_content().unwrap_or_default()))
}

async fn sleep(window: &Window, duration: Duration) -> Result<(), JsValue> {
	let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
	let mut scheduled = Ok(0);
	let promise = js_sys::Promise::new(&mut |resolve, _reject| {
		scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
	});

	scheduled?;
	JsFuture::from(promise).await.map(drop)
}

/// Append a reminder cell to every event row of the current document.
///
/// # Errors
/// Fails when a row cannot be parsed or storage cannot be read.
#[wasm_bindgen]
pub fn attach() -> Result<(), JsValue> {
	let window = window()?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let store = local_storage(&window)?;

	// the collection is live, so snapshot it before painting
	let rows = elements(&document.get_elements_by_class_name(EVENT_CLASS));
	let raw = rows.iter().map(raw_row).collect::<Vec<_>>();
	let events = reminders_core::resolve_rows(&raw, &Resolver::current()).map_err(to_js)?;

	for (row, event) in rows.iter().zip(&events) {
		let control = Reminder::from_event(event).control(&store).map_err(to_js)?;

		row.insert_adjacent_html("beforeend", &control.cell())?;
	}

	Ok(())
}

/// Flip the reminder behind a painted anchor and repaint it in place.
/// When the store fails nothing is repainted.
///
/// # Errors
/// Fails when the anchor's id is not a reminder identity or the store
/// cannot be updated.
pub fn toggle_anchor<S: Store + ?Sized>(
	anchor: &Element,
	store: &mut S,
) -> reminders_core::Result<ReminderState> {
	let id = anchor.id().parse::<ReminderId>()?;
	let control = Control::from_attributes(
		id.clone(),
		&anchor.get_attribute("href").unwrap_or_default(),
		&anchor.get_attribute("data-href").unwrap_or_default(),
	);
	let state = reminder::toggle(store, &id)?;

	anchor.set_outer_html(&control.with_state(state).to_string());

	Ok(state)
}

/// Flip a reminder and repaint its anchor once the click's own navigation
/// has started. A storage failure is reported on the console and leaves
/// the anchor as it was.
///
/// # Errors
/// Fails when the page environment is missing.
#[wasm_bindgen(js_name = toggleReminder)]
pub async fn toggle_reminder(id: String) -> Result<(), JsValue> {
	let window = window()?;

	sleep(&window, reminder::NAVIGATION_DELAY).await?;

	let Some(anchor) = window
		.document()
		.and_then(|document| document.get_element_by_id(&id))
	else {
		warn(&format!("no reminder anchor {id} to toggle"));
		return Ok(());
	};
	let mut store = local_storage(&window)?;

	if let Err(err) = toggle_anchor(&anchor, &mut store) {
		warn(&format!("could not toggle reminder {id}: {err}"));
	}

	Ok(())
}
