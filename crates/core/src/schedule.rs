//! Extraction of event records from schedule table rows.
//!
//! Source tables are compact: the date cell and the courses cell only
//! appear on some rows, and later rows inherit them.

use std::{fs::File, io::Read, path::Path};

use select::{
	document::Document,
	node::Node,
	predicate::{self, Predicate},
};

use crate::{Error, Result};

/// Class marking an event row.
pub const EVENT_CLASS: &str = "event";
/// Class marking the date cell at the start of a row.
pub const DATE_CLASS: &str = "date";

/// Host-independent snapshot of one event row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
	/// Whether the first cell carries the date marker.
	pub dated: bool,
	/// Trimmed text of each child cell, in order.
	pub cells: Vec<String>,
}

impl RawRow {
	pub fn new<I, S>(dated: bool, cells: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			dated,
			cells: cells.into_iter().map(|c| c.into().trim().to_string()).collect(),
		}
	}

	fn from_node(node: Node) -> Self {
		let cells = node.children().filter(|c| c.name().is_some()).collect::<Vec<_>>();
		let dated = cells
			.first()
			.is_some_and(|c| predicate::Class(DATE_CLASS).matches(c));

		Self::new(dated, cells.iter().map(Node::text))
	}

	fn has_courses(&self) -> bool {
		if self.dated {
			self.cells.len() == 4
		} else {
			self.cells.len() == 3
		}
	}
}

/// The values a single row supplies by itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
	pub date: Option<String>,
	pub hour: String,
	pub title: String,
	pub courses: Option<String>,
}

fn present(value: &str) -> Option<String> {
	(!value.is_empty()).then(|| value.to_string())
}

impl EventRecord {
	/// Classify a row by shape and read its fields.
	///
	/// # Errors
	/// Returns [`Error::StructuralMismatch`] when the cell count does not fit
	/// either the dated or the undated layout.
	pub fn from_row(index: usize, row: &RawRow) -> Result<Self> {
		let cells = &row.cells;
		let fits = if row.dated {
			matches!(cells.len(), 3 | 4)
		} else {
			matches!(cells.len(), 2 | 3)
		};

		if !fits {
			return Err(Error::StructuralMismatch {
				row: index,
				cells: cells.len(),
			});
		}

		let courses = if row.has_courses() {
			cells.last().and_then(|c| present(c))
		} else {
			None
		};

		let (date, rest) = if row.dated {
			(present(&cells[0]), &cells[1..])
		} else {
			(None, &cells[..])
		};

		Ok(Self {
			date,
			hour: rest[0].clone(),
			title: rest[1].clone(),
			courses,
		})
	}
}

/// An event record with inherited fields filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
	/// `None` only when no row so far has supplied a date.
	pub date: Option<String>,
	pub hour: String,
	pub title: String,
	pub courses: Option<String>,
}

/// Forward accumulator for the fields rows may omit.
#[derive(Debug, Default, Clone)]
pub struct Carry {
	date: Option<String>,
	courses: Option<String>,
}

impl Carry {
	/// Fold one record in. A value the record supplies replaces the carried
	/// one; an omitted value keeps it.
	pub fn advance(&mut self, record: EventRecord) -> ScheduleEntry {
		if record.date.is_some() {
			self.date = record.date;
		}

		if record.courses.is_some() {
			self.courses = record.courses;
		}

		ScheduleEntry {
			date: self.date.clone(),
			hour: record.hour,
			title: record.title,
			courses: self.courses.clone(),
		}
	}
}

/// Read every row, in order, carrying dates and courses forward.
///
/// # Errors
/// Fails on the first row with an unexpected shape.
pub fn extract(rows: &[RawRow]) -> Result<Vec<ScheduleEntry>> {
	let mut carry = Carry::default();

	rows.iter()
		.enumerate()
		.map(|(index, row)| {
			let record = EventRecord::from_row(index, row)?;
			tracing::debug!(row = index, ?record, "extracted event row");

			Ok(carry.advance(record))
		})
		.collect()
}

/// Collect the event rows of a parsed document.
#[must_use]
pub fn rows_from_document(document: &Document) -> Vec<RawRow> {
	document
		.find(predicate::Class(EVENT_CLASS))
		.map(RawRow::from_node)
		.collect()
}

/// Parse event rows from an HTML buffer.
///
/// # Errors
/// Fails when the buffer cannot be read.
pub fn parse_from_buf<R: Read>(buf: R) -> Result<Vec<RawRow>> {
	let document = Document::from_read(buf)?;

	Ok(rows_from_document(&document))
}

/// Parse event rows from a file, or from stdin when no path is given.
///
/// # Errors
/// Fails when the file cannot be opened or read.
pub fn parse_from_file<P: AsRef<Path>>(path: Option<P>) -> Result<Vec<RawRow>> {
	if let Some(path) = path {
		parse_from_buf(File::open(path)?)
	} else {
		parse_from_buf(std::io::stdin())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TABLE: &str = r#"
		<table>
			<tr class="event"><td class="date">10/05</td><td>08:00</td><td>Abertura</td><td>1A, 1B</td></tr>
			<tr class="event"><td>09:00</td><td>Palestra</td></tr>
			<tr class="event"><td>10:30</td><td>Oficina</td><td>2A</td></tr>
			<tr class="event"><td class="date">11/05</td><td>08:00</td><td>Encerramento</td></tr>
		</table>
	"#;

	#[test]
	fn reads_rows_in_document_order() {
		let rows = rows_from_document(&Document::from(TABLE));

		assert_eq!(rows.len(), 4);
		assert!(rows[0].dated);
		assert_eq!(rows[0].cells, ["10/05", "08:00", "Abertura", "1A, 1B"]);
		assert!(!rows[1].dated);
		assert_eq!(rows[1].cells, ["09:00", "Palestra"]);
	}

	#[test]
	fn carries_date_and_courses_forward() {
		let rows = rows_from_document(&Document::from(TABLE));
		let entries = extract(&rows).unwrap();

		let dates = entries.iter().map(|e| e.date.as_deref()).collect::<Vec<_>>();
		let courses = entries.iter().map(|e| e.courses.as_deref()).collect::<Vec<_>>();

		assert_eq!(dates, [Some("10/05"), Some("10/05"), Some("10/05"), Some("11/05")]);
		assert_eq!(courses, [Some("1A, 1B"), Some("1A, 1B"), Some("2A"), Some("2A")]);
		assert_eq!(entries[1].title, "Palestra");
		assert_eq!(entries[3].hour, "08:00");
	}

	#[test]
	fn empty_cells_do_not_replace_carried_values() {
		let rows = [
			RawRow::new(true, ["10/05", "08:00", "A", "1A"]),
			RawRow::new(true, ["  ", "09:00", "B", ""]),
		];
		let entries = extract(&rows).unwrap();

		assert_eq!(entries[1].date.as_deref(), Some("10/05"));
		assert_eq!(entries[1].courses.as_deref(), Some("1A"));
	}

	#[test]
	fn dated_row_without_courses() {
		let record = EventRecord::from_row(0, &RawRow::new(true, ["10/05", "08:00", "A"])).unwrap();

		assert_eq!(record.date.as_deref(), Some("10/05"));
		assert_eq!(record.hour, "08:00");
		assert_eq!(record.title, "A");
		assert_eq!(record.courses, None);
	}

	#[test]
	fn rejects_unexpected_shapes() {
		let rows = [
			RawRow::new(false, ["08:00", "A"]),
			RawRow::new(true, ["10/05", "09:00"]),
		];

		assert!(matches!(
			extract(&rows),
			Err(Error::StructuralMismatch { row: 1, cells: 2 })
		));
		assert!(matches!(
			EventRecord::from_row(4, &RawRow::new(false, ["a", "b", "c", "d"])),
			Err(Error::StructuralMismatch { row: 4, cells: 4 })
		));
		assert!(matches!(
			EventRecord::from_row(0, &RawRow::new(false, ["08:00"])),
			Err(Error::StructuralMismatch { .. })
		));
	}
}
