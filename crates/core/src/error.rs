use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The cell of an event row that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	Date,
	Hour,
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", match self {
			Self::Date => "date",
			Self::Hour => "hour",
		})
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Row indices are zero-based; messages show them one-based.
	#[error("event row {}: {cells} cells do not match [date, hour, title, courses?] or [hour, title, courses?]", .row + 1)]
	StructuralMismatch { row: usize, cells: usize },

	#[error("event row {}: no date on this row and no earlier row to inherit one from", .row + 1)]
	MissingDate { row: usize },

	#[error("event row {}: invalid {field} {value:?}", .row + 1)]
	Parse {
		row: usize,
		field: Field,
		value: String,
	},

	#[error("invalid reminder identity {0:?}")]
	InvalidIdentity(String),

	#[error("reminder store: {0}")]
	Persistence(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}
