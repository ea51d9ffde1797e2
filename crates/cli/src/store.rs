use std::{
	collections::BTreeMap,
	fs,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use reminders_core::{reminder::Store, Error, Result};
use tempfile::NamedTempFile;

/// Reminder store persisted as a flat JSON object on disk.
///
/// Every write replaces the whole file through a temporary sibling, so a
/// failed write leaves the previous file intact.
#[derive(Debug)]
pub struct JsonFileStore {
	path: PathBuf,
	entries: BTreeMap<String, String>,
}

fn persistence(path: &Path, err: impl std::fmt::Display) -> Error {
	Error::Persistence(format!("{}: {err}", path.display()))
}

impl JsonFileStore {
	/// Open the store at `path`; a missing file is an empty store.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();
		let entries = match fs::read_to_string(&path) {
			Ok(text) => serde_json::from_str(&text).map_err(|e| persistence(&path, e))?,
			Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
			Err(e) => return Err(persistence(&path, e)),
		};

		Ok(Self { path, entries })
	}

	fn save(&self) -> Result<()> {
		let parent_dir = self
			.path
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or_else(|| Path::new("."));
		let tmp = NamedTempFile::new_in(parent_dir).map_err(|e| persistence(&self.path, e))?;

		serde_json::to_writer_pretty(&tmp, &self.entries).map_err(|e| persistence(&self.path, e))?;
		tmp.persist(&self.path).map_err(|e| persistence(&self.path, e))?;

		Ok(())
	}
}

impl Store for JsonFileStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.get(key).cloned())
	}

	fn set(&mut self, key: &str, value: &str) -> Result<()> {
		let previous = self.entries.insert(key.to_string(), value.to_string());

		self.save().inspect_err(|_| match previous {
			Some(previous) => {
				self.entries.insert(key.to_string(), previous);
			}
			None => {
				self.entries.remove(key);
			}
		})
	}

	fn remove(&mut self, key: &str) -> Result<()> {
		let Some(previous) = self.entries.remove(key) else {
			return Ok(());
		};

		self.save().inspect_err(|_| {
			self.entries.insert(key.to_string(), previous);
		})
	}
}
