//! Key/value persistence for the deadline list and API credentials.
//!
//! The pipeline never touches a store; presentation layers load state at
//! startup and save it on change.

use std::{
	cell::RefCell,
	collections::HashMap,
	fs, io,
	path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::warn;

use crate::deadline::Deadline;

/// Key holding the serialized deadline list.
pub const DEADLINES_KEY: &str = "deadlines";

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("storage I/O failed: {0}")]
	Io(#[from] io::Error),

	#[error("could not serialize deadlines: {0}")]
	Json(#[from] serde_json::Error),

	#[error("no deadline #{0}")]
	NoSuchEntry(usize),
}

pub trait Store {
	/// # Errors
	///
	/// Backend failures. A missing key is `Ok(None)`.
	fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// # Errors
	///
	/// Backend failures.
	fn save(&self, key: &str, text: &str) -> Result<(), StoreError>;

	/// Deleting a missing key succeeds.
	///
	/// # Errors
	///
	/// Backend failures.
	fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// One file per key inside a directory, created on first save.
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	#[must_use]
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	#[must_use]
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path(&self, key: &str) -> PathBuf {
		let name = key
			.chars()
			.map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') { c } else { '_' })
			.collect::<String>();

		self.dir.join(name)
	}
}

impl Store for FileStore {
	fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
		match fs::read_to_string(self.path(key)) {
			Ok(text) => Ok(Some(text)),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err.into()),
		}
	}

	fn save(&self, key: &str, text: &str) -> Result<(), StoreError> {
		fs::create_dir_all(&self.dir)?;
		fs::write(self.path(key), text)?;
		Ok(())
	}

	fn delete(&self, key: &str) -> Result<(), StoreError> {
		match fs::remove_file(self.path(key)) {
			Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
			_ => Ok(()),
		}
	}
}

#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: RefCell<HashMap<String, String>>,
}

impl Store for MemoryStore {
	fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.entries.borrow().get(key).cloned())
	}

	fn save(&self, key: &str, text: &str) -> Result<(), StoreError> {
		self.entries.borrow_mut().insert(key.to_string(), text.to_string());
		Ok(())
	}

	fn delete(&self, key: &str) -> Result<(), StoreError> {
		self.entries.borrow_mut().remove(key);
		Ok(())
	}
}

/// The stored deadline list. Nothing stored, or an unreadable value, is an
/// empty list.
///
/// # Errors
///
/// Backend failures only.
pub fn load_deadlines(store: &impl Store) -> Result<Vec<Deadline>, StoreError> {
	let Some(text) = store.load(DEADLINES_KEY)? else {
		return Ok(Vec::new());
	};

	match serde_json::from_str(&text) {
		Ok(deadlines) => Ok(deadlines),
		Err(err) => {
			warn!("ignoring unreadable stored deadlines: {err}");
			Ok(Vec::new())
		}
	}
}

/// # Errors
///
/// Backend or serialization failures.
pub fn save_deadlines(store: &impl Store, deadlines: &[Deadline]) -> Result<(), StoreError> {
	store.save(DEADLINES_KEY, &serde_json::to_string(deadlines)?)
}

/// # Errors
///
/// Backend failures.
pub fn clear_deadlines(store: &impl Store) -> Result<(), StoreError> {
	store.delete(DEADLINES_KEY)
}

/// Remove the entry at `index` (0-based) from the stored list and return it.
///
/// # Errors
///
/// [`StoreError::NoSuchEntry`] when `index` is out of range, or backend
/// failures.
pub fn remove_deadline(store: &impl Store, index: usize) -> Result<Deadline, StoreError> {
	let mut deadlines = load_deadlines(store)?;

	if index >= deadlines.len() {
		return Err(StoreError::NoSuchEntry(index + 1));
	}

	let removed = deadlines.remove(index);
	save_deadlines(store, &deadlines)?;

	Ok(removed)
}

/// Stored credential for `key`, if any non-blank one exists.
///
/// # Errors
///
/// Backend failures.
pub fn load_credential(store: &impl Store, key: &str) -> Result<Option<String>, StoreError> {
	Ok(store
		.load(key)?
		.map(|credential| credential.trim().to_string())
		.filter(|credential| !credential.is_empty()))
}
