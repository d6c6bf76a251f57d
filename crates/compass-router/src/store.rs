//! Reactive location store.
//!
//! Three independent streams publish the current path, query and hash.
//! A navigation writes all three inside one [`batch`], so an observer of
//! one stream that reads the others sees the new location, never a mix of
//! old and new values. Each stream notifies only when its own value changed.

use compass_core::reactive::{ReadOnly, Readable, Writable, batch};

use crate::location::Location;

/// The observable half of the current location.
#[derive(Debug, Clone)]
pub struct LocationStore {
	path: Writable<String>,
	query: Writable<String>,
	hash: Writable<String>,
}

impl LocationStore {
	/// Creates the streams holding `initial`.
	pub fn new(initial: &Location) -> Self {
		Self {
			path: Writable::new(initial.path.clone()),
			query: Writable::new(initial.query.clone()),
			hash: Writable::new(initial.hash.clone()),
		}
	}

	/// Writes `location` to all three streams, then notifies.
	///
	/// Returns whether any stream changed.
	pub fn publish(&self, location: &Location) -> bool {
		batch(|| {
			let path = self.path.set(location.path.clone());
			let query = self.query.set(location.query.clone());
			let hash = self.hash.set(location.hash.clone());
			path || query || hash
		})
	}

	/// Canonical path stream.
	pub fn path(&self) -> ReadOnly<String> {
		self.path.read_only()
	}

	/// Query stream, without `?`.
	pub fn query(&self) -> ReadOnly<String> {
		self.query.read_only()
	}

	/// Hash stream, without `#`.
	pub fn hash(&self) -> ReadOnly<String> {
		self.hash.read_only()
	}

	/// Returns the published location.
	pub fn snapshot(&self) -> Location {
		Location {
			path: self.path.get(),
			query: self.query.get(),
			hash: self.hash.get(),
		}
	}
}
