//! Navigation history.
//!
//! [`NavigationHistory`] is the router's own record of the entry stack. It
//! owns the current [`Location`]; nothing else mutates it. The backend's
//! stack mirrors it, and every entry carries a sequence number so entries
//! popped by the environment can be found again.

use crate::location::{Location, Target};
use crate::options::RouterOptions;

/// How a navigation writes the entry stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
	/// Append an entry.
	Push,
	/// Overwrite the current entry.
	Replace,
}

impl NavigationKind {
	/// Name used in log fields.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Push => "push",
			Self::Replace => "replace",
		}
	}
}

/// An immutable snapshot of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	/// Sequence number, strictly increasing in creation order.
	pub seq: u64,
	/// The entry's location.
	pub location: Location,
}

/// What to do with a resolved href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	/// Navigate within the application.
	Soft(Location),
	/// Leave the application for this URL.
	Reload(String),
	/// Ignore the navigation.
	Prevent(String),
}

/// Decides how to handle `target` under `options`.
///
/// With `reload_prevent` set, a same-origin path outside the base is kept
/// in the application; only another origin is dropped.
pub fn decide(target: Target, options: &RouterOptions) -> Decision {
	match target {
		Target::Internal(location) => Decision::Soft(location),
		Target::OutsideBase { location, .. } if options.reload_prevent => Decision::Soft(location),
		Target::OutsideBase { url, .. } => Decision::Reload(url),
		Target::External(url) if options.reload_prevent => Decision::Prevent(url),
		Target::External(url) => Decision::Reload(url),
	}
}

/// The router's entry stack.
#[derive(Debug, Clone)]
pub struct NavigationHistory {
	entries: Vec<HistoryEntry>,
	cursor: usize,
	next_seq: u64,
}

impl NavigationHistory {
	/// Creates a stack with one entry for `initial`, sequence number 0.
	pub fn new(initial: Location) -> Self {
		Self {
			entries: vec![HistoryEntry {
				seq: 0,
				location: initial,
			}],
			cursor: 0,
			next_seq: 1,
		}
	}

	/// Returns the current entry.
	pub fn current(&self) -> &HistoryEntry {
		&self.entries[self.cursor]
	}

	/// Returns the current location.
	pub fn location(&self) -> &Location {
		&self.current().location
	}

	/// Returns all entries, oldest first.
	pub fn entries(&self) -> &[HistoryEntry] {
		&self.entries
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Always false; the stack holds at least one entry.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the index of the current entry.
	pub fn cursor(&self) -> usize {
		self.cursor
	}

	/// Sequence number the next pushed entry will get.
	pub fn peek_seq(&self) -> u64 {
		self.next_seq
	}

	/// Appends an entry after the current one, discarding forward entries.
	pub fn push(&mut self, location: Location) -> &HistoryEntry {
		let seq = self.next_seq;
		self.next_seq += 1;

		self.entries.truncate(self.cursor + 1);
		self.entries.push(HistoryEntry { seq, location });
		self.cursor = self.entries.len() - 1;
		&self.entries[self.cursor]
	}

	/// Overwrites the location of the current entry, keeping its sequence
	/// number.
	pub fn replace(&mut self, location: Location) -> &HistoryEntry {
		self.entries[self.cursor].location = location;
		&self.entries[self.cursor]
	}

	/// Moves to the entry with sequence number `seq` after the environment
	/// popped it, taking `location` as its address.
	///
	/// An unknown or missing `seq` means the environment moved to an entry
	/// this stack never recorded; the current entry is overwritten instead.
	pub fn restore(&mut self, seq: Option<u64>, location: Location) -> &HistoryEntry {
		let found = seq.and_then(|seq| self.entries.iter().position(|entry| entry.seq == seq));
		match found {
			Some(index) => {
				self.cursor = index;
				self.entries[index].location = location;
				&self.entries[index]
			}
			None => self.replace(location),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn history() -> NavigationHistory {
		NavigationHistory::new(Location::root())
	}

	#[rstest]
	fn test_push_grows_and_moves_cursor(mut history: NavigationHistory) {
		let seq = history.push(Location::parse("/a")).seq;

		assert_eq!(seq, 1);
		assert_eq!(history.len(), 2);
		assert_eq!(history.cursor(), 1);
		assert_eq!(history.location().path, "/a");
	}

	#[rstest]
	fn test_replace_keeps_length_and_seq(mut history: NavigationHistory) {
		history.push(Location::parse("/a"));
		history.replace(Location::parse("/b"));
		history.replace(Location::parse("/c"));

		assert_eq!(history.len(), 2);
		assert_eq!(history.current().seq, 1);
		assert_eq!(history.location().path, "/c");
	}

	#[rstest]
	fn test_push_discards_forward_entries(mut history: NavigationHistory) {
		history.push(Location::parse("/a"));
		history.push(Location::parse("/b"));
		history.restore(Some(0), Location::root());

		history.push(Location::parse("/c"));

		let paths: Vec<&str> = history.entries().iter().map(|e| e.location.path.as_str()).collect();
		assert_eq!(paths, vec!["/", "/c"]);
		assert_eq!(history.current().seq, 3);
	}

	#[rstest]
	fn test_restore_known_seq(mut history: NavigationHistory) {
		history.push(Location::parse("/a?x=1#h"));
		history.push(Location::parse("/b"));

		let entry = history.restore(Some(1), Location::parse("/a?x=1#h")).clone();

		assert_eq!(history.cursor(), 1);
		assert_eq!(entry.location, Location::parse("/a?x=1#h"));
		assert_eq!(history.len(), 3);
	}

	#[rstest]
	#[case(None)]
	#[case(Some(99))]
	fn test_restore_unknown_seq_replaces_current(mut history: NavigationHistory, #[case] seq: Option<u64>) {
		history.push(Location::parse("/a"));

		history.restore(seq, Location::parse("/elsewhere"));

		assert_eq!(history.len(), 2);
		assert_eq!(history.cursor(), 1);
		assert_eq!(history.location().path, "/elsewhere");
	}

	#[rstest]
	fn test_decide() {
		let internal = Target::Internal(Location::parse("/a"));
		let external = Target::External("https://example.com/".to_string());
		let permissive = RouterOptions::default();
		let strict = RouterOptions::new().with_reload_prevent(true);

		assert_eq!(
			decide(internal, &strict),
			Decision::Soft(Location::parse("/a"))
		);
		assert_eq!(
			decide(external.clone(), &permissive),
			Decision::Reload("https://example.com/".to_string())
		);
		assert_eq!(
			decide(external, &strict),
			Decision::Prevent("https://example.com/".to_string())
		);
	}

	#[rstest]
	fn test_decide_outside_base() {
		let outside = Target::OutsideBase {
			location: Location::parse("/login"),
			url: "http://localhost/login".to_string(),
		};
		let permissive = RouterOptions::new().with_base("/app");
		let strict = permissive.clone().with_reload_prevent(true);

		assert_eq!(
			decide(outside.clone(), &permissive),
			Decision::Reload("http://localhost/login".to_string())
		);
		assert_eq!(
			decide(outside, &strict),
			Decision::Soft(Location::parse("/login"))
		);
	}
}
