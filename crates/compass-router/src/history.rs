//! History backends.
//!
//! The router never touches the environment directly. It talks to a
//! [`HistoryBackend`], which owns the real entry stack (the browser's
//! session history, or an in-memory list), reports back/forward moves and
//! performs full reloads.
//!
//! Every entry the router writes is stamped with a sequence number so a
//! popped entry can be matched to the router's own record of it.
//!
//! ## Backends
//!
//! - [`MemoryHistory`]: an in-memory stack. Used on native targets and in
//!   tests; back/forward moves are reported synchronously.
//! - `BrowserHistory` (wasm32 only): the History API of `window`, with
//!   moves reported from the `popstate` event.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::error::HistoryError;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHistory;

/// Callback invoked by a backend after it queued popped entries.
pub type Listener = Rc<dyn Fn()>;

/// An entry the environment moved to on its own (back, forward, go).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoppedEntry {
	/// Address of the entry, absolute URL or path.
	pub href: String,
	/// Sequence number stamped by the router, if the entry has one.
	pub seq: Option<u64>,
}

/// The host environment's history.
pub trait HistoryBackend {
	/// Origin of the application, `scheme://host[:port]`.
	fn origin(&self) -> String;

	/// Address of the current entry, absolute URL or path.
	fn current_href(&self) -> String;

	/// Appends an entry after the current one, dropping forward entries.
	fn push(&self, href: &str, seq: u64) -> Result<(), HistoryError>;

	/// Overwrites the current entry.
	fn replace(&self, href: &str, seq: u64) -> Result<(), HistoryError>;

	/// Leaves the application for `url`.
	fn reload(&self, url: &str) -> Result<(), HistoryError>;

	/// Moves `delta` entries through the stack.
	///
	/// The move is reported later through [`HistoryBackend::take_popped`]
	/// and the listener, not through the return value.
	fn go(&self, delta: i32) -> Result<(), HistoryError>;

	/// Drains the entries moved to since the last call, oldest first.
	fn take_popped(&self) -> Vec<PoppedEntry>;

	/// Installs the callback run after entries were popped. Replaces any
	/// previous listener.
	fn listen(&self, listener: Listener);
}

#[derive(Debug, Clone)]
struct MemoryEntry {
	href: String,
	seq: Option<u64>,
}

struct MemoryState {
	origin: String,
	entries: Vec<MemoryEntry>,
	index: usize,
	popped: VecDeque<PoppedEntry>,
	reloads: Vec<String>,
	listener: Option<Listener>,
	fail_writes: bool,
}

/// In-memory history stack.
///
/// Cloning yields another handle to the same stack, so a test can keep one
/// handle while the router owns another.
///
/// # Example
///
/// ```
/// use compass_router::history::{HistoryBackend, MemoryHistory};
///
/// let history = MemoryHistory::with_entry("/start");
/// history.push("/next", 1).unwrap();
/// history.back();
///
/// assert_eq!(history.current_href(), "/start");
/// assert_eq!(history.take_popped().len(), 1);
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
	inner: Rc<RefCell<MemoryState>>,
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryHistory {
	/// Default origin of an in-memory history.
	pub const DEFAULT_ORIGIN: &'static str = "http://localhost";

	/// Creates a stack holding a single `/` entry.
	pub fn new() -> Self {
		Self::with_entry("/")
	}

	/// Creates a stack holding a single entry for `href`.
	pub fn with_entry(href: impl Into<String>) -> Self {
		Self {
			inner: Rc::new(RefCell::new(MemoryState {
				origin: Self::DEFAULT_ORIGIN.to_string(),
				entries: vec![MemoryEntry {
					href: href.into(),
					seq: None,
				}],
				index: 0,
				popped: VecDeque::new(),
				reloads: Vec::new(),
				listener: None,
				fail_writes: false,
			})),
		}
	}

	/// Sets the origin reported to the router.
	pub fn with_origin(self, origin: impl Into<String>) -> Self {
		self.inner.borrow_mut().origin = origin.into();
		self
	}

	/// Appends an entry the router did not create, as if the user had
	/// followed a plain link handled by the environment.
	pub fn push_foreign(&self, href: impl Into<String>) {
		let mut state = self.inner.borrow_mut();
		let next = state.index + 1;
		state.entries.truncate(next);
		state.entries.push(MemoryEntry {
			href: href.into(),
			seq: None,
		});
		state.index = next;
	}

	/// Makes every later `push`/`replace` fail until reset.
	pub fn set_fail_writes(&self, fail: bool) {
		self.inner.borrow_mut().fail_writes = fail;
	}

	/// Moves one entry back.
	pub fn back(&self) {
		self.step(-1);
	}

	/// Moves one entry forward.
	pub fn forward(&self) {
		self.step(1);
	}

	/// Moves `delta` entries; out-of-range moves are ignored.
	pub fn step(&self, delta: i32) {
		let listener = {
			let mut state = self.inner.borrow_mut();
			let target = state.index as i64 + i64::from(delta);
			if delta == 0 || target < 0 || target >= state.entries.len() as i64 {
				return;
			}
			state.index = target as usize;
			let entry = state.entries[state.index].clone();
			state.popped.push_back(PoppedEntry {
				href: entry.href,
				seq: entry.seq,
			});
			state.listener.clone()
		};
		// The listener reads the stack again; the borrow must be released.
		if let Some(listener) = listener {
			listener();
		}
	}

	/// Returns the hrefs of all entries.
	pub fn entries(&self) -> Vec<String> {
		self.inner
			.borrow()
			.entries
			.iter()
			.map(|entry| entry.href.clone())
			.collect()
	}

	/// Returns the index of the current entry.
	pub fn index(&self) -> usize {
		self.inner.borrow().index
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.inner.borrow().entries.len()
	}

	/// Always false; a stack holds at least one entry.
	pub fn is_empty(&self) -> bool {
		self.inner.borrow().entries.is_empty()
	}

	/// Returns the sequence number stamped on the current entry.
	pub fn current_seq(&self) -> Option<u64> {
		let state = self.inner.borrow();
		state.entries[state.index].seq
	}

	/// Returns every URL a reload was requested for, in order.
	pub fn reloads(&self) -> Vec<String> {
		self.inner.borrow().reloads.clone()
	}

	fn check_writable(&self, operation: &'static str) -> Result<(), HistoryError> {
		if self.inner.borrow().fail_writes {
			return Err(HistoryError::Operation {
				operation,
				message: "writes disabled".to_string(),
			});
		}
		Ok(())
	}
}

impl HistoryBackend for MemoryHistory {
	fn origin(&self) -> String {
		self.inner.borrow().origin.clone()
	}

	fn current_href(&self) -> String {
		let state = self.inner.borrow();
		state.entries[state.index].href.clone()
	}

	fn push(&self, href: &str, seq: u64) -> Result<(), HistoryError> {
		self.check_writable("push")?;
		let mut state = self.inner.borrow_mut();
		let next = state.index + 1;
		state.entries.truncate(next);
		state.entries.push(MemoryEntry {
			href: href.to_string(),
			seq: Some(seq),
		});
		state.index = next;
		Ok(())
	}

	fn replace(&self, href: &str, seq: u64) -> Result<(), HistoryError> {
		self.check_writable("replace")?;
		let mut state = self.inner.borrow_mut();
		let index = state.index;
		state.entries[index] = MemoryEntry {
			href: href.to_string(),
			seq: Some(seq),
		};
		Ok(())
	}

	fn reload(&self, url: &str) -> Result<(), HistoryError> {
		self.inner.borrow_mut().reloads.push(url.to_string());
		Ok(())
	}

	fn go(&self, delta: i32) -> Result<(), HistoryError> {
		self.step(delta);
		Ok(())
	}

	fn take_popped(&self) -> Vec<PoppedEntry> {
		self.inner.borrow_mut().popped.drain(..).collect()
	}

	fn listen(&self, listener: Listener) {
		self.inner.borrow_mut().listener = Some(listener);
	}
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.borrow();
		f.debug_struct("MemoryHistory")
			.field("origin", &state.origin)
			.field("entries", &state.entries)
			.field("index", &state.index)
			.field("reloads", &state.reloads)
			.finish()
	}
}

#[cfg(target_arch = "wasm32")]
mod browser {
	use std::cell::RefCell;
	use std::collections::VecDeque;
	use std::rc::Rc;

	use wasm_bindgen::JsCast;
	use wasm_bindgen::JsValue;
	use wasm_bindgen::closure::Closure;
	use web_sys::{Event, PopStateEvent, Window};

	use super::{HistoryBackend, Listener, PoppedEntry};
	use crate::error::HistoryError;

	type PopStateClosure = Closure<dyn FnMut(Event)>;

	/// History backend over `window.history`.
	///
	/// The sequence number is stored as the entry's state object. The
	/// `popstate` listener is removed when the backend is dropped.
	pub struct BrowserHistory {
		window: Window,
		popped: Rc<RefCell<VecDeque<PoppedEntry>>>,
		closure: RefCell<Option<PopStateClosure>>,
	}

	impl BrowserHistory {
		/// Binds to the global `window`.
		pub fn new() -> Result<Self, HistoryError> {
			let window = web_sys::window()
				.ok_or_else(|| HistoryError::Unavailable("no global window".to_string()))?;
			Ok(Self {
				window,
				popped: Rc::new(RefCell::new(VecDeque::new())),
				closure: RefCell::new(None),
			})
		}

		fn history(&self) -> Result<web_sys::History, HistoryError> {
			self.window
				.history()
				.map_err(|err| HistoryError::Unavailable(format!("{err:?}")))
		}

		fn remove_listener(&self) {
			if let Some(closure) = self.closure.borrow_mut().take() {
				let _ = self
					.window
					.remove_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
			}
		}
	}

	fn js_error(operation: &'static str) -> impl Fn(JsValue) -> HistoryError {
		move |err| HistoryError::Operation {
			operation,
			message: format!("{err:?}"),
		}
	}

	impl HistoryBackend for BrowserHistory {
		fn origin(&self) -> String {
			self.window.location().origin().unwrap_or_default()
		}

		fn current_href(&self) -> String {
			self.window
				.location()
				.href()
				.unwrap_or_else(|_| "/".to_string())
		}

		fn push(&self, href: &str, seq: u64) -> Result<(), HistoryError> {
			self.history()?
				.push_state_with_url(&JsValue::from_f64(seq as f64), "", Some(href))
				.map_err(js_error("pushState"))
		}

		fn replace(&self, href: &str, seq: u64) -> Result<(), HistoryError> {
			self.history()?
				.replace_state_with_url(&JsValue::from_f64(seq as f64), "", Some(href))
				.map_err(js_error("replaceState"))
		}

		fn reload(&self, url: &str) -> Result<(), HistoryError> {
			self.window
				.location()
				.set_href(url)
				.map_err(js_error("location.href"))
		}

		fn go(&self, delta: i32) -> Result<(), HistoryError> {
			self.history()?
				.go_with_delta(delta)
				.map_err(js_error("history.go"))
		}

		fn take_popped(&self) -> Vec<PoppedEntry> {
			self.popped.borrow_mut().drain(..).collect()
		}

		fn listen(&self, listener: Listener) {
			self.remove_listener();

			let popped = Rc::clone(&self.popped);
			let window = self.window.clone();
			let closure = Closure::wrap(Box::new(move |event: Event| {
				let seq = event
					.dyn_ref::<PopStateEvent>()
					.and_then(|event| event.state().as_f64())
					.map(|seq| seq as u64);
				let href = window.location().href().unwrap_or_default();
				popped.borrow_mut().push_back(PoppedEntry { href, seq });
				listener();
			}) as Box<dyn FnMut(Event)>);

			if let Err(err) = self
				.window
				.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
			{
				tracing::warn!(error = ?err, "failed to install popstate listener");
				return;
			}
			*self.closure.borrow_mut() = Some(closure);
		}
	}

	impl Drop for BrowserHistory {
		fn drop(&mut self) {
			self.remove_listener();
		}
	}
}
