//! Notification Runtime
//!
//! Schedules store notifications on a per-thread FIFO queue.
//!
//! ## Architecture
//!
//! 1. **Pending Queue**: every changed store enqueues one notification job,
//!    keyed by its [`NodeId`]. A store that is already pending is not queued
//!    twice; the job reads the latest value when it runs.
//! 2. **Batching**: while a [`batch`] is open, jobs only accumulate. The
//!    outermost `batch` flushes them on exit.
//! 3. **Flushing**: jobs run in the order their stores first changed. A job
//!    that changes another store appends to the same queue instead of
//!    recursing.

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

/// Unique identifier for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
	/// Create a new unique NodeId
	pub fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl Default for NodeId {
	fn default() -> Self {
		Self::new()
	}
}

type Job = Rc<dyn Fn()>;

/// Per-thread notification scheduler.
pub(crate) struct Runtime {
	/// Open `batch` calls.
	batch_depth: Cell<usize>,
	/// Whether the queue is currently being drained.
	flushing: Cell<bool>,
	/// Jobs waiting to run, in scheduling order.
	pending: RefCell<VecDeque<(NodeId, Job)>>,
	/// Stores with a job in `pending`.
	pending_ids: RefCell<BTreeSet<NodeId>>,
}

impl Runtime {
	fn new() -> Self {
		Self {
			batch_depth: Cell::new(0),
			flushing: Cell::new(false),
			pending: RefCell::new(VecDeque::new()),
			pending_ids: RefCell::new(BTreeSet::new()),
		}
	}

	/// Queues the notification job of a store and flushes unless batching.
	pub(crate) fn schedule(&self, id: NodeId, job: Job) {
		if self.pending_ids.borrow_mut().insert(id) {
			self.pending.borrow_mut().push_back((id, job));
		}
		if self.batch_depth.get() == 0 {
			self.flush();
		}
	}

	/// Drops a pending job, used when a store is deallocated.
	pub(crate) fn cancel(&self, id: NodeId) {
		if self.pending_ids.borrow_mut().remove(&id) {
			self.pending.borrow_mut().retain(|(pending, _)| *pending != id);
		}
	}

	fn flush(&self) {
		if self.flushing.replace(true) {
			return;
		}
		let _guard = FlushGuard(self);

		let mut delivered = 0usize;
		loop {
			// The borrow must end before the job runs; jobs schedule more jobs.
			let next = self.pending.borrow_mut().pop_front();
			let Some((id, job)) = next else { break };
			self.pending_ids.borrow_mut().remove(&id);
			job();
			delivered += 1;
		}
		tracing::trace!(delivered, "reactive queue flushed");
	}
}

struct FlushGuard<'a>(&'a Runtime);

impl Drop for FlushGuard<'_> {
	fn drop(&mut self) {
		self.0.flushing.set(false);
	}
}

thread_local! {
	static RUNTIME: Runtime = Runtime::new();
}

/// Runs `f` with the current thread's runtime.
pub(crate) fn with_runtime<R>(f: impl FnOnce(&Runtime) -> R) -> R {
	RUNTIME.with(f)
}

/// Like [`with_runtime`], but returns `None` during thread teardown.
pub(crate) fn try_with_runtime<R>(f: impl FnOnce(&Runtime) -> R) -> Option<R> {
	RUNTIME.try_with(f).ok()
}

/// Applies every store write made by `f` before any subscriber runs.
///
/// Subscribers observe the state after all writes, never an intermediate
/// one. Nested calls flush once, when the outermost call returns.
///
/// # Example
///
/// ```
/// use compass_core::reactive::{Readable, Writable, batch};
///
/// let first = Writable::new(String::from("a"));
/// let second = Writable::new(String::from("a"));
///
/// let other = second.clone();
/// let _sub = first.subscribe(move |v: &String| {
///     // Inside the batch both stores already hold the new value.
///     assert_eq!(*v, other.get());
/// });
///
/// batch(|| {
///     first.set("b".into());
///     second.set("b".into());
/// });
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
	with_runtime(|rt| rt.batch_depth.set(rt.batch_depth.get() + 1));
	let _guard = BatchGuard;
	f()
}

/// Returns true while a [`batch`] is open on this thread.
pub fn is_batching() -> bool {
	with_runtime(|rt| rt.batch_depth.get() > 0)
}

struct BatchGuard;

impl Drop for BatchGuard {
	fn drop(&mut self) {
		let _ = try_with_runtime(|rt| {
			let depth = rt.batch_depth.get().saturating_sub(1);
			rt.batch_depth.set(depth);
			if depth == 0 {
				rt.flush();
			}
		});
	}
}
