//! Subscription handles.

use core::fmt;

/// Handle returned by [`Readable::subscribe`](super::Readable::subscribe).
///
/// Dropping the handle unsubscribes the observer. Call [`Subscription::detach`]
/// to keep the observer registered for the lifetime of the store.
#[must_use = "dropping the subscription unsubscribes the observer"]
pub struct Subscription {
	release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	/// Creates a subscription that runs `release` when unsubscribed.
	pub fn new<F>(release: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self {
			release: Some(Box::new(release)),
		}
	}

	/// Creates a subscription that does nothing when released.
	pub fn empty() -> Self {
		Self { release: None }
	}

	/// Removes the observer from its store.
	pub fn unsubscribe(mut self) {
		if let Some(release) = self.release.take() {
			release();
		}
	}

	/// Keeps the observer registered; the handle no longer controls it.
	pub fn detach(mut self) {
		self.release = None;
	}

	/// Returns true if this handle still controls an observer.
	pub fn is_active(&self) -> bool {
		self.release.is_some()
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(release) = self.release.take() {
			release();
		}
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.is_active())
			.finish()
	}
}
