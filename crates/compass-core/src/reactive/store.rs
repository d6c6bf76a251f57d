//! Writable and read-only stores.
//!
//! `Writable<T>` is a cheap-to-clone handle (`Rc`) around a value and its
//! subscriber list. All clones share the same value.
//!
//! ## Delivery contract
//!
//! - **Cold start**: `subscribe` calls the observer synchronously with the
//!   current value before returning.
//! - **Change only**: `set` with a value equal to the current one notifies
//!   nobody.
//! - **Last value wins**: a notification carries the value at delivery
//!   time, not at write time. Several writes before delivery collapse into
//!   one notification.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::runtime::{NodeId, try_with_runtime, with_runtime};
use super::subscription::Subscription;

type Observer<T> = Rc<RefCell<Box<dyn FnMut(&T)>>>;

/// Read access to a reactive value.
///
/// Implementors must deliver the current value to a new observer
/// synchronously inside `subscribe`, then once per change until the
/// returned [`Subscription`] is released.
pub trait Readable<T> {
	/// Returns a clone of the current value.
	fn get(&self) -> T;

	/// Registers a boxed observer. See [`Readable::subscribe`].
	fn subscribe_boxed(&self, observer: Box<dyn FnMut(&T)>) -> Subscription;

	/// Registers an observer and delivers the current value to it immediately.
	///
	/// The observer stays registered until the returned [`Subscription`] is
	/// dropped or [`Subscription::unsubscribe`] is called.
	#[must_use = "dropping the subscription unsubscribes the observer"]
	fn subscribe<F>(&self, observer: F) -> Subscription
	where
		F: FnMut(&T) + 'static,
		Self: Sized,
	{
		self.subscribe_boxed(Box::new(observer))
	}
}

struct StoreInner<T> {
	id: NodeId,
	value: RefCell<T>,
	observers: RefCell<BTreeMap<u64, Observer<T>>>,
	next_key: Cell<u64>,
}

impl<T> Drop for StoreInner<T> {
	fn drop(&mut self) {
		let id = self.id;
		let _ = try_with_runtime(|rt| rt.cancel(id));
	}
}

/// A reactive value that can be written.
pub struct Writable<T: 'static> {
	inner: Rc<StoreInner<T>>,
}

impl<T: 'static> Clone for Writable<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: Clone + PartialEq + 'static> Writable<T> {
	/// Creates a store holding `value`.
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(StoreInner {
				id: NodeId::new(),
				value: RefCell::new(value),
				observers: RefCell::new(BTreeMap::new()),
				next_key: Cell::new(0),
			}),
		}
	}

	/// Replaces the value, notifying subscribers if it changed.
	///
	/// Returns whether the value changed.
	pub fn set(&self, value: T) -> bool {
		{
			let mut current = self.inner.value.borrow_mut();
			if *current == value {
				return false;
			}
			*current = value;
		}
		self.notify();
		true
	}

	/// Mutates the value in place, notifying subscribers if it changed.
	pub fn update<F>(&self, f: F) -> bool
	where
		F: FnOnce(&mut T),
	{
		let mut next = self.get();
		f(&mut next);
		self.set(next)
	}

	/// Returns a handle that can read and subscribe but not write.
	pub fn read_only(&self) -> ReadOnly<T> {
		ReadOnly {
			store: self.clone(),
		}
	}

	/// Returns the number of registered observers.
	pub fn subscriber_count(&self) -> usize {
		self.inner.observers.borrow().len()
	}

	/// Returns the store's identifier.
	pub fn id(&self) -> NodeId {
		self.inner.id
	}

	fn notify(&self) {
		let weak = Rc::downgrade(&self.inner);
		with_runtime(|rt| rt.schedule(self.inner.id, Rc::new(move || deliver(&weak))));
	}
}

/// Delivers the current value of a store to a snapshot of its observers.
fn deliver<T: Clone + 'static>(store: &Weak<StoreInner<T>>) {
	let Some(store) = store.upgrade() else {
		return;
	};
	let value = store.value.borrow().clone();
	let observers: Vec<Observer<T>> = store.observers.borrow().values().cloned().collect();
	drop(store);

	for observer in observers {
		// An observer that is already running is skipped; it will see the
		// value through the store if it reads it.
		if let Ok(mut observer) = observer.try_borrow_mut() {
			(*observer)(&value);
		}
	}
}

impl<T: Clone + PartialEq + 'static> Readable<T> for Writable<T> {
	fn get(&self) -> T {
		self.inner.value.borrow().clone()
	}

	fn subscribe_boxed(&self, observer: Box<dyn FnMut(&T)>) -> Subscription {
		let key = self.inner.next_key.get();
		self.inner.next_key.set(key + 1);

		let observer: Observer<T> = Rc::new(RefCell::new(observer));
		self.inner
			.observers
			.borrow_mut()
			.insert(key, Rc::clone(&observer));

		// Cold-start delivery.
		let value = self.get();
		(*observer.borrow_mut())(&value);

		let weak = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(store) = weak.upgrade() {
				store.observers.borrow_mut().remove(&key);
			}
		})
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Writable<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Writable")
			.field("id", &self.inner.id)
			.field("value", &*self.inner.value.borrow())
			.field("subscribers", &self.inner.observers.borrow().len())
			.finish()
	}
}

/// Read-only view over a [`Writable`].
pub struct ReadOnly<T: 'static> {
	store: Writable<T>,
}

impl<T: 'static> Clone for ReadOnly<T> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
		}
	}
}

impl<T: Clone + PartialEq + 'static> Readable<T> for ReadOnly<T> {
	fn get(&self) -> T {
		self.store.get()
	}

	fn subscribe_boxed(&self, observer: Box<dyn FnMut(&T)>) -> Subscription {
		self.store.subscribe_boxed(observer)
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for ReadOnly<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ReadOnly").field(&self.store).finish()
	}
}
