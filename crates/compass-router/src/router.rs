//! The router service.
//!
//! [`Router`] ties the pieces together:
//!
//! 1. a navigation intent (`push`, `replace`, a link, back/forward) is
//!    resolved against the current location;
//! 2. [`NavigationHistory`] records the new location and the backend's
//!    stack is written to match;
//! 3. path, query and hash are published in one batch, together with the
//!    new winner of every scope.
//!
//! Navigations run to completion one at a time. A navigation started from
//! inside a subscriber is queued and runs once the current one has
//! published; the call returns [`NavigationOutcome::Queued`].

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

use compass_core::reactive::{ReadOnly, Readable, Writable, batch};
use compass_urls::{RouteId, RouteMatch, RouteMatcher, ScopeId, path_to_array};

use crate::error::RouterError;
use crate::history::HistoryBackend;
use crate::location::{Location, Target, resolve};
use crate::navigation::{Decision, HistoryEntry, NavigationHistory, NavigationKind, decide};
use crate::options::{RouterOptions, RouterOptionsPatch};
use crate::route::{Route, RouteHandle};
use crate::store::LocationStore;

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
	/// The location changed in place (or already was the target).
	Navigated,
	/// The environment was asked to load this URL.
	Reloaded(String),
	/// The target is on another origin and `reload_prevent` is set.
	Prevented(String),
	/// Another navigation is running; this one runs after it.
	Queued,
}

impl NavigationOutcome {
	/// Returns true for [`NavigationOutcome::Navigated`].
	pub fn is_navigated(&self) -> bool {
		matches!(self, Self::Navigated)
	}
}

struct Binding {
	id: RouteId,
	scope: ScopeId,
	matched: Writable<Option<RouteMatch>>,
}

enum Op {
	Navigate { href: String, kind: NavigationKind },
	Sync,
}

struct RouterInner {
	backend: Box<dyn HistoryBackend>,
	navigation: RefCell<NavigationHistory>,
	options: RefCell<RouterOptions>,
	matcher: RefCell<RouteMatcher>,
	bindings: RefCell<Vec<Binding>>,
	store: LocationStore,
	active: Writable<Option<RouteMatch>>,
	queue: RefCell<VecDeque<Op>>,
	busy: Cell<bool>,
}

struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
	fn enter(flag: &'a Cell<bool>) -> Self {
		flag.set(true);
		Self(flag)
	}
}

impl Drop for BusyGuard<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

/// Client-side router.
///
/// Cloning yields another handle to the same router.
///
/// # Example
///
/// ```
/// use compass_router::{MemoryHistory, Route, Router};
/// use compass_core::reactive::Readable;
///
/// let router = Router::new(MemoryHistory::new());
/// let user = router.register(Route::new("/users/{id}")).unwrap();
///
/// router.push("/users/42?tab=posts").unwrap();
///
/// assert_eq!(router.path().get(), "/users/42");
/// assert_eq!(router.query().get(), "tab=posts");
/// assert!(user.is_active());
/// ```
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl Router {
	/// Creates a router over `backend` with default options.
	pub fn new<B>(backend: B) -> Self
	where
		B: HistoryBackend + 'static,
	{
		Self::with_options(backend, RouterOptions::default())
	}

	/// Creates a router over `backend`.
	///
	/// The initial location is read from the backend, and the backend's
	/// current entry is stamped so it can be recognised when popped later.
	pub fn with_options<B>(backend: B, options: RouterOptions) -> Self
	where
		B: HistoryBackend + 'static,
	{
		let origin = backend.origin();
		let href = backend.current_href();
		let initial = match resolve(&href, &Location::root(), &origin, "") {
			Target::Internal(location) | Target::OutsideBase { location, .. } => location,
			Target::External(url) => {
				tracing::warn!(%url, "initial address is not an application path");
				Location::root()
			}
		};

		if let Err(err) = backend.replace(&initial.to_href(), 0) {
			tracing::warn!(error = %err, "failed to stamp the initial history entry");
		}

		let inner = Rc::new(RouterInner {
			backend: Box::new(backend),
			store: LocationStore::new(&initial),
			navigation: RefCell::new(NavigationHistory::new(initial.clone())),
			options: RefCell::new(options),
			matcher: RefCell::new(RouteMatcher::new()),
			bindings: RefCell::new(Vec::new()),
			active: Writable::new(None),
			queue: RefCell::new(VecDeque::new()),
			busy: Cell::new(false),
		});

		let weak: Weak<RouterInner> = Rc::downgrade(&inner);
		inner.backend.listen(Rc::new(move || {
			if let Some(inner) = weak.upgrade() {
				let router = Router { inner };
				if let Err(err) = router.sync_external() {
					tracing::warn!(error = %err, "failed to apply external navigation");
				}
			}
		}));

		tracing::debug!(location = %initial, "router initialized");
		Self { inner }
	}

	/// Navigates to `href`, appending a history entry.
	///
	/// `href` may be an absolute URL, an absolute or relative path, a
	/// `?query` or a `#hash`; it is resolved against the current location.
	pub fn push(&self, href: &str) -> Result<NavigationOutcome, RouterError> {
		self.run(Op::Navigate {
			href: href.to_string(),
			kind: NavigationKind::Push,
		})
	}

	/// Navigates to `href`, overwriting the current history entry.
	pub fn replace(&self, href: &str) -> Result<NavigationOutcome, RouterError> {
		self.run(Op::Navigate {
			href: href.to_string(),
			kind: NavigationKind::Replace,
		})
	}

	/// Applies the entries the backend reports as popped.
	///
	/// Backends call this through their listener; it only needs to be
	/// called directly for a backend without one.
	pub fn sync_external(&self) -> Result<NavigationOutcome, RouterError> {
		self.run(Op::Sync)
	}

	/// Moves one entry back.
	pub fn back(&self) -> Result<(), RouterError> {
		self.go(-1)
	}

	/// Moves one entry forward.
	pub fn forward(&self) -> Result<(), RouterError> {
		self.go(1)
	}

	/// Moves `delta` entries through the history.
	///
	/// The resulting location is applied when the backend reports the move.
	pub fn go(&self, delta: i32) -> Result<(), RouterError> {
		tracing::debug!(delta, "history traversal requested");
		self.inner.backend.go(delta)?;
		Ok(())
	}

	/// Merges `patch` into the options. Takes effect on the next navigation.
	pub fn set_options(&self, patch: RouterOptionsPatch) {
		let mut options = self.inner.options.borrow_mut();
		options.apply(&patch);
		tracing::debug!(
			reload_prevent = options.reload_prevent,
			base = %options.base,
			"router options updated"
		);
	}

	/// Returns a copy of the current options.
	pub fn options(&self) -> RouterOptions {
		self.inner.options.borrow().clone()
	}

	fn run(&self, op: Op) -> Result<NavigationOutcome, RouterError> {
		if self.inner.busy.get() {
			tracing::trace!("navigation queued behind the running one");
			self.inner.queue.borrow_mut().push_back(op);
			return Ok(NavigationOutcome::Queued);
		}

		let _guard = BusyGuard::enter(&self.inner.busy);
		let result = self.execute(op);

		loop {
			let next = self.inner.queue.borrow_mut().pop_front();
			let Some(op) = next else { break };
			if let Err(err) = self.execute(op) {
				tracing::warn!(error = %err, "queued navigation failed");
			}
		}

		result
	}

	fn execute(&self, op: Op) -> Result<NavigationOutcome, RouterError> {
		match op {
			Op::Navigate { href, kind } => self.navigate(&href, kind),
			Op::Sync => {
				self.apply_popped();
				Ok(NavigationOutcome::Navigated)
			}
		}
	}

	fn navigate(&self, href: &str, kind: NavigationKind) -> Result<NavigationOutcome, RouterError> {
		let options = self.options();
		let current = self.location();
		let target = resolve(href, &current, &self.inner.backend.origin(), &options.base);

		match decide(target, &options) {
			Decision::Reload(url) => {
				tracing::debug!(href, kind = kind.as_str(), outcome = "reload", %url);
				self.inner.backend.reload(&url)?;
				Ok(NavigationOutcome::Reloaded(url))
			}
			Decision::Prevent(url) => {
				tracing::warn!(href, kind = kind.as_str(), %url, "navigation to another origin prevented");
				Ok(NavigationOutcome::Prevented(url))
			}
			Decision::Soft(location) => {
				if kind == NavigationKind::Push && location == current {
					tracing::debug!(href, kind = kind.as_str(), outcome = "unchanged");
					return Ok(NavigationOutcome::Navigated);
				}

				let target_href = location.to_href();
				match kind {
					NavigationKind::Push => {
						let seq = self.inner.navigation.borrow().peek_seq();
						self.inner.backend.push(&target_href, seq)?;
						self.inner.navigation.borrow_mut().push(location);
					}
					NavigationKind::Replace => {
						let seq = self.inner.navigation.borrow().current().seq;
						self.inner.backend.replace(&target_href, seq)?;
						self.inner.navigation.borrow_mut().replace(location);
					}
				}

				tracing::debug!(href, kind = kind.as_str(), outcome = "navigated", location = %target_href);
				self.publish();
				Ok(NavigationOutcome::Navigated)
			}
		}
	}

	fn apply_popped(&self) {
		let origin = self.inner.backend.origin();
		for entry in self.inner.backend.take_popped() {
			let options = self.options();
			let target = resolve(&entry.href, &Location::root(), &origin, &options.base);
			let location = match decide(target, &options) {
				Decision::Soft(location) => location,
				Decision::Reload(url) | Decision::Prevent(url) => {
					tracing::warn!(%url, "popped entry outside the application ignored");
					continue;
				}
			};

			tracing::debug!(href = %entry.href, seq = ?entry.seq, outcome = "restored");
			self.inner.navigation.borrow_mut().restore(entry.seq, location);
			self.publish();
		}
	}

	/// Publishes the current location and the route selection for it.
	fn publish(&self) {
		let location = self.location();
		batch(|| {
			self.inner.store.publish(&location);
			self.reselect_for(&location);
		});
	}

	fn reselect(&self) {
		let location = self.location();
		self.reselect_for(&location);
	}

	fn reselect_for(&self, location: &Location) {
		let winners = self.inner.matcher.borrow().resolve_all(&location.segments());
		let bindings: Vec<(RouteId, ScopeId, Writable<Option<RouteMatch>>)> = self
			.inner
			.bindings
			.borrow()
			.iter()
			.map(|binding| (binding.id, binding.scope, binding.matched.clone()))
			.collect();

		batch(|| {
			self.inner.active.set(winners.get(&ScopeId::ROOT).cloned());
			for (id, scope, matched) in bindings {
				let hit = winners.get(&scope).filter(|hit| hit.route == id).cloned();
				matched.set(hit);
			}
		});
	}

	/// Registers a route in the root scope.
	pub fn register(&self, route: Route) -> Result<RouteHandle, RouterError> {
		self.register_in(ScopeId::ROOT, route)
	}

	fn register_in(&self, scope: ScopeId, route: Route) -> Result<RouteHandle, RouterError> {
		let (path, fallback, name, callback) = route.into_parts();
		let id = self
			.inner
			.matcher
			.borrow_mut()
			.register(scope, &path, fallback, name.as_deref())?;

		let matched = Writable::new(None);
		self.inner.bindings.borrow_mut().push(Binding {
			id,
			scope,
			matched: matched.clone(),
		});
		self.reselect();

		if let Some(mut callback) = callback {
			matched
				.subscribe(move |hit: &Option<RouteMatch>| {
					if let Some(hit) = hit {
						callback(hit);
					}
				})
				.detach();
		}

		tracing::debug!(route = %id, %scope, pattern = %path, fallback, "route registered");
		Ok(RouteHandle::new(id, scope, matched.read_only()))
	}

	/// Removes a route. Returns false if it was not registered.
	pub fn unregister(&self, id: RouteId) -> bool {
		let removed = self.inner.matcher.borrow_mut().unregister(id);
		let binding = {
			let mut bindings = self.inner.bindings.borrow_mut();
			bindings
				.iter()
				.position(|binding| binding.id == id)
				.map(|index| bindings.remove(index))
		};
		if let Some(binding) = binding {
			binding.matched.set(None);
		}
		if removed {
			tracing::debug!(route = %id, "route unregistered");
			self.reselect();
		}
		removed
	}

	/// Creates a nested scope mounted at `mount` in the root scope.
	pub fn scope(&self, mount: &str) -> Result<ScopeHandle, RouterError> {
		self.scope_in(ScopeId::ROOT, mount)
	}

	fn scope_in(&self, parent: ScopeId, mount: &str) -> Result<ScopeHandle, RouterError> {
		let id = self.inner.matcher.borrow_mut().add_scope(parent, mount)?;
		tracing::debug!(scope = %id, %parent, mount, "scope created");
		Ok(ScopeHandle {
			router: self.clone(),
			id,
		})
	}

	/// Removes a scope, its nested scopes and all their routes.
	pub fn remove_scope(&self, id: ScopeId) -> bool {
		if !self.inner.matcher.borrow_mut().remove_scope(id) {
			return false;
		}

		let dropped: Vec<Binding> = {
			let matcher = self.inner.matcher.borrow();
			let mut bindings = self.inner.bindings.borrow_mut();
			let (kept, dropped): (Vec<Binding>, Vec<Binding>) = bindings
				.drain(..)
				.partition(|binding| matcher.has_route(binding.id));
			*bindings = kept;
			dropped
		};
		for binding in dropped {
			binding.matched.set(None);
		}

		tracing::debug!(scope = %id, "scope removed");
		self.reselect();
		true
	}

	/// Builds the path of a named route.
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
		let params: HashMap<String, String> = params
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		Ok(self.inner.matcher.borrow().reverse(name, &params)?)
	}

	/// Resolves `path` in the root scope without navigating.
	pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
		self.inner
			.matcher
			.borrow()
			.resolve(ScopeId::ROOT, &path_to_array(path))
	}

	/// Returns the number of registered routes.
	pub fn route_count(&self) -> usize {
		self.inner.matcher.borrow().route_count()
	}

	/// Canonical path stream.
	pub fn path(&self) -> ReadOnly<String> {
		self.inner.store.path()
	}

	/// Query stream, without `?`.
	pub fn query(&self) -> ReadOnly<String> {
		self.inner.store.query()
	}

	/// Hash stream, without `#`.
	pub fn hash(&self) -> ReadOnly<String> {
		self.inner.store.hash()
	}

	/// Winner of the root scope.
	pub fn active(&self) -> ReadOnly<Option<RouteMatch>> {
		self.inner.active.read_only()
	}

	/// Returns the current location.
	pub fn location(&self) -> Location {
		self.inner.navigation.borrow().location().clone()
	}

	/// Decoded query pairs of the current location.
	pub fn query_params(&self) -> Vec<(String, String)> {
		self.location().query_pairs()
	}

	/// Returns the number of history entries.
	pub fn history_len(&self) -> usize {
		self.inner.navigation.borrow().len()
	}

	/// Returns the index of the current history entry.
	pub fn history_index(&self) -> usize {
		self.inner.navigation.borrow().cursor()
	}

	/// Returns a snapshot of all history entries.
	pub fn entries(&self) -> Vec<HistoryEntry> {
		self.inner.navigation.borrow().entries().to_vec()
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("location", &self.location())
			.field("history_len", &self.history_len())
			.field("routes_count", &self.route_count())
			.field("options", &*self.inner.options.borrow())
			.finish()
	}
}

/// A nested routing scope.
///
/// Routes registered here match the part of the path after the scope's
/// mount pattern and inherit the mount's parameters.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
	router: Router,
	id: ScopeId,
}

impl ScopeHandle {
	/// Returns the scope's identifier.
	pub fn id(&self) -> ScopeId {
		self.id
	}

	/// Registers a route in this scope.
	pub fn register(&self, route: Route) -> Result<RouteHandle, RouterError> {
		self.router.register_in(self.id, route)
	}

	/// Creates a scope nested in this one.
	pub fn scope(&self, mount: &str) -> Result<ScopeHandle, RouterError> {
		self.router.scope_in(self.id, mount)
	}

	/// Removes this scope and everything registered in it.
	pub fn remove(self) -> bool {
		self.router.remove_scope(self.id)
	}
}
