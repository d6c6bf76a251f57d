//! Route bindings.
//!
//! A [`Route`] is the declarative half of routing: a pattern, a fallback
//! flag, an optional name and an optional callback. Registering it with a
//! [`Router`](crate::Router) yields a [`RouteHandle`] whose
//! [`matched`](RouteHandle::matched) stream tells whether the route is the
//! winner of its scope.

use std::fmt;

use compass_core::reactive::{ReadOnly, Readable};
use compass_urls::{RouteId, RouteMatch, ScopeId};

/// Callback run when a route becomes the winner or its params change.
pub type MatchCallback = Box<dyn FnMut(&RouteMatch)>;

/// A route definition.
///
/// # Example
///
/// ```
/// use compass_router::Route;
///
/// let user = Route::new("/users/{id}")
///     .named("user_detail")
///     .on_match(|m| println!("user {}", m.params["id"]));
/// let not_found = Route::not_found();
///
/// assert_eq!(user.path(), "/users/{id}");
/// assert!(not_found.is_fallback());
/// ```
pub struct Route {
	path: String,
	fallback: bool,
	name: Option<String>,
	callback: Option<MatchCallback>,
}

impl Route {
	/// Creates a route for `path`.
	///
	/// An empty path never matches structurally; combine it with
	/// [`Route::fallback`].
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			fallback: false,
			name: None,
			callback: None,
		}
	}

	/// A pure fallback route: empty path, fallback flag set.
	pub fn not_found() -> Self {
		Self::new("").fallback(true)
	}

	/// Sets the fallback flag.
	pub fn fallback(mut self, fallback: bool) -> Self {
		self.fallback = fallback;
		self
	}

	/// Names the route for [`Router::reverse`](crate::Router::reverse).
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Sets the callback run when this route is selected.
	pub fn on_match<F>(mut self, callback: F) -> Self
	where
		F: FnMut(&RouteMatch) + 'static,
	{
		self.callback = Some(Box::new(callback));
		self
	}

	/// Returns the pattern string.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the fallback flag.
	pub fn is_fallback(&self) -> bool {
		self.fallback
	}

	/// Returns the route name.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub(crate) fn into_parts(self) -> (String, bool, Option<String>, Option<MatchCallback>) {
		(self.path, self.fallback, self.name, self.callback)
	}
}

impl fmt::Debug for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("path", &self.path)
			.field("fallback", &self.fallback)
			.field("name", &self.name)
			.field("has_callback", &self.callback.is_some())
			.finish()
	}
}

/// A registered route.
#[derive(Debug, Clone)]
pub struct RouteHandle {
	id: RouteId,
	scope: ScopeId,
	matched: ReadOnly<Option<RouteMatch>>,
}

impl RouteHandle {
	pub(crate) fn new(id: RouteId, scope: ScopeId, matched: ReadOnly<Option<RouteMatch>>) -> Self {
		Self { id, scope, matched }
	}

	/// Returns the route's identifier.
	pub fn id(&self) -> RouteId {
		self.id
	}

	/// Returns the scope the route was registered in.
	pub fn scope(&self) -> ScopeId {
		self.scope
	}

	/// Stream of this route's match: `Some` while it wins its scope.
	pub fn matched(&self) -> ReadOnly<Option<RouteMatch>> {
		self.matched.clone()
	}

	/// Returns whether the route currently wins its scope.
	pub fn is_active(&self) -> bool {
		self.matched.get().is_some()
	}
}
