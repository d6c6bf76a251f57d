//! Route matcher.
//!
//! [`RouteMatcher`] keeps every registered route in registration order and
//! picks, for a given path, at most one winner per scope:
//!
//! 1. the first route (in registration order) whose pattern matches the
//!    whole remaining path;
//! 2. otherwise the most recently registered fallback route of that scope.
//!
//! A scope other than [`ScopeId::ROOT`] is mounted under a prefix pattern.
//! The scope only takes part in matching while its mount chain matches a
//! leading part of the path; its routes see the rest, and they inherit the
//! parameters bound by the mount patterns. Selection in one scope never
//! affects selection in another.

use std::collections::HashMap;
use std::fmt;

use crate::error::{PatternError, ReverseError};
use crate::path::{canonicalize, path_to_array};
use crate::pattern::PathPattern;

/// Identifier of a registered route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(u64);

impl RouteId {
	/// Returns the raw identifier.
	pub fn as_u64(self) -> u64 {
		self.0
	}
}

impl fmt::Display for RouteId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "route#{}", self.0)
	}
}

/// Identifier of a routing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
	/// The top-level scope, mounted at `/`.
	pub const ROOT: ScopeId = ScopeId(0);

	/// Returns the raw identifier.
	pub fn as_u64(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ScopeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "scope#{}", self.0)
	}
}

/// The winning route of one scope for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
	/// The route that won.
	pub route: RouteId,
	/// The scope the route belongs to.
	pub scope: ScopeId,
	/// The route's pattern string; empty for a pure fallback.
	pub pattern: String,
	/// The route's name, if any.
	pub name: Option<String>,
	/// Decoded parameters, including those bound by the mount chain.
	pub params: HashMap<String, String>,
	/// True when the route won as a fallback rather than structurally.
	pub fallback: bool,
}

#[derive(Debug, Clone)]
struct RouteEntry {
	id: RouteId,
	scope: ScopeId,
	/// `None` for a route registered with an empty pattern string.
	pattern: Option<PathPattern>,
	fallback: bool,
	name: Option<String>,
}

#[derive(Debug, Clone)]
struct ScopeEntry {
	id: ScopeId,
	parent: ScopeId,
	mount: PathPattern,
}

/// Registry of route patterns.
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
	routes: Vec<RouteEntry>,
	scopes: Vec<ScopeEntry>,
	next_route: u64,
	next_scope: u64,
}

impl RouteMatcher {
	/// Creates an empty matcher with only the root scope.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a route in `scope`.
	///
	/// An empty `pattern` produces a route that never matches structurally;
	/// it can only win as a fallback. A route in a scope that does not exist
	/// (or was removed) never wins.
	pub fn register(
		&mut self,
		scope: ScopeId,
		pattern: &str,
		fallback: bool,
		name: Option<&str>,
	) -> Result<RouteId, PatternError> {
		let compiled = if pattern.is_empty() {
			None
		} else {
			Some(PathPattern::new(pattern)?)
		};

		self.next_route += 1;
		let id = RouteId(self.next_route);
		tracing::trace!(%id, %scope, pattern, fallback, "registered route");

		self.routes.push(RouteEntry {
			id,
			scope,
			pattern: compiled,
			fallback,
			name: name.map(str::to_string),
		});
		Ok(id)
	}

	/// Removes a route. Returns false if it was not registered.
	pub fn unregister(&mut self, id: RouteId) -> bool {
		let before = self.routes.len();
		self.routes.retain(|route| route.id != id);
		let removed = self.routes.len() != before;
		if removed {
			tracing::trace!(%id, "unregistered route");
		}
		removed
	}

	/// Creates a nested scope mounted at `mount` below `parent`.
	pub fn add_scope(&mut self, parent: ScopeId, mount: &str) -> Result<ScopeId, PatternError> {
		let mount = PathPattern::new(mount)?;
		self.next_scope += 1;
		let id = ScopeId(self.next_scope);
		tracing::trace!(%id, %parent, mount = mount.source(), "added scope");
		self.scopes.push(ScopeEntry { id, parent, mount });
		Ok(id)
	}

	/// Removes a scope together with its descendant scopes and all their
	/// routes. The root scope cannot be removed.
	pub fn remove_scope(&mut self, id: ScopeId) -> bool {
		if id == ScopeId::ROOT || !self.has_scope(id) {
			return false;
		}

		let mut doomed = vec![id];
		let mut cursor = 0;
		while cursor < doomed.len() {
			let current = doomed[cursor];
			doomed.extend(
				self.scopes
					.iter()
					.filter(|scope| scope.parent == current)
					.map(|scope| scope.id),
			);
			cursor += 1;
		}

		self.scopes.retain(|scope| !doomed.contains(&scope.id));
		self.routes.retain(|route| !doomed.contains(&route.scope));
		true
	}

	/// Returns whether `id` names a live scope.
	pub fn has_scope(&self, id: ScopeId) -> bool {
		id == ScopeId::ROOT || self.scopes.iter().any(|scope| scope.id == id)
	}

	/// Returns whether `id` names a registered route.
	pub fn has_route(&self, id: RouteId) -> bool {
		self.routes.iter().any(|route| route.id == id)
	}

	/// Returns the scope a route was registered in.
	pub fn route_scope(&self, id: RouteId) -> Option<ScopeId> {
		self.routes.iter().find(|route| route.id == id).map(|route| route.scope)
	}

	/// Returns the number of registered routes.
	pub fn route_count(&self) -> usize {
		self.routes.len()
	}

	/// Returns every live scope, root first.
	pub fn scope_ids(&self) -> Vec<ScopeId> {
		std::iter::once(ScopeId::ROOT)
			.chain(self.scopes.iter().map(|scope| scope.id))
			.collect()
	}

	/// Mount chain from the outermost scope down to `id`.
	fn mount_chain(&self, id: ScopeId) -> Option<Vec<&ScopeEntry>> {
		let mut chain = Vec::new();
		let mut current = id;
		while current != ScopeId::ROOT {
			let entry = self.scopes.iter().find(|scope| scope.id == current)?;
			chain.push(entry);
			current = entry.parent;
		}
		chain.reverse();
		Some(chain)
	}

	/// Selects the winning route of `scope` for `path` (decoded segments).
	pub fn resolve(&self, scope: ScopeId, path: &[String]) -> Option<RouteMatch> {
		let chain = self.mount_chain(scope)?;

		let mut inherited = HashMap::new();
		let mut offset = 0;
		for entry in chain {
			let (params, consumed) = entry.mount.match_prefix(&path[offset..])?;
			inherited.extend(params);
			offset += consumed;
		}
		let remaining = &path[offset..];

		let candidates = || self.routes.iter().filter(|route| route.scope == scope);

		for route in candidates() {
			let Some(pattern) = &route.pattern else {
				continue;
			};
			if let Some(params) = pattern.matches(remaining) {
				let mut all = inherited.clone();
				all.extend(params);
				tracing::trace!(route = %route.id, %scope, "structural match");
				return Some(Self::build_match(route, all, false));
			}
		}

		let fallback = candidates().rev().find(|route| route.fallback)?;
		tracing::trace!(route = %fallback.id, %scope, "fallback match");
		Some(Self::build_match(fallback, inherited, true))
	}

	/// Selects the winner of every live scope for `path`.
	///
	/// Scopes with no winner (mount not matching, or no candidate) are
	/// absent from the result.
	pub fn resolve_all(&self, path: &[String]) -> HashMap<ScopeId, RouteMatch> {
		self.scope_ids()
			.into_iter()
			.filter_map(|scope| self.resolve(scope, path).map(|hit| (scope, hit)))
			.collect()
	}

	/// Resolves a path string in the root scope.
	pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
		self.resolve(ScopeId::ROOT, &path_to_array(path))
	}

	fn build_match(route: &RouteEntry, params: HashMap<String, String>, fallback: bool) -> RouteMatch {
		RouteMatch {
			route: route.id,
			scope: route.scope,
			pattern: route
				.pattern
				.as_ref()
				.map(|p| p.source().to_string())
				.unwrap_or_default(),
			name: route.name.clone(),
			params,
			fallback,
		}
	}

	/// Builds the canonical path of a named route.
	///
	/// Mount patterns of the route's scope chain are reversed too, so their
	/// parameters must be supplied as well. When several routes share a name
	/// the most recently registered one is used.
	pub fn reverse(
		&self,
		name: &str,
		params: &HashMap<String, String>,
	) -> Result<String, ReverseError> {
		let route = self
			.routes
			.iter()
			.rev()
			.find(|route| route.name.as_deref() == Some(name))
			.ok_or_else(|| ReverseError::InvalidRouteName(name.to_string()))?;

		let chain = self
			.mount_chain(route.scope)
			.ok_or_else(|| ReverseError::InvalidRouteName(name.to_string()))?;

		let mut segments = Vec::new();
		for entry in chain {
			segments.extend(entry.mount.reverse_segments(params)?);
		}
		if let Some(pattern) = &route.pattern {
			segments.extend(pattern.reverse_segments(params)?);
		}
		Ok(canonicalize(&segments))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn segs(path: &str) -> Vec<String> {
		path_to_array(path)
	}

	#[rstest]
	fn test_first_structural_match_wins() {
		let mut matcher = RouteMatcher::new();
		let specific = matcher.register(ScopeId::ROOT, "/users/me", false, None).unwrap();
		let generic = matcher.register(ScopeId::ROOT, "/users/{id}", false, None).unwrap();

		assert_eq!(matcher.match_path("/users/me").unwrap().route, specific);
		assert_eq!(matcher.match_path("/users/7").unwrap().route, generic);
	}

	#[rstest]
	fn test_no_match_without_fallback() {
		let mut matcher = RouteMatcher::new();
		matcher.register(ScopeId::ROOT, "/a", false, None).unwrap();
		assert!(matcher.match_path("/b").is_none());
	}

	#[rstest]
	fn test_last_registered_fallback_wins() {
		let mut matcher = RouteMatcher::new();
		let _a = matcher.register(ScopeId::ROOT, "", true, None).unwrap();
		let b = matcher.register(ScopeId::ROOT, "", true, None).unwrap();

		let hit = matcher.match_path("/anything").unwrap();
		assert_eq!(hit.route, b);
		assert!(hit.fallback);
	}

	#[rstest]
	fn test_fallback_with_pattern_matches_structurally() {
		let mut matcher = RouteMatcher::new();
		let home = matcher.register(ScopeId::ROOT, "/", true, None).unwrap();
		let about = matcher.register(ScopeId::ROOT, "/about", false, None).unwrap();

		let root = matcher.match_path("/").unwrap();
		assert_eq!(root.route, home);
		assert!(!root.fallback);

		assert_eq!(matcher.match_path("/about").unwrap().route, about);

		let other = matcher.match_path("/missing").unwrap();
		assert_eq!(other.route, home);
		assert!(other.fallback);
	}

	#[rstest]
	fn test_empty_pattern_never_matches_structurally() {
		let mut matcher = RouteMatcher::new();
		matcher.register(ScopeId::ROOT, "", false, None).unwrap();
		assert!(matcher.match_path("/").is_none());
	}

	#[rstest]
	fn test_unregister_removes_route() {
		let mut matcher = RouteMatcher::new();
		let id = matcher.register(ScopeId::ROOT, "/a", false, None).unwrap();

		assert!(matcher.unregister(id));
		assert!(!matcher.unregister(id));
		assert!(!matcher.has_route(id));
		assert!(matcher.match_path("/a").is_none());
	}

	#[rstest]
	fn test_scope_inherits_mount_params() {
		let mut matcher = RouteMatcher::new();
		let org = matcher.add_scope(ScopeId::ROOT, "/org/{org}").unwrap();
		let repo = matcher.register(org, "/repos/{repo}", false, None).unwrap();

		let hit = matcher.resolve(org, &segs("/org/acme/repos/compass")).unwrap();
		assert_eq!(hit.route, repo);
		assert_eq!(hit.scope, org);
		assert_eq!(hit.params.get("org"), Some(&"acme".to_string()));
		assert_eq!(hit.params.get("repo"), Some(&"compass".to_string()));
	}

	#[rstest]
	fn test_scope_inactive_when_mount_misses() {
		let mut matcher = RouteMatcher::new();
		let admin = matcher.add_scope(ScopeId::ROOT, "/admin").unwrap();
		matcher.register(admin, "", true, None).unwrap();

		assert!(matcher.resolve(admin, &segs("/public")).is_none());
		assert!(matcher.resolve(admin, &segs("/admin/x")).is_some());
	}

	#[rstest]
	fn test_scopes_select_independently() {
		let mut matcher = RouteMatcher::new();
		let shell = matcher.register(ScopeId::ROOT, "/app/*", false, None).unwrap();
		let root_fallback = matcher.register(ScopeId::ROOT, "", true, None).unwrap();
		let app = matcher.add_scope(ScopeId::ROOT, "/app").unwrap();
		let settings = matcher.register(app, "/settings", false, None).unwrap();
		let app_fallback = matcher.register(app, "", true, None).unwrap();

		let winners = matcher.resolve_all(&segs("/app/settings"));
		assert_eq!(winners[&ScopeId::ROOT].route, shell);
		assert_eq!(winners[&app].route, settings);

		let winners = matcher.resolve_all(&segs("/app/unknown"));
		assert_eq!(winners[&ScopeId::ROOT].route, shell);
		assert_eq!(winners[&app].route, app_fallback);

		let winners = matcher.resolve_all(&segs("/elsewhere"));
		assert_eq!(winners[&ScopeId::ROOT].route, root_fallback);
		assert!(!winners.contains_key(&app));
	}

	#[rstest]
	fn test_remove_scope_drops_descendants() {
		let mut matcher = RouteMatcher::new();
		let outer = matcher.add_scope(ScopeId::ROOT, "/a").unwrap();
		let inner = matcher.add_scope(outer, "/b").unwrap();
		let route = matcher.register(inner, "/c", false, None).unwrap();

		assert!(matcher.remove_scope(outer));
		assert!(!matcher.has_scope(inner));
		assert!(!matcher.has_route(route));
		assert!(!matcher.remove_scope(ScopeId::ROOT));
	}

	#[rstest]
	fn test_reverse_named_route() {
		let mut matcher = RouteMatcher::new();
		matcher
			.register(ScopeId::ROOT, "/users/{id}", false, Some("user_detail"))
			.unwrap();

		let mut params = HashMap::new();
		params.insert("id".to_string(), "42".to_string());

		assert_eq!(
			matcher.reverse("user_detail", &params),
			Ok("/users/42".to_string())
		);
		assert_eq!(
			matcher.reverse("missing", &params),
			Err(ReverseError::InvalidRouteName("missing".to_string()))
		);
	}

	#[rstest]
	fn test_reverse_includes_mount_chain() {
		let mut matcher = RouteMatcher::new();
		let org = matcher.add_scope(ScopeId::ROOT, "/org/{org}").unwrap();
		matcher.register(org, "/settings", false, Some("org_settings")).unwrap();

		let mut params = HashMap::new();
		params.insert("org".to_string(), "acme".to_string());

		let path = matcher.reverse("org_settings", &params).unwrap();
		assert_eq!(path, "/org/acme/settings");
		assert!(matcher.resolve(org, &segs(&path)).is_some());
	}

	#[rstest]
	fn test_route_in_unknown_scope_never_wins() {
		let mut matcher = RouteMatcher::new();
		let scope = matcher.add_scope(ScopeId::ROOT, "/x").unwrap();
		matcher.remove_scope(scope);
		let route = matcher.register(scope, "", true, None).unwrap();

		assert!(matcher.has_route(route));
		assert!(matcher.resolve(scope, &segs("/x")).is_none());
	}
}
