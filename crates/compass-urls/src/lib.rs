//! # Compass URLs
//!
//! Path handling for client-side routing:
//!
//! - [`path`]: splitting paths into decoded segments and joining them back
//!   into canonical form.
//! - [`pattern`]: compiled route patterns with `{param}` / `:param`
//!   placeholders and trailing wildcards.
//! - [`matcher`]: a registry of patterns that selects the winning route for
//!   a path, with fallback routes and nested scopes.
//!
//! ## Example
//!
//! ```
//! use compass_urls::matcher::{RouteMatcher, ScopeId};
//! use compass_urls::path::path_to_array;
//!
//! let mut matcher = RouteMatcher::new();
//! matcher.register(ScopeId::ROOT, "/users/{id}", false, None).unwrap();
//! let not_found = matcher.register(ScopeId::ROOT, "", true, None).unwrap();
//!
//! let hit = matcher.resolve(ScopeId::ROOT, &path_to_array("/users/42")).unwrap();
//! assert_eq!(hit.params.get("id").map(String::as_str), Some("42"));
//!
//! let miss = matcher.resolve(ScopeId::ROOT, &path_to_array("/nowhere")).unwrap();
//! assert_eq!(miss.route, not_found);
//! ```

pub mod error;
pub mod matcher;
pub mod path;
pub mod pattern;

pub use error::{PatternError, ReverseError};
pub use matcher::{RouteId, RouteMatch, RouteMatcher, ScopeId};
pub use path::{canonicalize, normalize, path_to_array};
pub use pattern::{PathPattern, PatternSegment};
