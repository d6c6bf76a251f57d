//! Locations and href resolution.
//!
//! A [`Location`] is the part of an address the router owns: a canonical
//! path plus the raw query and fragment, both stored without their leading
//! `?` / `#`.

use std::fmt;

use compass_urls::path::{normalize, path_to_array};
use url::Url;

/// The current address of the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
	/// Canonical path, always starting with `/`.
	pub path: String,
	/// Query string without the leading `?`.
	pub query: String,
	/// Fragment without the leading `#`.
	pub hash: String,
}

impl Default for Location {
	fn default() -> Self {
		Self::root()
	}
}

impl Location {
	/// Creates a location, normalizing the path and stripping delimiters.
	pub fn new(path: &str, query: &str, hash: &str) -> Self {
		Self {
			path: normalize(path),
			query: query.strip_prefix('?').unwrap_or(query).to_string(),
			hash: hash.strip_prefix('#').unwrap_or(hash).to_string(),
		}
	}

	/// The location `/` with no query and no fragment.
	pub fn root() -> Self {
		Self {
			path: "/".to_string(),
			query: String::new(),
			hash: String::new(),
		}
	}

	/// Splits `path?query#hash` without resolving it against anything.
	///
	/// # Example
	///
	/// ```
	/// use compass_router::location::Location;
	///
	/// let loc = Location::parse("/x/?y=1#z");
	/// assert_eq!(loc.path, "/x");
	/// assert_eq!(loc.query, "y=1");
	/// assert_eq!(loc.hash, "z");
	/// ```
	pub fn parse(href: &str) -> Self {
		let (rest, hash) = href.split_once('#').unwrap_or((href, ""));
		let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
		Self::new(path, query, hash)
	}

	/// Builds a location from an absolute URL.
	pub fn from_url(url: &Url) -> Self {
		Self::new(
			url.path(),
			url.query().unwrap_or_default(),
			url.fragment().unwrap_or_default(),
		)
	}

	/// Renders `path[?query][#hash]`.
	pub fn to_href(&self) -> String {
		let mut href = self.path.clone();
		if !self.query.is_empty() {
			href.push('?');
			href.push_str(&self.query);
		}
		if !self.hash.is_empty() {
			href.push('#');
			href.push_str(&self.hash);
		}
		href
	}

	/// Returns the decoded path segments.
	pub fn segments(&self) -> Vec<String> {
		path_to_array(&self.path)
	}

	/// Decodes the query string into key/value pairs, in order.
	///
	/// A query that cannot be decoded yields no pairs.
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		match serde_urlencoded::from_str::<Vec<(String, String)>>(&self.query) {
			Ok(pairs) => pairs,
			Err(err) => {
				tracing::warn!(query = %self.query, error = %err, "undecodable query string");
				Vec::new()
			}
		}
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_href())
	}
}

/// Where an href points, relative to the running application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
	/// A path served by this application.
	Internal(Location),
	/// A same-origin path outside the application's base prefix.
	///
	/// The session history can still hold it, so it is only left to the
	/// environment when reloads are allowed.
	OutsideBase {
		/// The resolved location.
		location: Location,
		/// The same target as an absolute URL.
		url: String,
	},
	/// Another origin or a non-hierarchical scheme, as an absolute URL.
	External(String),
}

/// Resolves `href` the way a browser resolves a link on the current page.
///
/// `origin` is the application's origin (`scheme://host[:port]`) and
/// `base` an optional path prefix the application lives under. Targets on
/// another origin or with a non-hierarchical scheme are
/// [`Target::External`]; same-origin paths outside `base` are
/// [`Target::OutsideBase`]. An href that cannot be resolved at all is
/// treated as a same-app path.
pub fn resolve(href: &str, current: &Location, origin: &str, base: &str) -> Target {
	let Ok(root) = Url::parse(origin) else {
		tracing::warn!(origin, "unparsable origin, treating href as path");
		return Target::Internal(Location::parse(href));
	};
	let here = root.join(&current.to_href()).unwrap_or_else(|_| root.clone());

	let target = match here.join(href) {
		Ok(target) => target,
		Err(err) => {
			tracing::debug!(href, error = %err, "unresolvable href, treating as path");
			return Target::Internal(Location::parse(href));
		}
	};

	if target.origin() != root.origin() {
		return Target::External(target.into());
	}

	let location = Location::from_url(&target);
	if !is_within_base(&location.path, base) {
		return Target::OutsideBase {
			location,
			url: target.into(),
		};
	}
	Target::Internal(location)
}

/// Returns whether `path` lies under the base prefix.
pub fn is_within_base(path: &str, base: &str) -> bool {
	let base = normalize(base);
	if base == "/" {
		return true;
	}
	path == base
		|| path
			.strip_prefix(base.as_str())
			.is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const ORIGIN: &str = "http://localhost";

	fn at(href: &str) -> Location {
		Location::parse(href)
	}

	#[rstest]
	#[case("/x?y=1#z", "/x", "y=1", "z")]
	#[case("/x/", "/x", "", "")]
	#[case("?only", "/", "only", "")]
	#[case("#frag", "/", "", "frag")]
	#[case("/a#b?c", "/a", "", "b?c")]
	fn test_parse(
		#[case] href: &str,
		#[case] path: &str,
		#[case] query: &str,
		#[case] hash: &str,
	) {
		let loc = Location::parse(href);
		assert_eq!(loc.path, path);
		assert_eq!(loc.query, query);
		assert_eq!(loc.hash, hash);
	}

	#[rstest]
	fn test_new_strips_delimiters() {
		let loc = Location::new("docs/", "?a=1", "#top");
		assert_eq!(loc.to_href(), "/docs?a=1#top");
	}

	#[rstest]
	fn test_query_pairs() {
		let loc = at("/s?q=rust+lang&page=2");
		assert_eq!(
			loc.query_pairs(),
			vec![
				("q".to_string(), "rust lang".to_string()),
				("page".to_string(), "2".to_string()),
			]
		);
	}

	#[rstest]
	#[case("/b", "/a/c", "/b", "", "")]
	#[case("b", "/a/c", "/a/b", "", "")]
	#[case("../d", "/a/b/c", "/a/d", "", "")]
	#[case("?y=1", "/a?x=0#h", "/a", "y=1", "")]
	#[case("#z", "/a?x=0", "/a", "x=0", "z")]
	#[case("http://localhost/p?q#h", "/", "/p", "q", "h")]
	#[case("/with space", "/", "/with%20space", "", "")]
	fn test_resolve_internal(
		#[case] href: &str,
		#[case] current: &str,
		#[case] path: &str,
		#[case] query: &str,
		#[case] hash: &str,
	) {
		let expected = Location {
			path: path.to_string(),
			query: query.to_string(),
			hash: hash.to_string(),
		};
		assert_eq!(
			resolve(href, &at(current), ORIGIN, ""),
			Target::Internal(expected)
		);
	}

	#[rstest]
	#[case("https://example.com/x", "https://example.com/x")]
	#[case("https://localhost/x", "https://localhost/x")]
	#[case("http://localhost:8080/x", "http://localhost:8080/x")]
	#[case("//cdn.example.com/a.js", "http://cdn.example.com/a.js")]
	#[case("mailto:me@example.com", "mailto:me@example.com")]
	fn test_resolve_external(#[case] href: &str, #[case] url: &str) {
		assert_eq!(
			resolve(href, &Location::root(), ORIGIN, ""),
			Target::External(url.to_string())
		);
	}

	#[rstest]
	fn test_resolve_outside_base() {
		let current = at("/app/home");

		assert!(matches!(
			resolve("/app/settings", &current, ORIGIN, "/app"),
			Target::Internal(_)
		));
		assert_eq!(
			resolve("/other?x=1", &current, ORIGIN, "/app"),
			Target::OutsideBase {
				location: at("/other?x=1"),
				url: "http://localhost/other?x=1".to_string(),
			}
		);
	}

	#[rstest]
	#[case("http://[::1", "/docs/intro", "/http%3A//%5B%3A%3A1")]
	#[case("//", "/docs/intro", "/")]
	#[case("%", "/docs/intro", "/docs/%25")]
	#[case("\u{0}", "/docs/intro", "/docs/intro")]
	fn test_resolve_malformed_href_stays_internal(
		#[case] href: &str,
		#[case] current: &str,
		#[case] path: &str,
	) {
		assert_eq!(
			resolve(href, &at(current), ORIGIN, ""),
			Target::Internal(at(path))
		);
	}

	#[rstest]
	#[case("/app", "/app", true)]
	#[case("/app/x", "/app/", true)]
	#[case("/application", "/app", false)]
	#[case("/anything", "", true)]
	#[case("/anything", "/", true)]
	fn test_is_within_base(#[case] path: &str, #[case] base: &str, #[case] expected: bool) {
		assert_eq!(is_within_base(path, base), expected);
	}
}
