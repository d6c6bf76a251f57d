//! Path Pattern Matching for client-side routing.
//!
//! Patterns are split into segments the same way paths are (see
//! [`crate::path`]) and matched segment by segment, so there is no regex in
//! the matching path.
//!
//! # Pattern Syntax
//!
//! - `users` - Literal, matched exactly against the decoded segment
//! - `{id}` or `:id` - Parameter, matches any single non-empty segment
//! - `{rest:*}` - Named wildcard, matches every remaining segment (zero or
//!   more) and binds them joined with `/`
//! - `*` - Anonymous wildcard, like a named one but binds nothing
//!
//! A wildcard may only appear as the last segment.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{PatternError, ReverseError};
use crate::path::{DELIMITER, canonicalize, decode_segment, path_to_array};

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a pattern.
const MAX_PATTERN_SEGMENTS: usize = 32;

/// One compiled segment of a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
	/// Matches exactly this decoded segment.
	Literal(String),
	/// Matches any single non-empty segment and binds it by name.
	Param(String),
	/// Matches all remaining segments, optionally binding them by name.
	Wildcard(Option<String>),
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
	/// The original pattern string.
	source: String,
	/// Compiled segments in order.
	segments: Vec<PatternSegment>,
}

impl PathPattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if the pattern is longer than 1024 bytes,
	/// has more than 32 segments, contains a malformed or duplicate
	/// placeholder, or places a wildcard before the last segment.
	pub fn new(pattern: &str) -> Result<Self, PatternError> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(PatternError::TooLong {
				length: pattern.len(),
				max: MAX_PATTERN_LENGTH,
			});
		}

		let trimmed = pattern.trim_matches(DELIMITER);
		let raw_segments: Vec<&str> = if trimmed.is_empty() {
			Vec::new()
		} else {
			trimmed.split(DELIMITER).collect()
		};

		if raw_segments.len() > MAX_PATTERN_SEGMENTS {
			return Err(PatternError::TooManySegments {
				count: raw_segments.len(),
				max: MAX_PATTERN_SEGMENTS,
			});
		}

		let mut segments = Vec::with_capacity(raw_segments.len());
		let mut seen = HashSet::new();
		for (index, raw) in raw_segments.iter().enumerate() {
			let segment = Self::compile_segment(raw)?;
			match &segment {
				PatternSegment::Wildcard(_) if index + 1 != raw_segments.len() => {
					return Err(PatternError::WildcardNotLast(pattern.to_string()));
				}
				PatternSegment::Param(name) | PatternSegment::Wildcard(Some(name)) => {
					if !seen.insert(name.clone()) {
						return Err(PatternError::DuplicateParameter(name.clone()));
					}
				}
				_ => {}
			}
			segments.push(segment);
		}

		Ok(Self {
			source: pattern.to_string(),
			segments,
		})
	}

	fn compile_segment(raw: &str) -> Result<PatternSegment, PatternError> {
		if raw == "*" {
			return Ok(PatternSegment::Wildcard(None));
		}

		if let Some(inner) = raw.strip_prefix('{') {
			let inner = inner
				.strip_suffix('}')
				.ok_or_else(|| PatternError::UnclosedParameter(raw.to_string()))?;
			let (name, wildcard) = match inner.strip_suffix(":*") {
				Some(name) => (name, true),
				None => (inner, false),
			};
			let name = Self::validate_name(raw, name)?;
			return Ok(if wildcard {
				PatternSegment::Wildcard(Some(name))
			} else {
				PatternSegment::Param(name)
			});
		}

		if let Some(name) = raw.strip_prefix(':') {
			return Ok(PatternSegment::Param(Self::validate_name(raw, name)?));
		}

		if raw.contains('{') || raw.contains('}') {
			return Err(PatternError::UnclosedParameter(raw.to_string()));
		}

		Ok(PatternSegment::Literal(decode_segment(raw).into_owned()))
	}

	fn validate_name(raw: &str, name: &str) -> Result<String, PatternError> {
		if name.is_empty() {
			return Err(PatternError::EmptyParameterName(raw.to_string()));
		}
		if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
			return Err(PatternError::InvalidParameterName(name.to_string()));
		}
		Ok(name.to_string())
	}

	/// Returns the original pattern string.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Returns the compiled segments.
	pub fn segments(&self) -> &[PatternSegment] {
		&self.segments
	}

	/// Returns the parameter names in pattern order.
	pub fn param_names(&self) -> Vec<&str> {
		self.segments
			.iter()
			.filter_map(|segment| match segment {
				PatternSegment::Param(name) | PatternSegment::Wildcard(Some(name)) => {
					Some(name.as_str())
				}
				_ => None,
			})
			.collect()
	}

	/// Returns whether this pattern consists of literals only.
	pub fn is_exact(&self) -> bool {
		self.segments
			.iter()
			.all(|segment| matches!(segment, PatternSegment::Literal(_)))
	}

	/// Returns whether the last segment is a wildcard.
	pub fn has_wildcard(&self) -> bool {
		matches!(self.segments.last(), Some(PatternSegment::Wildcard(_)))
	}

	/// Matches the whole of `path` (decoded segments).
	///
	/// Returns the bound parameters on success.
	pub fn matches(&self, path: &[String]) -> Option<HashMap<String, String>> {
		self.match_segments(path, true).map(|(params, _)| params)
	}

	/// Matches a leading part of `path`.
	///
	/// Returns the bound parameters and the number of segments consumed.
	pub fn match_prefix(&self, path: &[String]) -> Option<(HashMap<String, String>, usize)> {
		self.match_segments(path, false)
	}

	/// Checks whether a path string matches this pattern.
	pub fn is_match(&self, path: &str) -> bool {
		self.matches(&path_to_array(path)).is_some()
	}

	fn match_segments(&self, path: &[String], exact: bool) -> Option<(HashMap<String, String>, usize)> {
		let mut params = HashMap::new();

		for (index, segment) in self.segments.iter().enumerate() {
			match segment {
				PatternSegment::Wildcard(name) => {
					let rest = &path[index..];
					if let Some(name) = name {
						params.insert(name.clone(), rest.join("/"));
					}
					return Some((params, path.len()));
				}
				PatternSegment::Literal(expected) => {
					if path.get(index)? != expected {
						return None;
					}
				}
				PatternSegment::Param(name) => {
					let actual = path.get(index)?;
					if actual.is_empty() {
						return None;
					}
					params.insert(name.clone(), actual.clone());
				}
			}
		}

		let consumed = self.segments.len();
		if exact && path.len() != consumed {
			return None;
		}
		Some((params, consumed))
	}

	/// Builds the decoded segments of a path from parameter values.
	///
	/// A named wildcard value is split on `/` into several segments; an
	/// anonymous wildcard contributes nothing.
	pub fn reverse_segments(
		&self,
		params: &HashMap<String, String>,
	) -> Result<Vec<String>, ReverseError> {
		let mut out = Vec::with_capacity(self.segments.len());
		for segment in &self.segments {
			match segment {
				PatternSegment::Literal(literal) => out.push(literal.clone()),
				PatternSegment::Param(name) => {
					// An empty segment would never match the placeholder again.
					let value = params
						.get(name)
						.filter(|value| !value.is_empty())
						.ok_or_else(|| ReverseError::MissingParameter(name.clone()))?;
					out.push(value.clone());
				}
				PatternSegment::Wildcard(Some(name)) => {
					let value = params
						.get(name)
						.ok_or_else(|| ReverseError::MissingParameter(name.clone()))?;
					out.extend(path_to_array(value));
				}
				PatternSegment::Wildcard(None) => {}
			}
		}
		Ok(out)
	}

	/// Generates a canonical path from this pattern with the given parameters.
	pub fn reverse(&self, params: &HashMap<String, String>) -> Result<String, ReverseError> {
		self.reverse_segments(params).map(|segments| canonicalize(&segments))
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.segments == other.segments
	}
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.source)
	}
}
