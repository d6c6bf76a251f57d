//! Error types for route patterns.

/// Error type for pattern compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	/// Pattern string exceeds the length limit.
	#[error("Pattern length {length} exceeds maximum allowed length of {max} bytes")]
	TooLong {
		/// Actual length in bytes.
		length: usize,
		/// Allowed maximum.
		max: usize,
	},
	/// Pattern has more segments than allowed.
	#[error("Pattern has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Actual segment count.
		count: usize,
		/// Allowed maximum.
		max: usize,
	},
	/// A `{` placeholder is not closed by `}`.
	#[error("Unclosed parameter in segment '{0}'")]
	UnclosedParameter(String),
	/// A placeholder has no name.
	#[error("Empty parameter name in segment '{0}'")]
	EmptyParameterName(String),
	/// A placeholder name contains characters that are not allowed.
	#[error("Invalid parameter name '{0}'")]
	InvalidParameterName(String),
	/// The same placeholder name is used twice.
	#[error("Duplicate parameter name '{0}'")]
	DuplicateParameter(String),
	/// A wildcard appears before the last segment.
	#[error("Wildcard must be the last segment of pattern '{0}'")]
	WildcardNotLast(String),
}

/// Error type for building a path from a named route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReverseError {
	/// No route is registered under this name.
	#[error("Invalid route name: {0}")]
	InvalidRouteName(String),
	/// A placeholder has no value, or an empty one, in the supplied parameters.
	#[error("Missing parameter: {0}")]
	MissingParameter(String),
}
