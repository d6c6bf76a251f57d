//! Error types for the router.

use compass_urls::{PatternError, ReverseError};

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// No route is registered under this name.
	#[error("Invalid route name: {0}")]
	InvalidRouteName(String),
	/// A pattern placeholder has no value.
	#[error("Missing parameter: {0}")]
	MissingParameter(String),
	/// A route or scope pattern failed to compile.
	#[error("Invalid route pattern: {0}")]
	InvalidPattern(#[from] PatternError),
	/// The history backend rejected an operation.
	#[error("Navigation failed: {0}")]
	NavigationFailed(String),
}

impl From<ReverseError> for RouterError {
	fn from(err: ReverseError) -> Self {
		match err {
			ReverseError::InvalidRouteName(name) => Self::InvalidRouteName(name),
			ReverseError::MissingParameter(param) => Self::MissingParameter(param),
		}
	}
}

/// Error type for history backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
	/// The environment has no history object (e.g. no `window`).
	#[error("History API unavailable: {0}")]
	Unavailable(String),
	/// The environment threw while performing the operation.
	#[error("History operation '{operation}' failed: {message}")]
	Operation {
		/// Name of the failing operation.
		operation: &'static str,
		/// Message reported by the environment.
		message: String,
	},
}

impl From<HistoryError> for RouterError {
	fn from(err: HistoryError) -> Self {
		Self::NavigationFailed(err.to_string())
	}
}

/// Error type for loading [`RouterOptions`](crate::options::RouterOptions).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The options file could not be read.
	#[error("Failed to read router options: {0}")]
	Io(#[from] std::io::Error),
	/// The options document is not valid TOML or has wrong types.
	#[error("Failed to parse router options: {0}")]
	Parse(#[from] toml::de::Error),
}
