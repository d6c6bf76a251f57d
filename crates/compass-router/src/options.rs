//! Router options.
//!
//! Options are plain data read on every navigation decision. They can be
//! built in code, loaded from TOML, and changed at runtime through
//! [`Router::set_options`](crate::Router::set_options) with a
//! [`RouterOptionsPatch`].
//!
//! ```toml
//! reload_prevent = true
//! base = "/app"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Navigation behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
	/// Never reload the environment. Same-origin paths outside `base` are
	/// then navigated in place; other origins are dropped.
	#[serde(alias = "reloadPrevent")]
	pub reload_prevent: bool,
	/// Path prefix the application lives under. Paths outside it reload
	/// the environment unless `reload_prevent` is set. Empty means `/`.
	pub base: String,
}

impl RouterOptions {
	/// Creates the default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `reload_prevent`.
	pub fn with_reload_prevent(mut self, reload_prevent: bool) -> Self {
		self.reload_prevent = reload_prevent;
		self
	}

	/// Sets `base`.
	pub fn with_base(mut self, base: impl Into<String>) -> Self {
		self.base = base.into();
		self
	}

	/// Applies the fields present in `patch`; absent fields keep their value.
	pub fn apply(&mut self, patch: &RouterOptionsPatch) {
		if let Some(reload_prevent) = patch.reload_prevent {
			self.reload_prevent = reload_prevent;
		}
		if let Some(base) = &patch.base {
			self.base.clone_from(base);
		}
	}

	/// Parses options from a TOML document.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(content)?)
	}

	/// Loads options from a TOML file.
	pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}
}

/// A partial update of [`RouterOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptionsPatch {
	/// New `reload_prevent`, if changing.
	#[serde(alias = "reloadPrevent", skip_serializing_if = "Option::is_none")]
	pub reload_prevent: Option<bool>,
	/// New `base`, if changing.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub base: Option<String>,
}

impl RouterOptionsPatch {
	/// Creates an empty patch.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `reload_prevent`.
	pub fn reload_prevent(mut self, reload_prevent: bool) -> Self {
		self.reload_prevent = Some(reload_prevent);
		self
	}

	/// Sets `base`.
	pub fn base(mut self, base: impl Into<String>) -> Self {
		self.base = Some(base.into());
		self
	}

	/// Returns true if the patch changes nothing.
	pub fn is_empty(&self) -> bool {
		self.reload_prevent.is_none() && self.base.is_none()
	}
}
