//! Navigation helpers for UI hosts.
//!
//! The host framework renders anchors itself; these types hold the
//! routing-relevant attributes and decide what a click should do.

use crate::error::RouterError;
use crate::router::{NavigationOutcome, Router};

/// Modifier and button state of a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Click {
	/// Mouse button, `0` for the primary one.
	pub button: i16,
	/// Ctrl held.
	pub ctrl: bool,
	/// Meta (Cmd) held.
	pub meta: bool,
	/// Shift held.
	pub shift: bool,
	/// Alt held.
	pub alt: bool,
}

impl Click {
	/// A plain primary-button click.
	pub fn primary() -> Self {
		Self::default()
	}

	/// Returns whether the environment should handle this click (new tab,
	/// new window, download, context button).
	pub fn is_modified(&self) -> bool {
		self.button != 0 || self.ctrl || self.meta || self.shift || self.alt
	}
}

/// What activating a link did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
	/// The router handled the navigation.
	Navigated(NavigationOutcome),
	/// The router stayed out; the environment's default applies.
	Passthrough,
}

/// A link that navigates without a full reload.
///
/// # Example
///
/// ```
/// use compass_router::components::{Click, Link, LinkOutcome};
/// use compass_router::{MemoryHistory, NavigationOutcome, Router};
///
/// let router = Router::new(MemoryHistory::new());
/// let link = Link::new("/users/42");
///
/// let outcome = link.activate(&router, Click::primary()).unwrap();
///
/// assert_eq!(outcome, LinkOutcome::Navigated(NavigationOutcome::Navigated));
/// assert_eq!(router.location().path, "/users/42");
/// ```
#[derive(Debug, Clone)]
pub struct Link {
	/// The destination href.
	to: String,
	/// Whether to replace the current history entry.
	replace: bool,
	/// Whether the environment handles this link.
	external: bool,
	/// Browsing context (`target` attribute), if any.
	target: Option<String>,
}

impl Link {
	/// Creates a link to `to`.
	pub fn new(to: impl Into<String>) -> Self {
		Self {
			to: to.into(),
			replace: false,
			external: false,
			target: None,
		}
	}

	/// Sets whether to replace the current history entry.
	pub fn replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}

	/// Sets whether this is an external link.
	pub fn external(mut self, external: bool) -> Self {
		self.external = external;
		self
	}

	/// Sets the browsing context.
	pub fn target(mut self, target: impl Into<String>) -> Self {
		self.target = Some(target.into());
		self
	}

	/// Returns the destination href.
	pub fn to(&self) -> &str {
		&self.to
	}

	/// Returns whether this is a replace navigation.
	pub fn is_replace(&self) -> bool {
		self.replace
	}

	/// Returns whether this is an external link.
	pub fn is_external(&self) -> bool {
		self.external
	}

	/// Returns whether the router should intercept `click`.
	pub fn intercepts(&self, click: Click) -> bool {
		let same_context = self.target.as_deref().is_none_or(|target| target == "_self");
		!self.external && same_context && !click.is_modified()
	}

	/// Handles a click on this link.
	///
	/// When the router intercepts, the host must cancel the environment's
	/// default action.
	pub fn activate(&self, router: &Router, click: Click) -> Result<LinkOutcome, RouterError> {
		if !self.intercepts(click) {
			tracing::trace!(to = %self.to, "link left to the environment");
			return Ok(LinkOutcome::Passthrough);
		}
		let outcome = if self.replace {
			router.replace(&self.to)?
		} else {
			router.push(&self.to)?
		};
		Ok(LinkOutcome::Navigated(outcome))
	}
}

/// A redirect performed as soon as it is rendered.
#[derive(Debug, Clone)]
pub struct Redirect {
	/// The destination href.
	to: String,
	/// Whether to replace the current history entry.
	replace: bool,
}

impl Redirect {
	/// Creates a redirect to `to`; it replaces the current entry by default.
	pub fn new(to: impl Into<String>) -> Self {
		Self {
			to: to.into(),
			replace: true,
		}
	}

	/// Sets whether to replace the current history entry.
	pub fn replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}

	/// Returns the destination href.
	pub fn to(&self) -> &str {
		&self.to
	}

	/// Performs the redirect.
	pub fn perform(&self, router: &Router) -> Result<NavigationOutcome, RouterError> {
		if self.replace {
			router.replace(&self.to)
		} else {
			router.push(&self.to)
		}
	}
}
