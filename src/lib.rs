//! # Compass
//!
//! Client-side routing for single-page applications.
//!
//! Compass selects which declared route is active for the current address,
//! keeps a navigation history in step with the host environment, and
//! publishes the current path, query and hash as reactive streams.
//!
//! ## Feature Flags
//!
//! - `router` (default) - The full router: navigation history, reactive
//!   location store, route bindings. Enables `urls`.
//! - `urls` - Path codec, route patterns and route matching only.
//!
//! ## Crates
//!
//! - [`reactive`] (`compass-core`) - `Readable` / `Writable` stores with
//!   cold-start delivery and batched notification.
//! - [`urls`] (`compass-urls`) - `path_to_array`, `PathPattern`,
//!   `RouteMatcher`.
//! - [`router`] (`compass-router`) - `Router`, `Route`, history backends.
//!
//! ## Quick Example
//!
//! ```
//! use compass::prelude::*;
//!
//! let router = Router::new(MemoryHistory::new());
//! let home = router.register(Route::new("/")).unwrap();
//! let fallback = router.register(Route::not_found()).unwrap();
//!
//! router.push("/missing?ref=nav").unwrap();
//!
//! assert!(!home.is_active());
//! assert!(fallback.is_active());
//! assert_eq!(router.query().get(), "ref=nav");
//! assert_eq!(path_to_array("/a/b%20c"), vec!["a", "b c"]);
//! ```

#[cfg(feature = "router")]
pub use compass_core::reactive;

#[cfg(feature = "urls")]
pub use compass_urls as urls;

#[cfg(feature = "router")]
pub use compass_router as router;

#[cfg(feature = "urls")]
pub use compass_urls::{
	PathPattern, PatternError, ReverseError, RouteId, RouteMatch, RouteMatcher, ScopeId,
	canonicalize, normalize, path_to_array,
};

#[cfg(feature = "router")]
pub use compass_core::reactive::{ReadOnly, Readable, Subscription, Writable, batch};

#[cfg(feature = "router")]
pub use compass_router::{
	Click, ConfigError, HistoryBackend, HistoryError, Link, LinkOutcome, Location, MemoryHistory,
	NavigationOutcome, Redirect, Route, RouteHandle, Router, RouterError, RouterOptions,
	RouterOptionsPatch, ScopeHandle,
};

#[cfg(all(feature = "router", target_arch = "wasm32"))]
pub use compass_router::BrowserHistory;

/// Commonly used types.
pub mod prelude {
	#[cfg(feature = "urls")]
	pub use crate::{RouteId, RouteMatch, ScopeId, path_to_array};

	#[cfg(feature = "router")]
	pub use crate::{
		Link, Location, MemoryHistory, NavigationOutcome, Readable, Route, RouteHandle, Router,
		RouterError, RouterOptions, RouterOptionsPatch,
	};

	#[cfg(all(feature = "router", target_arch = "wasm32"))]
	pub use crate::BrowserHistory;
}
