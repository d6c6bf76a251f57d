//! # Compass Router
//!
//! Client-side routing for single-page applications.
//!
//! ## Architecture
//!
//! - [`location`]: the router's view of an address and browser-style href
//!   resolution.
//! - [`history`]: the [`HistoryBackend`] seam over the environment's
//!   session history, with [`MemoryHistory`] for native targets and tests
//!   and `BrowserHistory` on `wasm32`.
//! - [`navigation`]: the router's own entry stack and the reload decision.
//! - [`store`]: path, query and hash as reactive streams.
//! - [`route`] and [`router`]: route bindings and the [`Router`] service.
//! - [`components`]: link and redirect helpers for UI hosts.
//!
//! ## Conventions
//!
//! - `query` and `hash` are published without `?` / `#`.
//! - `path` is published in canonical form (see
//!   [`compass_urls::path::normalize`]).
//! - With `reload_prevent` set, nothing reloads: same-origin paths
//!   outside `base` are navigated in place and other origins are dropped.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use compass_core::reactive::Readable;
//! use compass_router::{MemoryHistory, Route, Router};
//!
//! let router = Router::new(MemoryHistory::new());
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = seen.clone();
//! router
//!     .register(Route::new("/posts/{slug}").on_match(move |m| {
//!         sink.borrow_mut().push(m.params["slug"].clone());
//!     }))
//!     .unwrap();
//! router.register(Route::not_found()).unwrap();
//!
//! router.push("/posts/hello").unwrap();
//! router.push("/posts/world#comments").unwrap();
//!
//! assert_eq!(*seen.borrow(), vec!["hello", "world"]);
//! assert_eq!(router.hash().get(), "comments");
//! ```

pub mod components;
pub mod error;
pub mod history;
pub mod location;
pub mod navigation;
pub mod options;
pub mod route;
pub mod router;
pub mod store;

pub use components::{Click, Link, LinkOutcome, Redirect};
pub use error::{ConfigError, HistoryError, RouterError};
pub use history::{HistoryBackend, MemoryHistory, PoppedEntry};
pub use location::Location;
pub use navigation::{HistoryEntry, NavigationHistory, NavigationKind};
pub use options::{RouterOptions, RouterOptionsPatch};
pub use route::{Route, RouteHandle};
pub use router::{NavigationOutcome, Router, ScopeHandle};
pub use store::LocationStore;

#[cfg(target_arch = "wasm32")]
pub use history::BrowserHistory;

pub use compass_urls::path::path_to_array;
pub use compass_urls::{RouteId, RouteMatch, ScopeId};
