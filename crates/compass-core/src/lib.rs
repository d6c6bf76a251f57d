//! # Compass Core
//!
//! Reactive store primitives shared by the Compass routing crates.
//!
//! The router publishes its location state through [`reactive::Readable`]
//! stores. A store delivers its current value synchronously to every new
//! subscriber and then re-delivers on every change, so UI bindings never
//! have to special-case the first render.
//!
//! ## Example
//!
//! ```
//! use compass_core::reactive::{Readable, Writable};
//!
//! let count = Writable::new(0);
//! let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let subscription = count.subscribe(move |v: &i32| sink.borrow_mut().push(*v));
//!
//! count.set(1);
//! subscription.unsubscribe();
//! count.set(2);
//!
//! assert_eq!(*seen.borrow(), vec![0, 1]);
//! ```

pub mod reactive;

pub use reactive::{ReadOnly, Readable, Subscription, Writable, batch};
