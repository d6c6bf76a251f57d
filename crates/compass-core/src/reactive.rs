//! Reactive stores.
//!
//! - [`Writable`]: a value holder that notifies subscribers on change.
//! - [`ReadOnly`]: a read-only view over a [`Writable`].
//! - [`Readable`]: the subscribe/get contract both implement.
//! - [`batch`]: groups several writes so subscribers only run once the
//!   whole group has been applied.
//!
//! Stores are single-threaded (`Rc` based). Notifications are dispatched
//! through a per-thread queue, so a subscriber that writes to a store is
//! never re-entered; its write is delivered after the current round.

mod runtime;
mod store;
mod subscription;

pub use runtime::{NodeId, batch, is_batching};
pub use store::{ReadOnly, Readable, Writable};
pub use subscription::Subscription;
