#![forbid(unsafe_code)]

//! Array state: an ordered collection with structural mutations and change
//! notification.
//!
//! # Role in FrankenTUI
//! `ftui-array-state` holds list-shaped model state (tags, todo items,
//! selections) behind a small, fixed vocabulary of mutations. Views read an
//! immutable snapshot after each call; hosts hook persistence or telemetry
//! onto the change callback.
//!
//! # Primary responsibilities
//! - **ArrayState**: the controller. Copy-on-write snapshots, version
//!   counter, no-op suppression.
//! - **ArrayStateOptions**: construction-time initial value and change hook.
//! - **Subscription**: RAII guard for additional change listeners.
//! - **index**: signed splice/slice position normalization.
//! - **persistence** (feature `state-persistence`): JSON snapshot codec.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use ftui_array_state::{ArrayState, ArrayStateOptions};
//!
//! let changes = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&changes);
//! let tags = ArrayState::with_options(
//!     ArrayStateOptions::new()
//!         .with_initial_value(["rust", "tui"])
//!         .with_on_change(move |_: &[&str]| counter.set(counter.get() + 1)),
//! );
//!
//! tags.push(["async"]);
//! tags.remove(10); // out of range: no-op
//! tags.filter(|_, _| true); // keeps everything: no-op
//! assert_eq!(tags.len(), 3);
//! assert_eq!(changes.get(), 1);
//! ```

pub mod array_state;
pub mod index;
pub mod notify;
pub mod options;

#[cfg(feature = "state-persistence")]
pub mod persistence;

pub use array_state::{ArrayState, Snapshot};
pub use notify::{ChangeCallback, Subscription};
pub use options::ArrayStateOptions;

#[cfg(feature = "state-persistence")]
pub use persistence::{ArrayPersistState, PERSIST_FORMAT, PersistError};
