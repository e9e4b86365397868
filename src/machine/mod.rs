//! The state machine core.
//!
//! Construction happens on [`MutableMachine`] (node store + cursor set +
//! conflict policy); [`compile`](MutableMachine::compile) minimizes and
//! freezes it into a read-only [`Machine`].
//!
//! # Module organization
//!
//! - `node`: states, the input alphabet, terminal payloads
//! - `store`: the arena the states live in
//! - `cursors`: the set of open insertion points
//! - `builder`: the mutable machine and its primitive writers
//! - `splice`: pattern combinators and the non-ambiguous link procedure
//! - `optimize`: the minimizer
//! - `query`: the frozen machine and its queries
//! - `shared`: lock-free shared handle with rebuild-and-swap updates

mod builder;
mod cursors;
mod node;
mod optimize;
mod query;
mod shared;
mod splice;
mod store;

pub use builder::{Conflict, MutableMachine, MutableRegex};
pub use cursors::Cursors;
pub use node::{byte_key, Acceptance, Input, StateId, BYTE_KEYSPACE, KEY_MASK};
pub use query::{FindAll, Machine, Match};
pub use shared::SharedMachine;

#[cfg(test)]
mod tests;
