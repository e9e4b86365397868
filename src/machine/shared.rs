//! Shared handle for concurrent querying with occasional rebuilds.
//!
//! Readers take lock-free snapshots of the current frozen machine; updates
//! serialize on a mutex around the builder, recompile, and atomically swap
//! the snapshot in. Readers mid-query keep the machine they loaded.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use super::builder::MutableMachine;
use super::query::Machine;

/// A concurrently queryable machine that can be rebuilt behind the backs of
/// its readers.
pub struct SharedMachine<V> {
    current: ArcSwap<Machine<V>>,
    builder: Mutex<MutableMachine<V>>,
}

impl<V: Clone + PartialEq + fmt::Debug> SharedMachine<V> {
    pub fn new() -> Self {
        Self::from_builder(MutableMachine::new())
    }

    /// Freeze `builder`'s current contents as the first snapshot and keep
    /// the builder for later updates.
    pub fn from_builder(builder: MutableMachine<V>) -> Self {
        let frozen = builder.clone().compile();
        SharedMachine {
            current: ArcSwap::from_pointee(frozen),
            builder: Mutex::new(builder),
        }
    }

    /// The current frozen machine. Cheap, lock-free, and stable for as long
    /// as the caller holds the `Arc`.
    pub fn snapshot(&self) -> Arc<Machine<V>> {
        self.current.load_full()
    }

    /// Mutate the underlying builder, then recompile and publish the result
    /// atomically. Updates serialize; readers never block.
    pub fn update(&self, mutate: impl FnOnce(&mut MutableMachine<V>)) {
        let mut builder = self.builder.lock();
        mutate(&mut builder);
        let frozen = builder.clone().compile();
        self.current.store(Arc::new(frozen));
    }
}

impl<V: Clone + PartialEq + fmt::Debug> Default for SharedMachine<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for SharedMachine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMachine")
            .field("states", &self.current.load().state_count())
            .finish()
    }
}
