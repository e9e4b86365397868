//! The minimizer.
//!
//! `optimize()` rewrites the node store in place: null-reference
//! propagation, duplicate-state merging, orphan pruning, and a final
//! compaction that renumbers the survivors densely. Construction ids do not
//! survive it; the cursor set is reset to the root.

use std::fmt;

use log::debug;

use super::builder::MutableMachine;
use super::node::{Node, StateId, SLOT_COUNT};

impl<V: Clone + PartialEq + fmt::Debug> MutableMachine<V> {
    /// Reduce the machine: merge equivalent states, drop unreachable and
    /// empty ones, compact ids. Runs the passes to a fixed point and resets
    /// the cursors to the root.
    pub fn optimize(&mut self) -> &mut Self {
        let before = self.store.len();

        loop {
            self.nullify_nullrefs();
            if !self.merge_duplicates() {
                break;
            }
        }
        self.nullify_orphans();
        self.cursors.reset_to_root();
        self.compact();

        debug!("optimize: {} states -> {}", before, self.store.len());
        self
    }

    /// Zero out transitions into deletable states until nothing changes.
    ///
    /// A state is deletable when it has no payload, no outgoing transition,
    /// no cursor on it, and is not the root. Nullified states stay in the
    /// store (so ids remain valid) until compaction.
    fn nullify_nullrefs(&mut self) {
        let len = self.store.len();
        let mut nulls = vec![false; len];
        for (id, _) in self.store.iter() {
            if self.is_deletable(id) {
                nulls[id.index()] = true;
            }
        }

        loop {
            let mut newly_nulled = false;
            for i in 0..len {
                if nulls[i] {
                    continue;
                }
                let id = StateId::from_raw(i as u32 + 1);
                self.store.get_mut(id).each_transition_mut(|_, to| {
                    if nulls[to.index()] {
                        *to = StateId::NONE;
                    }
                });
                if self.is_deletable(id) {
                    nulls[i] = true;
                    newly_nulled = true;
                }
            }
            if !newly_nulled {
                break;
            }
        }
    }

    fn is_deletable(&self, id: StateId) -> bool {
        id != StateId::ROOT && !self.cursors.contains(id) && self.store.get(id).is_null()
    }

    /// Merge behaviorally equivalent states until a pass finds none.
    /// Returns whether any merge happened at all.
    fn merge_duplicates(&mut self) -> bool {
        let mut merged_any = false;
        while self.merge_duplicates_once() {
            merged_any = true;
        }
        merged_any
    }

    /// One reverse-order merge pass.
    ///
    /// Two states are equivalent when they agree on payload and on
    /// cursor-presence, and every input either transitions to the same
    /// target from both or self-loops on both. The self-loop clause is what
    /// lets independently minted star-body clones collapse. References to
    /// the older id are rewritten to the newer one; the older is nullified.
    fn merge_duplicates_once(&mut self) -> bool {
        let len = self.store.len();
        let mut cursor_flags = vec![false; len];
        for c in self.cursors.iter() {
            cursor_flags[c.index()] = true;
        }

        let mut merged = false;
        for i in (2..=len).rev() {
            let keep = StateId::from_raw(i as u32);
            if self.store.get(keep).is_null() && !cursor_flags[keep.index()] {
                continue;
            }

            let mut duplicates: Vec<StateId> = Vec::new();
            for j in 2..i {
                let other = StateId::from_raw(j as u32);
                if self.store.get(other).is_null() && !cursor_flags[other.index()] {
                    continue;
                }
                if cursor_flags[other.index()] != cursor_flags[keep.index()] {
                    continue;
                }
                if self.equivalent(keep, other) {
                    duplicates.push(other);
                }
            }

            for old in duplicates {
                merged = true;
                for n in 1..=len {
                    let id = StateId::from_raw(n as u32);
                    self.store.get_mut(id).each_transition_mut(|_, to| {
                        if *to == old {
                            *to = keep;
                        }
                    });
                }
                self.store.get_mut(old).nullify();
                cursor_flags[old.index()] = false;
            }
        }

        if merged {
            self.cursors.retain(|c| cursor_flags[c.index()]);
        }
        merged
    }

    fn equivalent(&self, a: StateId, b: StateId) -> bool {
        let node_a = self.store.get(a);
        let node_b = self.store.get(b);
        if node_a.payload != node_b.payload {
            return false;
        }
        for slot in 0..SLOT_COUNT {
            let key = super::node::Input::from_slot(slot);
            let ta = node_a.transition(key);
            let tb = node_b.transition(key);
            let both_self_loops = ta == a && tb == b;
            if ta != tb && !both_self_loops {
                return false;
            }
        }
        true
    }

    /// Nullify everything forward-unreachable from the root and drop
    /// cursors that pointed there.
    fn nullify_orphans(&mut self) {
        let len = self.store.len();
        let mut reachable = vec![false; len];
        reachable[StateId::ROOT.index()] = true;

        let mut stack = vec![StateId::ROOT];
        while let Some(id) = stack.pop() {
            self.store.get(id).each_transition(|_, to| {
                if !reachable[to.index()] {
                    reachable[to.index()] = true;
                    stack.push(to);
                }
            });
        }

        for i in 0..len {
            if !reachable[i] {
                self.store.get_mut(StateId::from_raw(i as u32 + 1)).nullify();
            }
        }
        self.cursors.retain(|c| reachable[c.index()]);
    }

    /// Rebuild the store with only the live states, renumbering densely.
    /// Transitions into dropped states become null; cursors are remapped.
    fn compact(&mut self) {
        let len = self.store.len();
        let mut id_map = vec![StateId::NONE; len];
        let mut kept: Vec<Node<V>> = Vec::new();

        for (id, node) in self.store.iter() {
            if id == StateId::ROOT || !node.is_null() || self.cursors.contains(id) {
                kept.push(node.clone());
                id_map[id.index()] = StateId::from_raw(kept.len() as u32);
            }
        }

        self.store.replace_all(kept, &id_map);
        self.cursors.remap(|c| id_map[c.index()]);
    }
}
