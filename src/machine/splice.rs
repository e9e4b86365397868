//! The splice engine: combining one machine into another.
//!
//! A sub-pattern is spliced in two moves. `copy_in_except_root` copies every
//! non-root pattern state into the host store at a fixed offset. The pattern
//! root's transitions are then replayed into each cursor through the
//! non-ambiguous `link` procedure, which resolves collisions with whatever
//! already leaves those cursors by cloning the obstructing subtree, never
//! by mutating the linked-to node. Cycles introduced by star-closure are the
//! reason for most of the care here.

use std::fmt;

use log::trace;
use rustc_hash::FxHashMap;

use super::builder::{Conflict, MutableMachine, MutableRegex};
use super::cursors::Cursors;
use super::node::{Input, Node, StateId};

/// Result of copying a pattern into the host store.
pub(crate) struct CopyIn {
    /// Pattern id → host id, for every non-root pattern state.
    pub mapping: FxHashMap<StateId, StateId>,
    /// Host ids of copied states that were accepting in the pattern.
    pub terminals: Vec<StateId>,
}

impl<V: Clone + PartialEq + fmt::Debug> MutableMachine<V> {
    /// Splice `pattern` in at the current cursors. The new cursor set is the
    /// pattern's accept points (plus any clones of them minted while
    /// resolving collisions).
    pub fn match_pattern(&mut self, pattern: &MutableRegex) -> &mut Self {
        let copied = self.copy_in_except_root(pattern);
        let mut terminals = copied.terminals;

        let root_transitions = remapped_root_transitions(pattern, &copied.mapping);
        for cur in self.cursors.clone().iter() {
            for &(key, to) in &root_transitions {
                let minted = self.link(cur, key, to, &terminals);
                terminals.extend(minted);
            }
        }

        self.cursors = terminals.into_iter().collect();
        self
    }

    /// Optionally splice `pattern` in: the previous cursors stay open as the
    /// accept points of the skipped branch.
    pub fn match_optionally(&mut self, pattern: &MutableRegex) -> &mut Self {
        let before = self.cursors.clone();
        self.match_pattern(pattern);
        self.cursors.extend(before.iter());
        self
    }

    /// Splice `pattern` in one-or-more times.
    pub fn match_many(&mut self, pattern: &MutableRegex) -> &mut Self {
        self.match_pattern(pattern).match_many_optionally(pattern)
    }

    /// Splice `pattern` in zero-or-more times (Kleene star).
    ///
    /// The copied pattern is turned into a cycle by replaying the pattern
    /// root's transitions onto each copied accept point, then made reachable
    /// by replaying them onto the pre-existing cursors. Both the pre-cursors
    /// (zero matches) and the accept points (one or more) stay open.
    pub fn match_many_optionally(&mut self, pattern: &MutableRegex) -> &mut Self {
        let before = self.cursors.clone();

        let copied = self.copy_in_except_root(pattern);
        let root_transitions = remapped_root_transitions(pattern, &copied.mapping);

        for &terminal in &copied.terminals {
            for &(key, to) in &root_transitions {
                self.link(terminal, key, to, &[]);
            }
        }
        for cur in before.iter() {
            for &(key, to) in &root_transitions {
                self.link(cur, key, to, &[]);
            }
        }

        let mut cursors: Cursors = before;
        cursors.extend(copied.terminals);
        self.cursors = cursors;
        self
    }

    /// Copy every non-root state of `pattern` into this store, rewriting
    /// internal transitions by the id offset.
    ///
    /// Pattern payloads are *not* carried over (the host's payload type may
    /// differ); accepting states surface only through the returned
    /// `terminals` and are expected to be marked by a later payload writer.
    pub(crate) fn copy_in_except_root(&mut self, pattern: &MutableRegex) -> CopyIn {
        let offset = self.store.len() as u32 - 1;
        let mut mapping = FxHashMap::default();
        let mut terminals = Vec::new();

        for (id, node) in pattern.store.iter() {
            if id == StateId::ROOT {
                continue;
            }
            let mapped = StateId::from_raw(id.raw() + offset);
            mapping.insert(id, mapped);
            if node.payload.is_some() {
                terminals.push(mapped);
            }

            let mut copy: Node<V> = Node::new();
            node.each_transition(|key, to| {
                if to == StateId::ROOT {
                    panic!(
                        "pattern state {:?} transitions into the pattern root; \
                         such patterns cannot be spliced",
                        id
                    );
                }
                copy.set_transition(key, StateId::from_raw(to.raw() + offset));
            });
            let pushed = self.store.push(copy);
            debug_assert_eq!(pushed, mapped);
        }

        CopyIn { mapping, terminals }
    }

    /// Ensure `from --input--> to` holds without breaking determinism and
    /// without mutating the node at `to`.
    ///
    /// If `from` already transitions elsewhere on `input`, a fresh state is
    /// minted as a clone of the obstructing target and the two subtrees are
    /// merged into it, recursing where they collide again. Clones standing
    /// in for any state in `watch` are returned so callers can track which
    /// new states correspond to former accept points.
    pub(crate) fn link(
        &mut self,
        from: StateId,
        input: Input,
        to: StateId,
        watch: &[StateId],
    ) -> Vec<StateId> {
        let mut resolving = Vec::new();
        self.link_inner(from, input, to, watch, &mut resolving)
    }

    fn link_inner(
        &mut self,
        from: StateId,
        input: Input,
        to: StateId,
        watch: &[StateId],
        resolving: &mut Vec<(StateId, StateId)>,
    ) -> Vec<StateId> {
        if to.is_none() {
            panic!("tried to link to the null state");
        }
        if from.is_none() {
            panic!("tried to link from the null state");
        }

        let existing = self.store.get(from).transition(input);
        if existing.is_none() {
            self.store.get_mut(from).set_transition(input, to);
            return Vec::new();
        }
        if existing == to {
            return Vec::new();
        }

        if resolving.contains(&(existing, to)) {
            panic!(
                "unsupported cyclic overlay: resolving {:?} against {:?} on {} \
                 re-enters itself; the patterns are ambiguous",
                existing, to, input
            );
        }
        resolving.push((existing, to));
        trace!("link: cloning {:?} to merge in {:?} via {}", existing, to, input);

        // The fresh state starts as a clone of the obstructing target, with
        // the clone's self-loops pointing at itself rather than the original.
        let minted = self.store.next_id();
        let mut clone = self.store.get(existing).clone();
        clone.each_transition_mut(|_, t| {
            if *t == existing {
                *t = minted;
            }
        });
        let pushed = self.store.push(clone);
        debug_assert_eq!(pushed, minted);

        let mut tracked = Vec::new();
        if watch.contains(&to) || watch.contains(&existing) {
            tracked.push(minted);
        }

        // Payload propagation from the linked-to node.
        if let Some(attempted) = self.store.get(to).payload.clone() {
            let policy = self.on_conflict;
            let write = match &self.store.get(minted).payload {
                None => true,
                Some(existing_payload) if *existing_payload == attempted => false,
                Some(existing_payload) => match policy {
                    Conflict::Skip => false,
                    Conflict::Overwrite => true,
                    Conflict::Error => panic!(
                        "conflicting payloads while linking {:?} -> {:?} via {}: \
                         {:?} vs {:?}",
                        from, to, input, existing_payload, attempted
                    ),
                },
            };
            if write {
                self.store.get_mut(minted).payload = Some(attempted);
            }
        }

        // Merge the target's transitions into the clone. Every slot is
        // considered, because the rules below also fire when one side is
        // absent. The cycle-intent rules keep a clone of a self-looping
        // state behaving like the original it replaces.
        for slot in 0..super::node::SLOT_COUNT {
            let key = Input::from_slot(slot);
            let theirs = self.store.get(to).transition(key);
            let ours = self.store.get(minted).transition(key);

            if ours == minted && theirs.is_none() {
                // The clone loops but the target has nothing here: point the
                // loop back at the original so its cycle intent survives.
                self.store.get_mut(minted).set_transition(key, existing);
            } else if theirs == to && ours.is_none() {
                // The target loops but the clone has nothing: adopt the loop,
                // expressed against the original.
                self.store.get_mut(minted).set_transition(key, existing);
            } else if theirs == to && ours == minted {
                // Both loop; the clone's self-loop already covers it.
            } else if theirs.is_none() {
                // Nothing to merge.
            } else {
                let minted_more = self.link_inner(minted, key, theirs, watch, resolving);
                tracked.extend(minted_more);
            }
        }

        self.store.get_mut(from).set_transition(input, minted);
        resolving.pop();
        tracked
    }
}

fn remapped_root_transitions(
    pattern: &MutableRegex,
    mapping: &FxHashMap<StateId, StateId>,
) -> Vec<(Input, StateId)> {
    let mut out = Vec::new();
    pattern.store.get(StateId::ROOT).each_transition(|key, to| {
        out.push((key, mapping[&to]));
    });
    out
}
