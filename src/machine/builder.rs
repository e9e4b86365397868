//! The mutable machine and its primitive writers.
//!
//! `MutableMachine<V>` is the construction handle: a node store, the cursor
//! set, and the conflict policy. Writers mutate the graph at the cursors;
//! the splice combinators live in `splice.rs`, the minimizer in
//! `optimize.rs`, and queries on the frozen handle in `query.rs`.

use std::fmt;

use super::cursors::Cursors;
use super::node::{Acceptance, Input, Node, StateId};
use super::store::NodeStore;

/// What a writer does when it would overwrite an existing payload or an
/// existing `Default` transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Conflict {
    /// Abort construction with a diagnostic.
    #[default]
    Error,
    /// Keep the existing value.
    Skip,
    /// Replace it.
    Overwrite,
}

/// A state machine under construction.
///
/// The root is always id 1 and the initial cursor set is `{root}`. Writers
/// return `&mut Self` so construction chains:
///
/// ```
/// use regex_table::MutableRegex;
///
/// let mut rg = MutableRegex::new();
/// rg.match_literal("ab").terminal().goback();
/// let rg = rg.compile();
/// assert!(rg.is_match("ab"));
/// ```
#[derive(Clone)]
pub struct MutableMachine<V> {
    pub(crate) store: NodeStore<V>,
    pub(crate) cursors: Cursors,
    pub(crate) on_conflict: Conflict,
}

/// A value-less machine: the payload is the bare accepting flag. Patterns
/// handed to the splice combinators are always this type.
pub type MutableRegex = MutableMachine<()>;

impl<V: Clone + PartialEq + fmt::Debug> MutableMachine<V> {
    pub fn new() -> Self {
        let mut store = NodeStore::new();
        store.new_state();
        MutableMachine {
            store,
            cursors: Cursors::at_root(),
            on_conflict: Conflict::Error,
        }
    }

    /// Select the conflict policy for subsequent writes.
    pub fn conflict(&mut self, policy: Conflict) -> &mut Self {
        self.on_conflict = policy;
        self
    }

    /// Reset the cursors to the root.
    pub fn goback(&mut self) -> &mut Self {
        self.cursors.reset_to_root();
        self
    }

    /// Snapshot the current cursor set.
    pub fn cursors(&self) -> Cursors {
        self.cursors.clone()
    }

    /// Restore a cursor set captured earlier with [`cursors`](Self::cursors).
    ///
    /// Ids must address live states of this machine; snapshots do not
    /// survive `optimize()`.
    pub fn set_cursors(&mut self, cursors: Cursors) -> &mut Self {
        for id in cursors.iter() {
            if !self.store.contains(id) {
                panic!(
                    "cursor {:?} does not address a state of this machine ({} states)",
                    id,
                    self.store.len()
                );
            }
        }
        self.cursors = cursors;
        self
    }

    /// Number of states currently in the store, nullified ones included.
    pub fn state_count(&self) -> usize {
        self.store.len()
    }

    /// Consume a literal ASCII byte sequence. The empty literal leaves the
    /// cursors in place (useful for marking the root accepting).
    pub fn match_literal(&mut self, seq: &str) -> &mut Self {
        for &b in ascii_bytes(seq, "match_literal") {
            self.cursor_transition(Input::Byte(b));
        }
        self
    }

    /// Consume exactly one of the given ASCII bytes.
    pub fn match_any_of(&mut self, options: &str) -> &mut Self {
        let bytes = ascii_bytes(options, "match_any_of");
        if bytes.is_empty() {
            panic!("match_any_of requires at least one byte");
        }
        let snapshot = self.cursors.clone();
        let mut union = Cursors::empty();
        for &b in bytes {
            self.cursors = snapshot.clone();
            self.cursor_transition(Input::Byte(b));
            union.extend(self.cursors.iter());
        }
        self.cursors = union;
        self
    }

    /// Transition on the end-of-input sentinel.
    pub fn match_eof(&mut self) -> &mut Self {
        self.cursor_transition(Input::Eof);
        self
    }

    /// Wildcard transition out of the current cursors: consulted at query
    /// time for any byte with no concrete transition. Collisions with an
    /// existing wildcard follow the conflict policy.
    pub fn match_default(&mut self) -> &mut Self {
        let fresh = self.store.new_state();
        let mut new_cursors = Cursors::empty();
        new_cursors.push(fresh);

        let policy = self.on_conflict;
        for cur in self.cursors.clone().iter() {
            let existing = self.store.get(cur).transition(Input::Default);
            if existing.is_none() {
                self.store.get_mut(cur).set_transition(Input::Default, fresh);
            } else {
                match policy {
                    Conflict::Skip => new_cursors.push(existing),
                    Conflict::Overwrite => {
                        self.store.get_mut(cur).set_transition(Input::Default, fresh)
                    }
                    Conflict::Error => panic!(
                        "conflicting wildcard at state {:?}: \
                         existing default {:?} would be replaced by {:?}",
                        cur, existing, fresh
                    ),
                }
            }
        }
        self.cursors = new_cursors;
        self
    }

    /// Attach `value` at the cursors, then reset them to the root.
    pub fn commit(&mut self, value: V) -> &mut Self {
        self.write_payload(value, 0);
        self.cursors.reset_to_root();
        self
    }

    /// Like [`commit`](Self::commit), with a lookahead give-back.
    pub fn commit_back(&mut self, value: V, back_by: usize) -> &mut Self {
        self.write_payload(value, back_by);
        self.cursors.reset_to_root();
        self
    }

    /// Attach `value` at the cursors and keep them.
    pub fn commit_continue(&mut self, value: V) -> &mut Self {
        self.write_payload(value, 0);
        self
    }

    /// Like [`commit_continue`](Self::commit_continue), with a lookahead
    /// give-back.
    pub fn commit_continue_back(&mut self, value: V, back_by: usize) -> &mut Self {
        self.write_payload(value, back_by);
        self
    }

    /// The cursor-transition step shared by every consuming writer.
    ///
    /// Cursors are split into those that already transition on `input` and
    /// those that do not; the latter all point at one freshly allocated
    /// state. Identical prefixes written from the root collapse on their
    /// own because of this.
    pub(crate) fn cursor_transition(&mut self, input: Input) {
        let mut lacking: Vec<StateId> = Vec::new();
        let mut present: Vec<StateId> = Vec::new();

        for cur in self.cursors.iter() {
            let target = self.store.get(cur).transition(input);
            if target.is_none() {
                lacking.push(cur);
            } else {
                present.push(target);
            }
        }

        let mut new_cursors = Cursors::empty();
        if !lacking.is_empty() {
            let fresh = self.store.new_state();
            for cur in lacking {
                self.store.get_mut(cur).set_transition(input, fresh);
            }
            new_cursors.push(fresh);
        }
        new_cursors.extend(present);
        self.cursors = new_cursors;
    }

    /// Mark every distinct cursor accepting. Writing a payload equal to the
    /// existing one is a no-op; a differing payload goes through the
    /// conflict policy.
    pub(crate) fn write_payload(&mut self, value: V, back_by: usize) {
        let policy = self.on_conflict;
        let mut seen: Vec<StateId> = Vec::new();

        for cur in self.cursors.clone().iter() {
            if seen.contains(&cur) {
                continue;
            }
            seen.push(cur);

            let attempted = Acceptance {
                value: value.clone(),
                back_by,
            };
            let write = match &self.store.get(cur).payload {
                None => true,
                Some(existing) if *existing == attempted => false,
                Some(existing) => match policy {
                    Conflict::Skip => false,
                    Conflict::Overwrite => true,
                    Conflict::Error => panic!(
                        "conflicting payload at state {:?}: existing {:?} (back_by {}) \
                         would be replaced by {:?} (back_by {}); \
                         change the policy with conflict() if this is intended",
                        cur, existing.value, existing.back_by, attempted.value, attempted.back_by
                    ),
                },
            };
            if write {
                self.store.get_mut(cur).payload = Some(attempted);
            }
        }
    }

    pub(crate) fn node(&self, id: StateId) -> &Node<V> {
        self.store.get(id)
    }
}

impl MutableRegex {
    /// Mark every current cursor accepting.
    pub fn terminal(&mut self) -> &mut Self {
        self.write_payload((), 0);
        self
    }

    /// Mark every current cursor accepting with a lookahead give-back: on
    /// accept, the last `back_by` consumed inputs are handed back to prefix
    /// queries.
    pub fn terminal_back(&mut self, back_by: usize) -> &mut Self {
        self.write_payload((), back_by);
        self
    }
}

impl<V: Clone + PartialEq + fmt::Debug> Default for MutableMachine<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural equality over the node stores; cursor sets and policies are
/// construction scaffolding and do not participate.
impl<V: PartialEq> PartialEq for MutableMachine<V> {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store
    }
}

impl<V: fmt::Debug> fmt::Debug for MutableMachine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, node) in self.store.iter() {
            write!(f, "{:?}", id)?;
            if let Some(p) = &node.payload {
                write!(f, " (terminal {:?} back {})", p.value, p.back_by)?;
            }
            if self.cursors.contains(id) {
                write!(f, " [cursor]")?;
            }
            if node.is_null() {
                write!(f, " NULL")?;
            }
            writeln!(f, " >>")?;
            for (key, to) in node.transitions() {
                writeln!(f, " |  {} -> {:?}", key, to)?;
            }
        }
        Ok(())
    }
}

fn ascii_bytes<'a>(s: &'a str, who: &str) -> &'a [u8] {
    if !s.is_ascii() {
        panic!(
            "{} requires ASCII input (got {:?}); use Utf8Machine for Unicode alphabets",
            who, s
        );
    }
    s.as_bytes()
}
