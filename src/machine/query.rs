//! The frozen machine and its query engine.
//!
//! `compile()` runs the minimizer and returns a [`Machine`], which is
//! immutable: no writers, no cursors, safe to share across threads. Queries
//! walk the store only. Byte steps prefer the concrete transition and fall
//! back to the `Default` wildcard; the `Eof` sentinel never falls back.

use std::fmt;

use super::builder::MutableMachine;
use super::node::{Acceptance, StateId};
use super::store::NodeStore;

/// A finalized, immutable state machine.
#[derive(Clone, PartialEq)]
pub struct Machine<V> {
    store: NodeStore<V>,
}

/// One hit from [`Machine::find_first`] / [`Machine::find_all`]:
/// `text[begin..end]` matched, with the payload attached at the deepest
/// accepting state (after `back_by` give-back).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match<'a, V> {
    pub begin: usize,
    pub end: usize,
    pub value: &'a V,
}

impl<V: Clone + PartialEq + fmt::Debug> MutableMachine<V> {
    /// Optimize and freeze. The returned handle only reads.
    pub fn compile(mut self) -> Machine<V> {
        self.optimize();
        Machine { store: self.store }
    }
}

impl<V> Machine<V> {
    /// Walk the whole input; the payload of the landing state decides.
    pub fn matches(&self, s: &str) -> Option<&V> {
        let mut node = StateId::ROOT;
        for b in s.bytes() {
            let next = self.store.get(node).step(b);
            if next.is_none() {
                return None;
            }
            node = next;
        }
        self.payload_of(node)
    }

    /// Like [`matches`](Self::matches), but additionally consumes the
    /// end-of-input sentinel: the landing state must have an `Eof`
    /// transition, and the payload of *its* target decides.
    pub fn matches_eof(&self, s: &str) -> Option<&V> {
        let mut node = StateId::ROOT;
        for b in s.bytes() {
            let next = self.store.get(node).step(b);
            if next.is_none() {
                return None;
            }
            node = next;
        }
        let over = self.store.get(node).eof_step();
        if over.is_none() {
            return None;
        }
        self.payload_of(over)
    }

    /// Greedy prefix lookup: the longest prefix of `s` that is accepted.
    ///
    /// Returns the exclusive end offset (after `back_by` give-back) and the
    /// payload. The empty prefix counts when the root itself accepts.
    pub fn lookup(&self, s: &str) -> Option<(usize, &V)> {
        self.lookup_impl(s, false)
    }

    /// [`lookup`](Self::lookup) with the end-of-input sentinel appended:
    /// reaching the end of `s` may complete a match through an `Eof`
    /// transition.
    pub fn lookup_eof(&self, s: &str) -> Option<(usize, &V)> {
        self.lookup_impl(s, true)
    }

    fn lookup_impl(&self, s: &str, with_eof: bool) -> Option<(usize, &V)> {
        let mut best: Option<(usize, &Acceptance<V>)> = None;
        let mut node = StateId::ROOT;
        if let Some(p) = &self.store.get(node).payload {
            best = Some((0, p));
        }

        let mut consumed = 0;
        let mut dead = false;
        for b in s.bytes() {
            let next = self.store.get(node).step(b);
            if next.is_none() {
                dead = true;
                break;
            }
            node = next;
            consumed += 1;
            if let Some(p) = &self.store.get(node).payload {
                best = Some((consumed, p));
            }
        }

        if with_eof && !dead {
            let over = self.store.get(node).eof_step();
            if !over.is_none() {
                if let Some(p) = &self.store.get(over).payload {
                    best = Some((consumed, p));
                }
            }
        }

        best.map(|(end, p)| (end.saturating_sub(p.back_by), &p.value))
    }

    /// Scan for the first (greedy) match at any offset. Matches must
    /// consume at least one byte; a machine accepting only the empty string
    /// finds nothing.
    pub fn find_first(&self, s: &str) -> Option<Match<'_, V>> {
        self.find_from(s, 0)
    }

    /// Iterate every match, resuming past the end of each hit.
    pub fn find_all<'m, 's>(&'m self, s: &'s str) -> FindAll<'m, 's, V> {
        FindAll {
            machine: self,
            text: s,
            pos: 0,
        }
    }

    fn find_from(&self, s: &str, from: usize) -> Option<Match<'_, V>> {
        let bytes = s.as_bytes();
        for begin in from..bytes.len() {
            let mut best: Option<(usize, &Acceptance<V>)> = None;
            let mut node = StateId::ROOT;
            for (offset, &b) in bytes[begin..].iter().enumerate() {
                let next = self.store.get(node).step(b);
                if next.is_none() {
                    break;
                }
                node = next;
                if let Some(p) = &self.store.get(node).payload {
                    best = Some((begin + offset + 1, p));
                }
            }
            if let Some((raw_end, p)) = best {
                return Some(Match {
                    begin,
                    end: raw_end.saturating_sub(p.back_by).max(begin),
                    value: &p.value,
                });
            }
        }
        None
    }

    pub fn state_count(&self) -> usize {
        self.store.len()
    }

    fn payload_of(&self, node: StateId) -> Option<&V> {
        self.store.get(node).payload.as_ref().map(|p| &p.value)
    }
}

impl Machine<()> {
    /// Boolean sugar for value-less machines.
    pub fn is_match(&self, s: &str) -> bool {
        self.matches(s).is_some()
    }

    /// Boolean sugar for the `Eof`-reading variant.
    pub fn is_match_eof(&self, s: &str) -> bool {
        self.matches_eof(s).is_some()
    }
}

impl<V> fmt::Debug for Machine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("states", &self.store.len())
            .finish()
    }
}

/// Iterator over all matches in a text; see [`Machine::find_all`].
pub struct FindAll<'m, 's, V> {
    machine: &'m Machine<V>,
    text: &'s str,
    pos: usize,
}

impl<'m, 's, V> Iterator for FindAll<'m, 's, V> {
    type Item = Match<'m, V>;

    fn next(&mut self) -> Option<Match<'m, V>> {
        if self.pos >= self.text.len() {
            return None;
        }
        match self.machine.find_from(self.text, self.pos) {
            Some(m) => {
                // Always advance, even when back_by gave the whole hit back.
                self.pos = m.end.max(m.begin + 1);
                Some(m)
            }
            None => {
                self.pos = self.text.len();
                None
            }
        }
    }
}
