//! The cursor set: the machine's write heads.
//!
//! During construction every primitive attaches at the current cursors, an
//! ordered multiset of state ids. Combinators capture and restore whole
//! cursor sets, so this is a plain owned value type rather than hidden
//! builder state.

use smallvec::SmallVec;

use super::node::StateId;

/// Ordered multiset of states currently open for appending.
///
/// Duplicates are allowed (two writers can produce the same id); consumers
/// that must not double-apply an effect dedupe at the point of use.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cursors(SmallVec<[StateId; 8]>);

impl Cursors {
    /// The initial cursor set: just the root.
    pub fn at_root() -> Self {
        let mut v = SmallVec::new();
        v.push(StateId::ROOT);
        Cursors(v)
    }

    pub fn empty() -> Self {
        Cursors(SmallVec::new())
    }

    pub fn reset_to_root(&mut self) {
        self.0.clear();
        self.0.push(StateId::ROOT);
    }

    pub fn push(&mut self, id: StateId) {
        self.0.push(id);
    }

    pub fn extend(&mut self, ids: impl IntoIterator<Item = StateId>) {
        self.0.extend(ids);
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.0.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[StateId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only cursors satisfying `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(StateId) -> bool) {
        self.0.retain(|id| keep(*id));
    }

    /// Rewrite every cursor through `map`; cursors mapped to `NONE` are
    /// dropped.
    pub fn remap(&mut self, mut map: impl FnMut(StateId) -> StateId) {
        let mapped: SmallVec<[StateId; 8]> = self
            .0
            .iter()
            .map(|&id| map(id))
            .filter(|id| !id.is_none())
            .collect();
        self.0 = mapped;
    }
}

impl Default for Cursors {
    fn default() -> Self {
        Cursors::at_root()
    }
}

impl FromIterator<StateId> for Cursors {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        Cursors(iter.into_iter().collect())
    }
}
