//! Arena storage for machine states.
//!
//! States live in a flat `Vec` and are addressed by 1-based [`StateId`]s,
//! so cyclic transition graphs need no ownership gymnastics. The store is
//! append-only during construction; the minimizer rebuilds it wholesale
//! through [`NodeStore::replace_all`].

use super::node::{Node, StateId};

/// Flat arena of states. Ids are dense, 1-based, never reused within a
/// construction session.
#[derive(Clone, PartialEq)]
pub struct NodeStore<V> {
    nodes: Vec<Node<V>>,
}

impl<V> NodeStore<V> {
    pub fn new() -> Self {
        NodeStore { nodes: Vec::new() }
    }

    /// Append a state, returning its id.
    pub fn push(&mut self, node: Node<V>) -> StateId {
        self.nodes.push(node);
        StateId::from_raw(self.nodes.len() as u32)
    }

    /// Append a fresh empty state.
    pub fn new_state(&mut self) -> StateId {
        self.push(Node::new())
    }

    /// The id the next `push` will return.
    pub fn next_id(&self) -> StateId {
        StateId::from_raw(self.nodes.len() as u32 + 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when `id` addresses a state in this store.
    pub fn contains(&self, id: StateId) -> bool {
        !id.is_none() && id.index() < self.nodes.len()
    }

    #[inline]
    pub fn get(&self, id: StateId) -> &Node<V> {
        self.check(id);
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: StateId) -> &mut Node<V> {
        self.check(id);
        &mut self.nodes[id.index()]
    }

    #[inline]
    fn check(&self, id: StateId) {
        if id.is_none() {
            panic!("dangling reference: attempt to load the null state");
        }
        if id.index() >= self.nodes.len() {
            panic!(
                "dangling reference: state {:?} outside store of {} states",
                id,
                self.nodes.len()
            );
        }
    }

    /// Iterate states paired with their ids, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &Node<V>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (StateId::from_raw(i as u32 + 1), n))
    }

    /// Replace the whole store with `nodes`, rewriting every transition
    /// through `id_map` (indexed by old zero-based position; `NONE` drops
    /// the reference). Used by compaction.
    pub fn replace_all(&mut self, mut nodes: Vec<Node<V>>, id_map: &[StateId]) {
        for node in &mut nodes {
            node.each_transition_mut(|_, to| {
                *to = id_map[to.index()];
            });
        }
        self.nodes = nodes;
    }
}

impl<V> Default for NodeStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
