//! Lazily built agent-id → row lookup.
//!
//! A batch's index starts [`Unbuilt`](IndexState::Unbuilt) and is built on
//! the first lookup by scanning the batch's agent ids left to right.
//! After that every lookup is a hash probe into the cached map. There is
//! no transition back: step batches are immutable, so the cached map can
//! never go stale.

use std::sync::OnceLock;

use indexmap::IndexMap;
use mlagents_core::AgentId;
use tracing::{debug, warn};

/// Whether the agent index of a batch has been built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexState {
    /// No lookup has happened yet.
    Unbuilt,
    /// The map is cached.
    Built,
}

/// Cached map from agent id to row index.
///
/// `OnceLock` makes the one-way build safe even when a batch is shared
/// read-only across threads.
#[derive(Clone, Debug, Default)]
pub(crate) struct AgentIndex {
    map: OnceLock<IndexMap<AgentId, usize>>,
}

impl AgentIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the cached map, building it from `ids` on first use.
    ///
    /// A repeated id maps to its last row.
    pub(crate) fn get_or_build(&self, ids: &[AgentId]) -> &IndexMap<AgentId, usize> {
        self.map.get_or_init(|| build(ids))
    }

    pub(crate) fn state(&self) -> IndexState {
        if self.map.get().is_some() {
            IndexState::Built
        } else {
            IndexState::Unbuilt
        }
    }
}

fn build(ids: &[AgentId]) -> IndexMap<AgentId, usize> {
    let mut map = IndexMap::with_capacity(ids.len());
    for (row, &agent_id) in ids.iter().enumerate() {
        if let Some(previous_row) = map.insert(agent_id, row) {
            warn!(%agent_id, previous_row, row, "duplicate agent id in batch, later row wins");
        }
    }
    debug!(batch_size = ids.len(), agents = map.len(), "built agent index");
    map
}

/// Row of the first repeated id, if any: `(id, first_row, row)`.
pub(crate) fn first_duplicate(ids: &[AgentId]) -> Option<(AgentId, usize, usize)> {
    let mut seen: IndexMap<AgentId, usize> = IndexMap::with_capacity(ids.len());
    for (row, &agent_id) in ids.iter().enumerate() {
        if let Some(&first_row) = seen.get(&agent_id) {
            return Some((agent_id, first_row, row));
        }
        seen.insert(agent_id, row);
    }
    None
}
