use crate::graph::PipelineState;
use crate::roots::RootAssignment;
use biodivine_lib_bdd::Bdd;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// The private, mutable state of one solve.
#[derive(Clone, Debug, Default)]
pub struct ReachabilityState {
    /// Number of processed work-list items.
    pub iteration: usize,
    /// Header space reached so far in every state. States that were not reached are absent.
    pub reached: BTreeMap<PipelineState, Bdd>,
    /// States whose reached space changed since they were last processed.
    pub(crate) dirty: VecDeque<PipelineState>,
    pub(crate) queued: BTreeSet<PipelineState>,
}

impl ReachabilityState {
    /// Extend the reached space of `state` and schedule it for processing if it grew.
    ///
    /// Returns `true` if the reached space changed.
    pub fn extend(&mut self, state: &PipelineState, space: &Bdd) -> bool {
        if space.is_false() {
            return false;
        }
        let grown = match self.reached.get(state) {
            Some(current) if space.and_not(current).is_false() => return false,
            Some(current) => current.or(space),
            None => space.clone(),
        };
        self.reached.insert(state.clone(), grown);
        if self.queued.insert(state.clone()) {
            self.dirty.push_back(state.clone());
        }
        true
    }

    /// Take the next state that needs processing.
    pub(crate) fn pop_dirty(&mut self) -> Option<PipelineState> {
        let state = self.dirty.pop_front()?;
        self.queued.remove(&state);
        Some(state)
    }

    pub fn pending(&self) -> usize {
        self.dirty.len()
    }
}

impl From<RootAssignment> for ReachabilityState {
    fn from(value: RootAssignment) -> Self {
        let mut state = ReachabilityState::default();
        for (root, space) in value {
            state.extend(&root, &space);
        }
        state
    }
}

impl From<&RootAssignment> for ReachabilityState {
    fn from(value: &RootAssignment) -> Self {
        Self::from(value.clone())
    }
}
