use crate::graph::{PipelineState, TransitionGraph};
use crate::header_space::Packet;
use biodivine_lib_bdd::Bdd;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The least fixpoint of a reachability query: the header space that can reach every state.
///
/// Only states with a non-empty header space are stored.
#[derive(Clone)]
pub struct ReachabilityResult {
    graph: Arc<TransitionGraph>,
    reached: BTreeMap<PipelineState, Bdd>,
}

impl ReachabilityResult {
    pub fn new(graph: Arc<TransitionGraph>, reached: BTreeMap<PipelineState, Bdd>) -> Self {
        ReachabilityResult { graph, reached }
    }

    /// The graph this result was computed on.
    pub fn graph(&self) -> &TransitionGraph {
        &self.graph
    }

    /// Header space reaching `state`, or `None` if the state is unreachable.
    pub fn get(&self, state: &PipelineState) -> Option<&Bdd> {
        self.reached.get(state)
    }

    /// Header space reaching `state` (empty if the state is unreachable).
    pub fn reached_space(&self, state: &PipelineState) -> Bdd {
        self.reached
            .get(state)
            .cloned()
            .unwrap_or_else(|| self.graph.packet().mk_false())
    }

    pub fn is_reached(&self, state: &PipelineState) -> bool {
        self.reached.contains_key(state)
    }

    pub fn reached_states(&self) -> impl Iterator<Item = &PipelineState> {
        self.reached.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PipelineState, &Bdd)> {
        self.reached.iter()
    }

    /// Per-node disposition states (accepts, drop reasons, neighbor-unreachable) that were
    /// reached, together with their header spaces.
    pub fn node_dispositions(&self) -> impl Iterator<Item = (&PipelineState, &Bdd)> {
        self.reached
            .iter()
            .filter(|(state, _)| state.is_node_disposition())
    }

    /// Headers accepted by some node.
    pub fn accepted(&self) -> Bdd {
        self.reached_space(&PipelineState::Accept)
    }

    /// Headers dropped by some node (for any reason).
    pub fn dropped(&self) -> Bdd {
        self.reached_space(&PipelineState::Drop)
    }

    /// Headers forwarded to an interface without a reachable neighbor.
    pub fn neighbor_unreachable(&self) -> Bdd {
        self.reached_space(&PipelineState::NeighborUnreachable)
    }

    /// One concrete packet reaching `state`, for example-flow reporting.
    pub fn example_packet(&self, state: &PipelineState) -> Option<Packet> {
        self.graph.packet().example_packet(self.reached.get(state)?)
    }
}
