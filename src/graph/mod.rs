//! The transition graph of the network-wide forwarding pipeline.
//!
//! Vertices are [`PipelineState`] values, edges carry a guard predicate (the packets allowed
//! to take the edge) and, on egress edges, an ordered list of source NAT rules. The graph is
//! built once per snapshot and is immutable afterwards, so it can be shared by any number of
//! concurrent queries (see [`crate::reachability`]).
//!
//! # Example
//!
//! ```no_run
//! use netreach_bdd::graph::{GraphConfig, TransitionGraph};
//! use netreach_bdd::model::ForwardingFacts;
//! use std::collections::BTreeMap;
//!
//! let configs = BTreeMap::new();
//! let facts = ForwardingFacts::default();
//! let graph = TransitionGraph::build(&configs, &facts, &GraphConfig::default()).unwrap();
//! println!("{} transitions", graph.edge_count());
//! ```

use crate::acl::compile_node_acls;
use crate::error::ModelError;
use crate::forwarding::ForwardingPredicates;
use crate::header_space::{Coarsening, PacketVariables};
use crate::model::{Configuration, ForwardingFacts};
use crate::roots::LocationIndex;
use assembler::EdgeTable;
use biodivine_lib_bdd::Bdd;
use log::info;
use rule_generator::RuleGenerator;
use std::collections::BTreeMap;


mod assembler;
mod graph_config;
mod pipeline_state;
mod rule_generator;

pub use graph_config::GraphConfig;
pub use pipeline_state::PipelineState;

/// One source NAT rule: packets in `matches` get their source IP rewritten into `rewrite`.
#[derive(Clone, Debug)]
pub struct NatRule {
    matches: Bdd,
    rewrite: Bdd,
}

impl NatRule {
    /// `rewrite` must only constrain the source IP field.
    pub fn new(matches: Bdd, rewrite: Bdd) -> NatRule {
        NatRule { matches, rewrite }
    }

    pub fn matches(&self) -> &Bdd {
        &self.matches
    }

    pub fn rewrite(&self) -> &Bdd {
        &self.rewrite
    }
}

/// A guarded transition between two pipeline states.
#[derive(Clone, Debug)]
pub struct Edge {
    from: PipelineState,
    to: PipelineState,
    guard: Bdd,
    source_nat: Vec<NatRule>,
}

impl Edge {
    pub fn new(from: PipelineState, to: PipelineState, guard: Bdd) -> Edge {
        Edge::with_source_nat(from, to, guard, Vec::new())
    }

    /// An edge that rewrites packets using the first matching rule of `source_nat`.
    pub fn with_source_nat(
        from: PipelineState,
        to: PipelineState,
        guard: Bdd,
        source_nat: Vec<NatRule>,
    ) -> Edge {
        Edge {
            from,
            to,
            guard,
            source_nat,
        }
    }

    pub fn from(&self) -> &PipelineState {
        &self.from
    }

    pub fn to(&self) -> &PipelineState {
        &self.to
    }

    pub fn guard(&self) -> &Bdd {
        &self.guard
    }

    /// Source NAT rules in priority order (empty if the edge does not rewrite packets).
    pub fn source_nat(&self) -> &[NatRule] {
        &self.source_nat
    }
}

/// The frozen transition graph of one snapshot.
pub struct TransitionGraph {
    packet: PacketVariables,
    coarsening: Coarsening,
    edges: EdgeTable,
    locations: LocationIndex,
}

impl TransitionGraph {
    /// Compile the configuration and forwarding facts of a snapshot into a transition graph.
    ///
    /// # Errors
    ///
    /// Any inconsistency between `configs` and `facts` (unknown node, VRF, interface or ACL),
    /// a malformed filter or NAT pool, or overlapping rule families.
    pub fn build(
        configs: &BTreeMap<String, Configuration>,
        facts: &ForwardingFacts,
        config: &GraphConfig,
    ) -> Result<TransitionGraph, ModelError> {
        let packet = PacketVariables::new();
        let acls = compile_node_acls(&packet, configs, config.coarsening)?;
        let forwarding = ForwardingPredicates::new(&packet, configs, facts)?;

        let generator = RuleGenerator {
            packet: &packet,
            configs,
            acls: &acls,
            forwarding: &forwarding,
            coarsening: config.coarsening,
        };
        let edges = assembler::assemble(generator.generate(config.parallel)?)?;

        let graph = TransitionGraph {
            locations: LocationIndex::new(configs),
            coarsening: config.coarsening,
            packet,
            edges,
        };

        info!(
            "Built transition graph for {} nodes: {} states with successors, {} transitions ({:?}).",
            configs.len(),
            graph.edges.len(),
            graph.edge_count(),
            graph.coarsening
        );

        Ok(graph)
    }

    /// The header encoding used by all predicates of this graph.
    pub fn packet(&self) -> &PacketVariables {
        &self.packet
    }

    pub fn coarsening(&self) -> Coarsening {
        self.coarsening
    }

    /// Outgoing edges of `state` (empty for states without successors).
    pub fn successors(&self, state: &PipelineState) -> impl Iterator<Item = &Edge> {
        self.edges
            .get(state)
            .into_iter()
            .flat_map(|targets| targets.values())
    }

    pub fn edge(&self, from: &PipelineState, to: &PipelineState) -> Option<&Edge> {
        self.edges.get(from).and_then(|targets| targets.get(to))
    }

    /// All edges of the graph, ordered by source and destination state.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values().flat_map(|targets| targets.values())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|targets| targets.len()).sum()
    }

    /// States with at least one outgoing edge.
    pub fn states(&self) -> impl Iterator<Item = &PipelineState> {
        self.edges.keys()
    }

    pub(crate) fn locations(&self) -> &LocationIndex {
        &self.locations
    }
}
