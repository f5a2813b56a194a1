//! Symbolic reachability over a frozen [`TransitionGraph`](crate::graph::TransitionGraph).
//!
//! The solver propagates header spaces from the roots of a query along the guarded edges of
//! the graph until nothing changes. Every state keeps the union of all header spaces that
//! reached it, so the result describes, for each pipeline state, exactly which packets can
//! get there.
//!
//! The solver is a resumable [`Computation`]: each step processes one state of the work-list,
//! and the computation can be suspended, resumed, or cancelled between steps. The graph is
//! shared through an [`Arc`](std::sync::Arc) and is never modified, so any number of queries
//! can run concurrently on the same graph.
//!
//! # Example
//!
//! ```no_run
//! use netreach_bdd::graph::{GraphConfig, TransitionGraph};
//! use netreach_bdd::model::{ForwardingFacts, Location};
//! use netreach_bdd::reachability::Reachability;
//! use netreach_bdd::roots::{OriginAssignment, RootAssignment};
//! use computation_process::Algorithm;
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! let configs = BTreeMap::new();
//! let graph = TransitionGraph::build(&configs, &ForwardingFacts::default(), &GraphConfig::default()).unwrap();
//! let graph = Arc::new(graph);
//!
//! let origins = OriginAssignment::new()
//!     .assign(vec![Location::vrf("r1", "default")], graph.packet().mk_true());
//! let roots = RootAssignment::resolve(&graph, &origins, &graph.packet().mk_true()).unwrap();
//! let result = Reachability::run(&graph, roots).unwrap();
//! println!("accepted: {}", !result.accepted().is_false());
//! ```

use computation_process::{Algorithm, Computation};

#[cfg(test)]
mod tests;

mod reachability_config;
mod reachability_state;
mod result;
mod transfer;
mod worklist_propagation;

pub use reachability_config::ReachabilityConfig;
pub use reachability_state::ReachabilityState;
pub use result::ReachabilityResult;
pub use transfer::{apply_source_nat, traverse};
pub use worklist_propagation::WorklistPropagation;

/// The reachability fixpoint as a resumable computation.
pub type Reachability =
    Computation<ReachabilityConfig, ReachabilityState, ReachabilityResult, WorklistPropagation>;

/// A helper trait which allows us to use [`ReachabilityAlgorithm`] as shorthand for
/// `Algorithm<ReachabilityConfig, ReachabilityState, ReachabilityResult>`.
pub trait ReachabilityAlgorithm:
    Algorithm<ReachabilityConfig, ReachabilityState, ReachabilityResult> + 'static
{
}
impl<T: Algorithm<ReachabilityConfig, ReachabilityState, ReachabilityResult> + 'static>
    ReachabilityAlgorithm for T
{
}
