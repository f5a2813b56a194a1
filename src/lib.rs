//! Symbolic reachability analysis of network forwarding pipelines.
//!
//! Every packet header is encoded as a vector of BDD variables (see [`header_space`]), and
//! every configuration element of a network snapshot (ACLs, forwarding facts, source NAT)
//! is compiled into a predicate over those variables. The per-device forwarding pipeline
//! of the whole network then becomes a [`graph::TransitionGraph`]: states are pipeline
//! stages, edges carry the predicate of packets allowed to take them. A query propagates
//! header spaces from user-chosen origins through this graph until a fixpoint is reached
//! (see [`reachability`]), which answers "which packets can reach which state".
//!
//! The [`analysis::ReachabilityAnalysis`] facade ties the pieces together.

#[cfg(test)]
mod test_utils;

pub mod acl;
pub mod analysis;
pub mod error;
pub mod forwarding;
pub mod graph;
pub mod header_space;
pub mod model;
pub mod reachability;
pub mod roots;

use biodivine_lib_bdd::Bdd;

/// A utility method for printing useful metadata of header spaces.
fn log_space(space: &Bdd) -> String {
    format!("packets={}; BDD nodes={}", space.cardinality(), space.size())
}
