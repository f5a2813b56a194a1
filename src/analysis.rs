//! A single entry point for building a graph once and answering many queries on it.

use crate::error::{ModelError, QueryError};
use crate::graph::{GraphConfig, TransitionGraph};
use crate::header_space::HeaderField;
use crate::model::{Configuration, ForwardingFacts, IpSpace};
use crate::reachability::{Reachability, ReachabilityResult};
use crate::roots::{OriginAssignment, RootAssignment};
use biodivine_lib_bdd::Bdd;
use computation_process::Algorithm;
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Owns the frozen transition graph of one snapshot.
///
/// Queries only borrow the graph, so one analysis can be shared between threads (or cloned
/// cheaply) and queried concurrently.
#[derive(Clone)]
pub struct ReachabilityAnalysis {
    graph: Arc<TransitionGraph>,
}

impl ReachabilityAnalysis {
    /// Compile a snapshot into a transition graph.
    pub fn new(
        configs: &BTreeMap<String, Configuration>,
        facts: &ForwardingFacts,
        config: &GraphConfig,
    ) -> Result<ReachabilityAnalysis, ModelError> {
        let graph = TransitionGraph::build(configs, facts, config)?;
        Ok(ReachabilityAnalysis {
            graph: Arc::new(graph),
        })
    }

    pub fn graph(&self) -> &Arc<TransitionGraph> {
        &self.graph
    }

    /// Compute which packets from `origins` with a destination in `destination` reach each
    /// pipeline state.
    pub fn query(
        &self,
        origins: &OriginAssignment,
        destination: &IpSpace,
    ) -> Result<ReachabilityResult, QueryError> {
        let destination = self
            .graph
            .packet()
            .mk_ip_space(HeaderField::DstIp, destination)?;
        self.query_headers(origins, &destination)
    }

    /// Same as [`ReachabilityAnalysis::query`], but with an arbitrary header constraint.
    pub fn query_headers(
        &self,
        origins: &OriginAssignment,
        headers: &Bdd,
    ) -> Result<ReachabilityResult, QueryError> {
        let roots = RootAssignment::resolve(&self.graph, origins, headers)?;
        info!("Starting reachability query with {} roots.", roots.len());
        Ok(Reachability::run(&self.graph, roots)?)
    }
}
