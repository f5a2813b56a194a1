use crate::graph::TransitionGraph;
use std::sync::Arc;

/// A "flat" configuration object for a reachability query.
#[derive(Clone)]
pub struct ReachabilityConfig {
    /// The frozen transition graph. It is shared (never copied) between queries.
    pub graph: Arc<TransitionGraph>,
    /// Cancel the procedure if it exceeds the specified number of work-list pops (default:
    /// `usize::MAX`).
    pub max_iterations: usize,
}

impl From<Arc<TransitionGraph>> for ReachabilityConfig {
    fn from(value: Arc<TransitionGraph>) -> Self {
        ReachabilityConfig::new(value)
    }
}

impl From<&Arc<TransitionGraph>> for ReachabilityConfig {
    fn from(value: &Arc<TransitionGraph>) -> Self {
        ReachabilityConfig::new(value.clone())
    }
}

impl From<TransitionGraph> for ReachabilityConfig {
    fn from(value: TransitionGraph) -> Self {
        ReachabilityConfig::new(Arc::new(value))
    }
}

impl ReachabilityConfig {
    /// Create a new instance of [`ReachabilityConfig`] without an iteration limit.
    pub fn new(graph: Arc<TransitionGraph>) -> ReachabilityConfig {
        ReachabilityConfig {
            graph,
            max_iterations: usize::MAX,
        }
    }
}
