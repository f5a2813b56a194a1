use crate::header_space::Coarsening;

/// Options that influence how a [`crate::graph::TransitionGraph`] is constructed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphConfig {
    /// Precision of every header predicate in the graph (default: [`Coarsening::Precise`]).
    ///
    /// The same coarsening is applied to the roots of every query on the graph.
    pub coarsening: Coarsening,
    /// Evaluate rule families on the `rayon` thread pool (default: `true`).
    pub parallel: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig::new(Coarsening::Precise)
    }
}

impl From<Coarsening> for GraphConfig {
    fn from(value: Coarsening) -> Self {
        GraphConfig::new(value)
    }
}

impl GraphConfig {
    pub fn new(coarsening: Coarsening) -> GraphConfig {
        GraphConfig {
            coarsening,
            parallel: true,
        }
    }
}
