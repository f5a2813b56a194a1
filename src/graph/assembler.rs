use crate::error::ModelError;
use crate::graph::{Edge, PipelineState};
use log::debug;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Two-level lookup of transitions: source state, then destination state.
pub(crate) type EdgeTable = BTreeMap<PipelineState, BTreeMap<PipelineState, Edge>>;

/// Group the generated edges by source and destination.
///
/// Edges with an empty guard are discarded. A second edge between the same pair of states
/// means two rule families overlap, which is reported as [`ModelError::DuplicateEdge`].
pub(crate) fn assemble(edges: impl IntoIterator<Item = Edge>) -> Result<EdgeTable, ModelError> {
    let mut table = EdgeTable::new();
    let mut kept = 0usize;
    let mut discarded = 0usize;
    for edge in edges {
        if edge.guard().is_false() {
            discarded += 1;
            continue;
        }
        let targets = table.entry(edge.from().clone()).or_default();
        match targets.entry(edge.to().clone()) {
            Entry::Vacant(slot) => {
                slot.insert(edge);
                kept += 1;
            }
            Entry::Occupied(slot) => {
                return Err(ModelError::DuplicateEdge {
                    from: slot.get().from().clone(),
                    to: slot.get().to().clone(),
                });
            }
        }
    }
    debug!("Assembled {kept} transitions ({discarded} unsatisfiable transitions discarded).");
    Ok(table)
}
