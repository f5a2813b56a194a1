use crate::graph::PipelineState;
use crate::header_space::HeaderField;
use crate::model::Location;
use cancel_this::Cancelled;
use thiserror::Error;

/// The snapshot violates the contract between the configuration model, the forwarding facts,
/// and the graph compiler.
///
/// These faults are not recoverable: the same inputs always produce the same error, and the
/// only remedy is a corrected snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Unknown node '{0}'")]
    UnknownNode(String),
    #[error("Unknown VRF '{vrf}' on node '{node}'")]
    UnknownVrf { node: String, vrf: String },
    #[error("Unknown interface '{interface}' on node '{node}'")]
    UnknownInterface { node: String, interface: String },
    #[error("Unknown ACL '{acl}' on node '{node}'")]
    UnknownAcl { node: String, acl: String },
    #[error("Invalid prefix length /{0}")]
    InvalidPrefixLength(u8),
    #[error("Invalid range for '{field}': {first}..{last}")]
    InvalidRange {
        field: HeaderField,
        first: u64,
        last: u64,
    },
    #[error("Duplicate transition {from} -> {to}")]
    DuplicateEdge {
        from: PipelineState,
        to: PipelineState,
    },
}

/// A reachability query could not be answered.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown location: {0}")]
    UnknownLocation(Location),
    #[error("Invalid header space: {0}")]
    InvalidHeaderSpace(#[from] ModelError),
    #[error("Reachability analysis was cancelled")]
    Cancelled(Cancelled),
}

impl From<Cancelled> for QueryError {
    fn from(value: Cancelled) -> Self {
        QueryError::Cancelled(value)
    }
}
