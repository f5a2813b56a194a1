use crate::model::PhysicalEdge;
use std::fmt::{Display, Formatter};

/// A stage of the per-device forwarding pipeline.
///
/// States are plain values: two states are the same vertex of the transition graph
/// exactly when their variant and parameters are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PipelineState {
    /// Traffic injected on the link attached to `node[interface]`.
    OriginateInterfaceLink { node: String, interface: String },
    /// Traffic originated by `node` inside `vrf`.
    OriginateVrf { node: String, vrf: String },
    /// Received by `node[interface]`, before the incoming filter.
    PreInInterface { node: String, interface: String },
    /// Admitted into `node[vrf]`, before the accept/route decision.
    PostInVrf { node: String, vrf: String },
    /// Routed in `node[vrf]`, before the egress interface is chosen.
    PreOutVrf { node: String, vrf: String },
    /// About to leave through the given physical edge, before source NAT.
    PreOutEdge(PhysicalEdge),
    /// About to leave through the given physical edge, after source NAT.
    PreOutEdgePostNat(PhysicalEdge),
    NodeDropAclIn { node: String },
    NodeDropAclOut { node: String },
    NodeDropNoRoute { node: String },
    NodeDropNullRoute { node: String },
    NodeDrop { node: String },
    NodeInterfaceNeighborUnreachable { node: String, interface: String },
    NodeAccept { node: String },
    Accept,
    Drop,
    NeighborUnreachable,
}

impl PipelineState {
    pub fn originate_interface_link(node: &str, interface: &str) -> PipelineState {
        PipelineState::OriginateInterfaceLink {
            node: node.to_string(),
            interface: interface.to_string(),
        }
    }

    pub fn originate_vrf(node: &str, vrf: &str) -> PipelineState {
        PipelineState::OriginateVrf {
            node: node.to_string(),
            vrf: vrf.to_string(),
        }
    }

    pub fn pre_in_interface(node: &str, interface: &str) -> PipelineState {
        PipelineState::PreInInterface {
            node: node.to_string(),
            interface: interface.to_string(),
        }
    }

    pub fn post_in_vrf(node: &str, vrf: &str) -> PipelineState {
        PipelineState::PostInVrf {
            node: node.to_string(),
            vrf: vrf.to_string(),
        }
    }

    pub fn pre_out_vrf(node: &str, vrf: &str) -> PipelineState {
        PipelineState::PreOutVrf {
            node: node.to_string(),
            vrf: vrf.to_string(),
        }
    }

    pub fn node_drop_acl_in(node: &str) -> PipelineState {
        PipelineState::NodeDropAclIn {
            node: node.to_string(),
        }
    }

    pub fn node_drop_acl_out(node: &str) -> PipelineState {
        PipelineState::NodeDropAclOut {
            node: node.to_string(),
        }
    }

    pub fn node_drop_no_route(node: &str) -> PipelineState {
        PipelineState::NodeDropNoRoute {
            node: node.to_string(),
        }
    }

    pub fn node_drop_null_route(node: &str) -> PipelineState {
        PipelineState::NodeDropNullRoute {
            node: node.to_string(),
        }
    }

    pub fn node_drop(node: &str) -> PipelineState {
        PipelineState::NodeDrop {
            node: node.to_string(),
        }
    }

    pub fn node_interface_neighbor_unreachable(node: &str, interface: &str) -> PipelineState {
        PipelineState::NodeInterfaceNeighborUnreachable {
            node: node.to_string(),
            interface: interface.to_string(),
        }
    }

    pub fn node_accept(node: &str) -> PipelineState {
        PipelineState::NodeAccept {
            node: node.to_string(),
        }
    }

    /// True for the states traffic can be injected into.
    pub fn is_originate(&self) -> bool {
        matches!(
            self,
            PipelineState::OriginateInterfaceLink { .. } | PipelineState::OriginateVrf { .. }
        )
    }

    /// True for the global dispositions (which have no outgoing transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Accept | PipelineState::Drop | PipelineState::NeighborUnreachable
        )
    }

    /// True for the per-node states that decide a disposition.
    pub fn is_node_disposition(&self) -> bool {
        matches!(
            self,
            PipelineState::NodeDropAclIn { .. }
                | PipelineState::NodeDropAclOut { .. }
                | PipelineState::NodeDropNoRoute { .. }
                | PipelineState::NodeDropNullRoute { .. }
                | PipelineState::NodeDrop { .. }
                | PipelineState::NodeInterfaceNeighborUnreachable { .. }
                | PipelineState::NodeAccept { .. }
        )
    }

    /// The node this state belongs to (`None` for the global dispositions).
    pub fn node(&self) -> Option<&str> {
        match self {
            PipelineState::OriginateInterfaceLink { node, .. }
            | PipelineState::OriginateVrf { node, .. }
            | PipelineState::PreInInterface { node, .. }
            | PipelineState::PostInVrf { node, .. }
            | PipelineState::PreOutVrf { node, .. }
            | PipelineState::NodeDropAclIn { node }
            | PipelineState::NodeDropAclOut { node }
            | PipelineState::NodeDropNoRoute { node }
            | PipelineState::NodeDropNullRoute { node }
            | PipelineState::NodeDrop { node }
            | PipelineState::NodeInterfaceNeighborUnreachable { node, .. }
            | PipelineState::NodeAccept { node } => Some(node.as_str()),
            PipelineState::PreOutEdge(edge) | PipelineState::PreOutEdgePostNat(edge) => {
                Some(edge.node1.as_str())
            }
            PipelineState::Accept | PipelineState::Drop | PipelineState::NeighborUnreachable => {
                None
            }
        }
    }
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::OriginateInterfaceLink { node, interface } => {
                write!(f, "OriginateInterfaceLink({node}, {interface})")
            }
            PipelineState::OriginateVrf { node, vrf } => write!(f, "OriginateVrf({node}, {vrf})"),
            PipelineState::PreInInterface { node, interface } => {
                write!(f, "PreInInterface({node}, {interface})")
            }
            PipelineState::PostInVrf { node, vrf } => write!(f, "PostInVrf({node}, {vrf})"),
            PipelineState::PreOutVrf { node, vrf } => write!(f, "PreOutVrf({node}, {vrf})"),
            PipelineState::PreOutEdge(edge) => write!(f, "PreOutEdge({edge})"),
            PipelineState::PreOutEdgePostNat(edge) => write!(f, "PreOutEdgePostNat({edge})"),
            PipelineState::NodeDropAclIn { node } => write!(f, "NodeDropAclIn({node})"),
            PipelineState::NodeDropAclOut { node } => write!(f, "NodeDropAclOut({node})"),
            PipelineState::NodeDropNoRoute { node } => write!(f, "NodeDropNoRoute({node})"),
            PipelineState::NodeDropNullRoute { node } => write!(f, "NodeDropNullRoute({node})"),
            PipelineState::NodeDrop { node } => write!(f, "NodeDrop({node})"),
            PipelineState::NodeInterfaceNeighborUnreachable { node, interface } => {
                write!(f, "NodeInterfaceNeighborUnreachable({node}, {interface})")
            }
            PipelineState::NodeAccept { node } => write!(f, "NodeAccept({node})"),
            PipelineState::Accept => f.write_str("Accept"),
            PipelineState::Drop => f.write_str("Drop"),
            PipelineState::NeighborUnreachable => f.write_str("NeighborUnreachable"),
        }
    }
}
