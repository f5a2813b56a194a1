use std::fmt::{Display, Formatter};

/// A named place where traffic enters the network.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    /// Traffic arriving on the link attached to `node[interface]`, i.e. it is subject to the
    /// incoming filter of the interface.
    InterfaceLink { node: String, interface: String },
    /// Traffic originated by `node` itself from `interface`. It enters the routing pipeline
    /// of the VRF owning the interface directly.
    Interface { node: String, interface: String },
    /// Traffic originated by `node` inside `vrf`.
    Vrf { node: String, vrf: String },
}

impl Location {
    pub fn interface_link(node: &str, interface: &str) -> Location {
        Location::InterfaceLink {
            node: node.to_string(),
            interface: interface.to_string(),
        }
    }

    pub fn interface(node: &str, interface: &str) -> Location {
        Location::Interface {
            node: node.to_string(),
            interface: interface.to_string(),
        }
    }

    pub fn vrf(node: &str, vrf: &str) -> Location {
        Location::Vrf {
            node: node.to_string(),
            vrf: vrf.to_string(),
        }
    }

    pub fn node(&self) -> &str {
        match self {
            Location::InterfaceLink { node, .. }
            | Location::Interface { node, .. }
            | Location::Vrf { node, .. } => node,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::InterfaceLink { node, interface } => write!(f, "link {node}[{interface}]"),
            Location::Interface { node, interface } => write!(f, "interface {node}[{interface}]"),
            Location::Vrf { node, vrf } => write!(f, "vrf {node}[{vrf}]"),
        }
    }
}
