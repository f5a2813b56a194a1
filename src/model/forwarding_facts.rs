use crate::model::IpSpace;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// A directed physical link from `node1[interface1]` to `node2[interface2]`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalEdge {
    pub node1: String,
    pub interface1: String,
    pub node2: String,
    pub interface2: String,
}

impl PhysicalEdge {
    pub fn new(node1: &str, interface1: &str, node2: &str, interface2: &str) -> PhysicalEdge {
        PhysicalEdge {
            node1: node1.to_string(),
            interface1: interface1.to_string(),
            node2: node2.to_string(),
            interface2: interface2.to_string(),
        }
    }

    /// The same link in the opposite direction.
    pub fn reversed(&self) -> PhysicalEdge {
        PhysicalEdge::new(&self.node2, &self.interface2, &self.node1, &self.interface1)
    }
}

impl Display for PhysicalEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}] -> {}[{}]",
            self.node1, self.interface1, self.node2, self.interface2
        )
    }
}

/// Data-plane facts about a snapshot, as computed by an external forwarding analysis.
///
/// All IP spaces constrain the *destination* IP of a packet.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForwardingFacts {
    /// node -> VRF -> destinations with a usable route.
    pub routable: BTreeMap<String, BTreeMap<String, IpSpace>>,
    /// node -> VRF -> destinations routed to a null interface.
    pub null_routed: BTreeMap<String, BTreeMap<String, IpSpace>>,
    /// Physical edge -> destinations for which the next-hop ARP lookup on that edge succeeds.
    #[cfg_attr(feature = "serde", serde(with = "edge_map"))]
    pub arp_true: BTreeMap<PhysicalEdge, IpSpace>,
    /// node -> VRF -> interface -> destinations forwarded out of the interface but
    /// without a neighbor that would answer ARP.
    pub neighbor_unreachable: BTreeMap<String, BTreeMap<String, BTreeMap<String, IpSpace>>>,
}

impl ForwardingFacts {
    pub fn set_routable(&mut self, node: &str, vrf: &str, space: IpSpace) {
        self.routable
            .entry(node.to_string())
            .or_default()
            .insert(vrf.to_string(), space);
    }

    pub fn set_null_routed(&mut self, node: &str, vrf: &str, space: IpSpace) {
        self.null_routed
            .entry(node.to_string())
            .or_default()
            .insert(vrf.to_string(), space);
    }

    pub fn set_arp_true(&mut self, edge: PhysicalEdge, space: IpSpace) {
        self.arp_true.insert(edge, space);
    }

    pub fn set_neighbor_unreachable(
        &mut self,
        node: &str,
        vrf: &str,
        interface: &str,
        space: IpSpace,
    ) {
        self.neighbor_unreachable
            .entry(node.to_string())
            .or_default()
            .entry(vrf.to_string())
            .or_default()
            .insert(interface.to_string(), space);
    }
}

/// Serialize an edge-keyed map as a list of pairs, since edges are not valid map keys in
/// most self-describing formats.
#[cfg(feature = "serde")]
mod edge_map {
    use crate::model::{IpSpace, PhysicalEdge};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<PhysicalEdge, IpSpace>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<PhysicalEdge, IpSpace>, D::Error> {
        let pairs = Vec::<(PhysicalEdge, IpSpace)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
