//! Conversion of data-plane facts into destination-IP predicates.

use crate::error::ModelError;
use crate::header_space::{HeaderField, PacketVariables};
use crate::model::{Configuration, ForwardingFacts, Interface, IpSpace, PhysicalEdge};
use biodivine_lib_bdd::Bdd;
use log::debug;
use std::collections::BTreeMap;


type NodeVrfMap<T> = BTreeMap<String, BTreeMap<String, T>>;

/// Destination-IP predicates for every forwarding fact of a snapshot.
///
/// A node/VRF that exists in the configuration but has no entry in a fact table
/// is treated as having an empty IP space for that fact.
pub struct ForwardingPredicates {
    empty: Bdd,
    routable: NodeVrfMap<Bdd>,
    null_routed: NodeVrfMap<Bdd>,
    arp_true: BTreeMap<PhysicalEdge, Bdd>,
    neighbor_unreachable: NodeVrfMap<BTreeMap<String, Bdd>>,
    vrf_accept: NodeVrfMap<Bdd>,
    vrf_not_accept: NodeVrfMap<Bdd>,
}

impl ForwardingPredicates {
    /// Convert `facts` into predicates, checking that every referenced node, VRF, and
    /// interface exists in `configs`.
    pub fn new(
        packet: &PacketVariables,
        configs: &BTreeMap<String, Configuration>,
        facts: &ForwardingFacts,
    ) -> Result<ForwardingPredicates, ModelError> {
        let to_bdd = |space: &IpSpace| packet.mk_ip_space(HeaderField::DstIp, space);

        let routable = convert_vrf_facts(configs, &facts.routable, &to_bdd)?;
        let null_routed = convert_vrf_facts(configs, &facts.null_routed, &to_bdd)?;

        let mut arp_true = BTreeMap::new();
        for (edge, space) in &facts.arp_true {
            check_interface(configs, &edge.node1, &edge.interface1)?;
            check_interface(configs, &edge.node2, &edge.interface2)?;
            arp_true.insert(edge.clone(), to_bdd(space)?);
        }

        let mut neighbor_unreachable = NodeVrfMap::new();
        for (node, vrfs) in &facts.neighbor_unreachable {
            for (vrf, interfaces) in vrfs {
                check_vrf(configs, node, vrf)?;
                let mut converted = BTreeMap::new();
                for (interface, space) in interfaces {
                    check_interface(configs, node, interface)?;
                    converted.insert(interface.clone(), to_bdd(space)?);
                }
                neighbor_unreachable
                    .entry(node.clone())
                    .or_insert_with(BTreeMap::new)
                    .insert(vrf.clone(), converted);
            }
        }

        let vrf_accept = compute_vrf_accept(packet, configs)?;
        let vrf_not_accept = vrf_accept
            .iter()
            .map(|(node, vrfs)| {
                let negated = vrfs
                    .iter()
                    .map(|(vrf, accept)| (vrf.clone(), accept.not()))
                    .collect();
                (node.clone(), negated)
            })
            .collect();

        debug!(
            "Converted forwarding facts: {} ARP edges, {} nodes with routes.",
            arp_true.len(),
            routable.len()
        );

        Ok(ForwardingPredicates {
            empty: packet.mk_false(),
            routable,
            null_routed,
            arp_true,
            neighbor_unreachable,
            vrf_accept,
            vrf_not_accept,
        })
    }

    /// Destinations with a usable route in `node[vrf]`.
    pub fn routable(&self, node: &str, vrf: &str) -> &Bdd {
        lookup(&self.routable, node, vrf).unwrap_or(&self.empty)
    }

    /// Destinations null-routed in `node[vrf]`.
    pub fn null_routed(&self, node: &str, vrf: &str) -> &Bdd {
        lookup(&self.null_routed, node, vrf).unwrap_or(&self.empty)
    }

    /// Destinations owned by an interface of `node[vrf]`.
    pub fn vrf_accept(&self, node: &str, vrf: &str) -> &Bdd {
        lookup(&self.vrf_accept, node, vrf).unwrap_or(&self.empty)
    }

    /// Destinations not owned by any interface of `node[vrf]`.
    pub fn vrf_not_accept(&self, node: &str, vrf: &str) -> Bdd {
        match lookup(&self.vrf_not_accept, node, vrf) {
            Some(bdd) => bdd.clone(),
            None => self.empty.not(),
        }
    }

    /// All physical edges with an ARP fact, together with the destinations that resolve.
    pub fn arp_true_edges(&self) -> impl Iterator<Item = (&PhysicalEdge, &Bdd)> {
        self.arp_true.iter()
    }

    /// Iterate `(node, vrf, interface, destinations)` for every neighbor-unreachable fact.
    pub fn neighbor_unreachable(&self) -> impl Iterator<Item = (&str, &str, &str, &Bdd)> {
        self.neighbor_unreachable.iter().flat_map(|(node, vrfs)| {
            vrfs.iter().flat_map(move |(vrf, interfaces)| {
                interfaces.iter().map(move |(interface, bdd)| {
                    (node.as_str(), vrf.as_str(), interface.as_str(), bdd)
                })
            })
        })
    }

    /// Iterate `(node, vrf, destinations)` for every null-routed fact.
    pub fn null_routed_vrfs(&self) -> impl Iterator<Item = (&str, &str, &Bdd)> {
        self.null_routed.iter().flat_map(|(node, vrfs)| {
            vrfs.iter()
                .map(move |(vrf, bdd)| (node.as_str(), vrf.as_str(), bdd))
        })
    }
}

fn lookup<'a, T>(map: &'a NodeVrfMap<T>, node: &str, vrf: &str) -> Option<&'a T> {
    map.get(node).and_then(|vrfs| vrfs.get(vrf))
}

fn convert_vrf_facts(
    configs: &BTreeMap<String, Configuration>,
    facts: &NodeVrfMap<IpSpace>,
    to_bdd: &impl Fn(&IpSpace) -> Result<Bdd, ModelError>,
) -> Result<NodeVrfMap<Bdd>, ModelError> {
    let mut result = NodeVrfMap::new();
    for (node, vrfs) in facts {
        let mut converted = BTreeMap::new();
        for (vrf, space) in vrfs {
            check_vrf(configs, node, vrf)?;
            converted.insert(vrf.clone(), to_bdd(space)?);
        }
        result.insert(node.clone(), converted);
    }
    Ok(result)
}

/// A VRF accepts a packet if its destination is an address of one of its member interfaces.
fn compute_vrf_accept(
    packet: &PacketVariables,
    configs: &BTreeMap<String, Configuration>,
) -> Result<NodeVrfMap<Bdd>, ModelError> {
    let mut result = NodeVrfMap::new();
    for (node, config) in configs {
        let mut vrfs = BTreeMap::new();
        for (vrf_name, vrf) in &config.vrfs {
            let mut accept = packet.mk_false();
            for interface in &vrf.interfaces {
                let iface = config.interfaces.get(interface).ok_or_else(|| {
                    ModelError::UnknownInterface {
                        node: node.clone(),
                        interface: interface.clone(),
                    }
                })?;
                for address in &iface.addresses {
                    let owned = packet.mk_value(HeaderField::DstIp, u64::from(u32::from(*address)));
                    accept = accept.or(&owned);
                }
            }
            vrfs.insert(vrf_name.clone(), accept);
        }
        result.insert(node.clone(), vrfs);
    }
    Ok(result)
}

pub(crate) fn check_node<'a>(
    configs: &'a BTreeMap<String, Configuration>,
    node: &str,
) -> Result<&'a Configuration, ModelError> {
    configs
        .get(node)
        .ok_or_else(|| ModelError::UnknownNode(node.to_string()))
}

pub(crate) fn check_vrf(
    configs: &BTreeMap<String, Configuration>,
    node: &str,
    vrf: &str,
) -> Result<(), ModelError> {
    if check_node(configs, node)?.vrfs.contains_key(vrf) {
        Ok(())
    } else {
        Err(ModelError::UnknownVrf {
            node: node.to_string(),
            vrf: vrf.to_string(),
        })
    }
}

pub(crate) fn check_interface<'a>(
    configs: &'a BTreeMap<String, Configuration>,
    node: &str,
    interface: &str,
) -> Result<&'a Interface, ModelError> {
    check_node(configs, node)?
        .interfaces
        .get(interface)
        .ok_or_else(|| ModelError::UnknownInterface {
            node: node.to_string(),
            interface: interface.to_string(),
        })
}
