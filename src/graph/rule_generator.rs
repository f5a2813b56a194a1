use crate::acl::CompiledAcl;
use crate::error::ModelError;
use crate::forwarding::{ForwardingPredicates, check_interface, check_vrf};
use crate::graph::{Edge, NatRule, PipelineState};
use crate::header_space::{Coarsening, HeaderField, PacketVariables};
use crate::model::{Configuration, Interface};
use biodivine_lib_bdd::Bdd;
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// One family of transitions of the forwarding pipeline.
type RuleFamily = fn(&RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError>;

/// Every family reads only the immutable inputs of the generator, so the families
/// can be evaluated in any order (or concurrently).
static RULE_FAMILIES: [(&str, RuleFamily); 17] = [
    ("OriginateInterfaceLink -> PreInInterface", originate_interface_link),
    ("OriginateVrf -> PostInVrf", originate_vrf),
    ("PreInInterface -> NodeDropAclIn", pre_in_interface_drop_acl_in),
    ("PreInInterface -> PostInVrf", pre_in_interface_post_in_vrf),
    ("PostInVrf -> NodeAccept", post_in_vrf_accept),
    ("PostInVrf -> NodeDropNoRoute", post_in_vrf_drop_no_route),
    ("PostInVrf -> PreOutVrf", post_in_vrf_pre_out_vrf),
    ("PreOutVrf -> NodeDropNullRoute", pre_out_vrf_drop_null_route),
    (
        "PreOutVrf -> NodeInterfaceNeighborUnreachable",
        pre_out_vrf_neighbor_unreachable,
    ),
    ("PreOutVrf -> PreOutEdge", pre_out_vrf_pre_out_edge),
    ("PreOutEdge -> PreOutEdgePostNat", pre_out_edge_post_nat),
    ("PreOutEdgePostNat -> NodeDropAclOut", post_nat_drop_acl_out),
    ("PreOutEdgePostNat -> PreInInterface", post_nat_pre_in_interface),
    ("NodeAccept -> Accept", node_accept_accept),
    ("NodeDrop* -> NodeDrop", node_drop_reasons),
    ("NodeDrop -> Drop", node_drop_drop),
    (
        "NodeInterfaceNeighborUnreachable -> NeighborUnreachable",
        node_neighbor_unreachable,
    ),
];

/// Emits the guarded transitions of the forwarding pipeline of every device.
///
/// The generator does not filter unsatisfiable guards, this is done when the
/// edges are assembled into a graph.
pub(crate) struct RuleGenerator<'a> {
    pub packet: &'a PacketVariables,
    pub configs: &'a BTreeMap<String, Configuration>,
    pub acls: &'a BTreeMap<String, BTreeMap<String, CompiledAcl>>,
    pub forwarding: &'a ForwardingPredicates,
    pub coarsening: Coarsening,
}

impl RuleGenerator<'_> {
    /// Run all rule families and concatenate their edges.
    pub fn generate(&self, parallel: bool) -> Result<Vec<Edge>, ModelError> {
        let batches = if parallel {
            RULE_FAMILIES
                .as_slice()
                .par_iter()
                .map(|(name, family)| self.run_family(name, *family))
                .collect::<Result<Vec<_>, ModelError>>()?
        } else {
            RULE_FAMILIES
                .iter()
                .map(|(name, family)| self.run_family(name, *family))
                .collect::<Result<Vec<_>, ModelError>>()?
        };
        Ok(batches.into_iter().flatten().collect())
    }

    fn run_family(&self, name: &str, family: RuleFamily) -> Result<Vec<Edge>, ModelError> {
        let edges = family(self)?;
        debug!("Rule family `{name}` produced {} edges.", edges.len());
        Ok(edges)
    }

    fn one(&self) -> Bdd {
        self.packet.mk_true()
    }

    fn acl(&self, node: &str, name: &str) -> Result<&CompiledAcl, ModelError> {
        self.acls
            .get(node)
            .and_then(|acls| acls.get(name))
            .ok_or_else(|| ModelError::UnknownAcl {
                node: node.to_string(),
                acl: name.to_string(),
            })
    }

    /// Packets admitted by the incoming filter of an interface (everything if there is none).
    fn incoming_permit(&self, node: &str, interface: &Interface) -> Result<Bdd, ModelError> {
        match &interface.incoming_filter {
            Some(name) => Ok(self.acl(node, name)?.permit().clone()),
            None => Ok(self.one()),
        }
    }

    /// Packets admitted by the outgoing filter of an interface (everything if there is none).
    fn outgoing_permit(&self, node: &str, interface: &Interface) -> Result<Bdd, ModelError> {
        match &interface.outgoing_filter {
            Some(name) => Ok(self.acl(node, name)?.permit().clone()),
            None => Ok(self.one()),
        }
    }

    /// Iterate `(node, interface)` over every interface that is a member of some VRF.
    fn vrf_interfaces(&self) -> Result<Vec<(&str, &Interface)>, ModelError> {
        let mut result = Vec::new();
        for (node, config) in self.configs {
            for vrf in config.vrfs.values() {
                for name in &vrf.interfaces {
                    let interface = check_interface(self.configs, node, name)?;
                    check_vrf(self.configs, node, &interface.vrf)?;
                    result.push((node.as_str(), interface));
                }
            }
        }
        Ok(result)
    }

    fn vrfs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.configs.iter().flat_map(|(node, config)| {
            config
                .vrfs
                .keys()
                .map(move |vrf| (node.as_str(), vrf.as_str()))
        })
    }

    fn interfaces(&self) -> impl Iterator<Item = (&str, &Interface)> {
        self.configs.iter().flat_map(|(node, config)| {
            config
                .interfaces
                .values()
                .map(move |interface| (node.as_str(), interface))
        })
    }

    fn nodes(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(|it| it.as_str())
    }

    fn source_nat_rules(
        &self,
        node: &str,
        interface: &Interface,
    ) -> Result<Vec<NatRule>, ModelError> {
        let mut rules = Vec::with_capacity(interface.source_nats.len());
        for nat in &interface.source_nats {
            let matches = self.acl(node, &nat.acl)?.permit().clone();
            let (first, last) = (u32::from(nat.pool_first), u32::from(nat.pool_last));
            if first > last {
                return Err(ModelError::InvalidRange {
                    field: HeaderField::SrcIp,
                    first: u64::from(first),
                    last: u64::from(last),
                });
            }
            let pool = self
                .packet
                .mk_range(HeaderField::SrcIp, u64::from(first), u64::from(last));
            rules.push(NatRule::new(matches, self.coarsening.apply(self.packet, &pool)));
        }
        Ok(rules)
    }
}

fn originate_interface_link(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .interfaces()
        .map(|(node, interface)| {
            Edge::new(
                PipelineState::originate_interface_link(node, &interface.name),
                PipelineState::pre_in_interface(node, &interface.name),
                rules.one(),
            )
        })
        .collect())
}

fn originate_vrf(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .vrfs()
        .map(|(node, vrf)| {
            Edge::new(
                PipelineState::originate_vrf(node, vrf),
                PipelineState::post_in_vrf(node, vrf),
                rules.one(),
            )
        })
        .collect())
}

fn pre_in_interface_drop_acl_in(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    let mut edges = Vec::new();
    for (node, interface) in rules.vrf_interfaces()? {
        if let Some(name) = &interface.incoming_filter {
            edges.push(Edge::new(
                PipelineState::pre_in_interface(node, &interface.name),
                PipelineState::node_drop_acl_in(node),
                rules.acl(node, name)?.deny().clone(),
            ));
        }
    }
    Ok(edges)
}

fn pre_in_interface_post_in_vrf(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    let mut edges = Vec::new();
    for (node, interface) in rules.vrf_interfaces()? {
        edges.push(Edge::new(
            PipelineState::pre_in_interface(node, &interface.name),
            PipelineState::post_in_vrf(node, &interface.vrf),
            rules.incoming_permit(node, interface)?,
        ));
    }
    Ok(edges)
}

fn post_in_vrf_accept(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .vrfs()
        .map(|(node, vrf)| {
            Edge::new(
                PipelineState::post_in_vrf(node, vrf),
                PipelineState::node_accept(node),
                rules.forwarding.vrf_accept(node, vrf).clone(),
            )
        })
        .collect())
}

fn post_in_vrf_drop_no_route(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .vrfs()
        .map(|(node, vrf)| {
            let not_accept = rules.forwarding.vrf_not_accept(node, vrf);
            let routable = rules.forwarding.routable(node, vrf);
            Edge::new(
                PipelineState::post_in_vrf(node, vrf),
                PipelineState::node_drop_no_route(node),
                not_accept.and_not(routable),
            )
        })
        .collect())
}

fn post_in_vrf_pre_out_vrf(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .vrfs()
        .map(|(node, vrf)| {
            let not_accept = rules.forwarding.vrf_not_accept(node, vrf);
            let routable = rules.forwarding.routable(node, vrf);
            Edge::new(
                PipelineState::post_in_vrf(node, vrf),
                PipelineState::pre_out_vrf(node, vrf),
                not_accept.and(routable),
            )
        })
        .collect())
}

fn pre_out_vrf_drop_null_route(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .forwarding
        .null_routed_vrfs()
        .map(|(node, vrf, null_routed)| {
            Edge::new(
                PipelineState::pre_out_vrf(node, vrf),
                PipelineState::node_drop_null_route(node),
                null_routed.clone(),
            )
        })
        .collect())
}

fn pre_out_vrf_neighbor_unreachable(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    let mut edges = Vec::new();
    for (node, vrf, name, unreachable) in rules.forwarding.neighbor_unreachable() {
        let interface = check_interface(rules.configs, node, name)?;
        let permit = rules.outgoing_permit(node, interface)?;
        edges.push(Edge::new(
            PipelineState::pre_out_vrf(node, vrf),
            PipelineState::node_interface_neighbor_unreachable(node, name),
            unreachable.and(&permit),
        ));
    }
    Ok(edges)
}

fn pre_out_vrf_pre_out_edge(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    let mut edges = Vec::new();
    for (edge, arp_true) in rules.forwarding.arp_true_edges() {
        let interface = check_interface(rules.configs, &edge.node1, &edge.interface1)?;
        check_vrf(rules.configs, &edge.node1, &interface.vrf)?;
        edges.push(Edge::new(
            PipelineState::pre_out_vrf(&edge.node1, &interface.vrf),
            PipelineState::PreOutEdge(edge.clone()),
            arp_true.clone(),
        ));
    }
    Ok(edges)
}

fn pre_out_edge_post_nat(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    let mut edges = Vec::new();
    for (edge, _) in rules.forwarding.arp_true_edges() {
        let interface = check_interface(rules.configs, &edge.node1, &edge.interface1)?;
        let nat = rules.source_nat_rules(&edge.node1, interface)?;
        edges.push(Edge::with_source_nat(
            PipelineState::PreOutEdge(edge.clone()),
            PipelineState::PreOutEdgePostNat(edge.clone()),
            rules.one(),
            nat,
        ));
    }
    Ok(edges)
}

fn post_nat_drop_acl_out(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    let mut edges = Vec::new();
    for (edge, _) in rules.forwarding.arp_true_edges() {
        let interface = check_interface(rules.configs, &edge.node1, &edge.interface1)?;
        if let Some(name) = &interface.outgoing_filter {
            edges.push(Edge::new(
                PipelineState::PreOutEdgePostNat(edge.clone()),
                PipelineState::node_drop_acl_out(&edge.node1),
                rules.acl(&edge.node1, name)?.deny().clone(),
            ));
        }
    }
    Ok(edges)
}

fn post_nat_pre_in_interface(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    let mut edges = Vec::new();
    for (edge, _) in rules.forwarding.arp_true_edges() {
        let interface = check_interface(rules.configs, &edge.node1, &edge.interface1)?;
        edges.push(Edge::new(
            PipelineState::PreOutEdgePostNat(edge.clone()),
            PipelineState::pre_in_interface(&edge.node2, &edge.interface2),
            rules.outgoing_permit(&edge.node1, interface)?,
        ));
    }
    Ok(edges)
}

fn node_accept_accept(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .nodes()
        .map(|node| Edge::new(PipelineState::node_accept(node), PipelineState::Accept, rules.one()))
        .collect())
}

fn node_drop_reasons(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .nodes()
        .flat_map(|node| {
            [
                PipelineState::node_drop_acl_in(node),
                PipelineState::node_drop_acl_out(node),
                PipelineState::node_drop_no_route(node),
                PipelineState::node_drop_null_route(node),
            ]
            .into_iter()
            .map(move |reason| Edge::new(reason, PipelineState::node_drop(node), rules.one()))
        })
        .collect())
}

fn node_drop_drop(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .nodes()
        .map(|node| Edge::new(PipelineState::node_drop(node), PipelineState::Drop, rules.one()))
        .collect())
}

fn node_neighbor_unreachable(rules: &RuleGenerator<'_>) -> Result<Vec<Edge>, ModelError> {
    Ok(rules
        .interfaces()
        .map(|(node, interface)| {
            Edge::new(
                PipelineState::node_interface_neighbor_unreachable(node, &interface.name),
                PipelineState::NeighborUnreachable,
                rules.one(),
            )
        })
        .collect())
}
