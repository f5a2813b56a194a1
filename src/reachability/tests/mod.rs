mod disposition_tests;

use crate::graph::{GraphConfig, TransitionGraph};
use crate::header_space::{HeaderField, PacketVariables};
use crate::model::{Configuration, ForwardingFacts, IpSpace};
use crate::reachability::{Reachability, ReachabilityResult};
use crate::roots::{OriginAssignment, RootAssignment};
use crate::test_utils::ip;
use biodivine_lib_bdd::Bdd;
use computation_process::Algorithm;
use std::collections::BTreeMap;
use std::sync::Arc;

fn build_graph(
    configs: &BTreeMap<String, Configuration>,
    facts: &ForwardingFacts,
    config: GraphConfig,
) -> Arc<TransitionGraph> {
    Arc::new(TransitionGraph::build(configs, facts, &config).unwrap())
}

/// Run a query constrained to destinations in `destination`.
fn solve(
    graph: &Arc<TransitionGraph>,
    origins: &OriginAssignment,
    destination: &IpSpace,
) -> ReachabilityResult {
    let destination = graph
        .packet()
        .mk_ip_space(HeaderField::DstIp, destination)
        .unwrap();
    let roots = RootAssignment::resolve(graph, origins, &destination).unwrap();
    Reachability::run(graph, roots).unwrap()
}

fn dst(packet: &PacketVariables, address: &str) -> Bdd {
    packet.mk_value(HeaderField::DstIp, u64::from(u32::from(ip(address))))
}

fn src(packet: &PacketVariables, address: &str) -> Bdd {
    packet.mk_value(HeaderField::SrcIp, u64::from(u32::from(ip(address))))
}

fn protocol(packet: &PacketVariables, protocol: u8) -> Bdd {
    packet.mk_value(HeaderField::IpProtocol, u64::from(protocol))
}
