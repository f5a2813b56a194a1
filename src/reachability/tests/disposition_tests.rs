//! End-to-end dispositions of the two-node network (see `test_utils::two_node_network`).

use super::{build_graph, dst, protocol, solve, src};
use crate::graph::{GraphConfig, PipelineState, TransitionGraph};
use crate::header_space::{Coarsening, equivalent, is_subset};
use crate::model::{Acl, AclLine, HeaderMatch, Interface, IpSpace, Location, SourceNat};
use crate::roots::OriginAssignment;
use crate::test_utils::two_node_network::{A_ADDR, D, TCP, UDP, VRF, a_to_b, configs, facts};
use crate::test_utils::{init_logger, ip};
use std::collections::BTreeSet;

const X: &str = "8.8.8.8";

fn from_link(graph: &TransitionGraph) -> OriginAssignment {
    OriginAssignment::new().assign(
        vec![Location::interface_link("A", "a1")],
        graph.packet().mk_true(),
    )
}

fn from_vrf(graph: &TransitionGraph, node: &str) -> OriginAssignment {
    OriginAssignment::new().assign(vec![Location::vrf(node, VRF)], graph.packet().mk_true())
}

#[test]
fn tcp_is_accepted_and_udp_is_filtered() {
    init_logger();
    let graph = build_graph(&configs(), &facts(), GraphConfig::default());
    let packet = graph.packet();
    let tcp_or_udp = protocol(packet, TCP).or(&protocol(packet, UDP));
    let origins = OriginAssignment::new()
        .assign(vec![Location::interface_link("A", "a1")], tcp_or_udp);
    let result = solve(&graph, &origins, &IpSpace::Ip(ip(D)));

    let tcp_to_d = dst(packet, D).and(&protocol(packet, TCP));
    let udp_to_d = dst(packet, D).and(&protocol(packet, UDP));

    let accepted = result.get(&PipelineState::node_accept("B")).unwrap();
    assert!(equivalent(accepted, &tcp_to_d));
    let filtered = result.get(&PipelineState::node_drop_acl_in("A")).unwrap();
    assert!(equivalent(filtered, &udp_to_d));

    assert!(equivalent(&result.accepted(), &tcp_to_d));
    assert!(equivalent(&result.dropped(), &udp_to_d));
    assert!(!result.is_reached(&PipelineState::NeighborUnreachable));

    let dispositions = result
        .node_dispositions()
        .map(|(state, _)| state.clone())
        .collect::<BTreeSet<_>>();
    // `NodeDrop(A)` collects every per-reason drop on A.
    let expected = BTreeSet::from([
        PipelineState::node_accept("B"),
        PipelineState::node_drop_acl_in("A"),
        PipelineState::node_drop("A"),
    ]);
    assert_eq!(dispositions, expected);
}

#[test]
fn example_packets_are_reported() {
    let graph = build_graph(&configs(), &facts(), GraphConfig::default());
    let result = solve(&graph, &from_link(&graph), &IpSpace::Ip(ip(D)));

    let accepted = result
        .example_packet(&PipelineState::node_accept("B"))
        .unwrap();
    assert_eq!(accepted.dst_addr(), ip(D));
    assert_eq!(accepted.ip_protocol, TCP);

    let dropped = result
        .example_packet(&PipelineState::node_drop_acl_in("A"))
        .unwrap();
    assert_ne!(dropped.ip_protocol, TCP);

    assert!(
        result
            .example_packet(&PipelineState::node_drop_no_route("B"))
            .is_none()
    );
}

#[test]
fn only_reached_states_are_reported() {
    let graph = build_graph(&configs(), &facts(), GraphConfig::default());
    let result = solve(&graph, &from_link(&graph), &IpSpace::Ip(ip(D)));

    for (state, space) in result.iter() {
        assert!(!space.is_false(), "{state} reported with an empty space");
    }
    assert!(result.is_reached(&PipelineState::PreOutEdge(a_to_b())));
    assert!(!result.is_reached(&PipelineState::PreOutEdge(a_to_b().reversed())));
    assert!(!result.is_reached(&PipelineState::node_accept("A")));
    assert!(result.reached_space(&PipelineState::node_accept("A")).is_false());
}

#[test]
fn locally_owned_destination_is_accepted() {
    let graph = build_graph(&configs(), &facts(), GraphConfig::default());
    let result = solve(&graph, &from_vrf(&graph, "A"), &IpSpace::Ip(ip(A_ADDR)));

    assert!(equivalent(
        result.get(&PipelineState::node_accept("A")).unwrap(),
        &dst(graph.packet(), A_ADDR)
    ));
    assert!(!result.is_reached(&PipelineState::pre_out_vrf("A", VRF)));
}

#[test]
fn destination_without_route_is_dropped() {
    let graph = build_graph(&configs(), &facts(), GraphConfig::default());
    let result = solve(&graph, &from_vrf(&graph, "B"), &IpSpace::Ip(ip(X)));

    assert!(equivalent(
        result.get(&PipelineState::node_drop_no_route("B")).unwrap(),
        &dst(graph.packet(), X)
    ));
    assert!(equivalent(&result.dropped(), &dst(graph.packet(), X)));
    assert!(result.accepted().is_false());
}

#[test]
fn null_route_drops_before_egress() {
    let mut facts = facts();
    facts.set_routable(
        "A",
        VRF,
        IpSpace::Union(vec![IpSpace::Ip(ip(D)), IpSpace::Ip(ip(X))]),
    );
    facts.set_null_routed("A", VRF, IpSpace::Ip(ip(X)));
    facts.set_arp_true(a_to_b(), IpSpace::Ip(ip(D)));
    let graph = build_graph(&configs(), &facts, GraphConfig::default());
    let result = solve(&graph, &from_vrf(&graph, "A"), &IpSpace::Ip(ip(X)));

    let to_x = dst(graph.packet(), X);
    assert!(equivalent(
        result.get(&PipelineState::node_drop_null_route("A")).unwrap(),
        &to_x
    ));
    assert!(equivalent(&result.dropped(), &to_x));
    assert!(!result.is_reached(&PipelineState::PreOutEdge(a_to_b())));
    assert!(result.reached_states().all(|state| state.node() != Some("B")));
}

#[test]
fn unresolved_neighbor_is_reported() {
    let y = "10.9.9.9";
    let mut facts = facts();
    facts.set_routable(
        "A",
        VRF,
        IpSpace::Union(vec![IpSpace::Ip(ip(D)), IpSpace::Ip(ip(y))]),
    );
    facts.set_neighbor_unreachable("A", VRF, "a2", IpSpace::Ip(ip(y)));
    facts.set_arp_true(a_to_b(), IpSpace::Ip(ip(D)));
    let graph = build_graph(&configs(), &facts, GraphConfig::default());
    let destinations = IpSpace::Union(vec![IpSpace::Ip(ip(D)), IpSpace::Ip(ip(y))]);
    let result = solve(&graph, &from_vrf(&graph, "A"), &destinations);

    let to_y = dst(graph.packet(), y);
    let state = PipelineState::node_interface_neighbor_unreachable("A", "a2");
    assert!(equivalent(result.get(&state).unwrap(), &to_y));
    assert!(equivalent(&result.neighbor_unreachable(), &to_y));
    // D still reaches B.
    assert!(equivalent(&result.accepted(), &dst(graph.packet(), D)));
    assert!(result.dropped().is_false());
}

#[test]
fn outgoing_filter_sees_translated_sources() {
    init_logger();
    let pool = "203.0.113.1";
    let y = "10.9.9.9";

    // TCP leaving `A.a2` is translated into the pool, which the outgoing filter then denies.
    let mut configs = configs();
    let a = configs.get_mut("A").unwrap();
    a.add_acl(Acl::new(
        "not_pool",
        vec![
            AclLine::deny(HeaderMatch::any().with_src_ips(IpSpace::Ip(ip(pool)))),
            AclLine::permit(HeaderMatch::any()),
        ],
    ));
    a.add_interface(
        Interface::new("a2", VRF)
            .with_address(ip("10.0.0.1"))
            .with_source_nat(SourceNat::new("tcp_only", ip(pool), ip(pool)))
            .with_outgoing_filter("not_pool"),
    );

    let mut facts = facts();
    facts.set_routable(
        "A",
        VRF,
        IpSpace::Union(vec![IpSpace::Ip(ip(D)), IpSpace::Ip(ip(y))]),
    );
    facts.set_neighbor_unreachable("A", VRF, "a2", IpSpace::Ip(ip(y)));
    facts.set_arp_true(a_to_b(), IpSpace::Ip(ip(D)));
    let destinations = IpSpace::Union(vec![IpSpace::Ip(ip(D)), IpSpace::Ip(ip(y))]);

    let graph = build_graph(&configs, &facts, GraphConfig::default());
    let packet = graph.packet();
    let result = solve(&graph, &from_vrf(&graph, "A"), &destinations);

    let to_d = dst(packet, D);
    let from_pool = src(packet, pool);
    let tcp = protocol(packet, TCP);

    let dropped = to_d.and(&from_pool);
    assert!(equivalent(
        result.get(&PipelineState::node_drop_acl_out("A")).unwrap(),
        &dropped
    ));
    assert!(equivalent(&result.dropped(), &dropped));

    let accepted = to_d.and_not(&tcp).and_not(&from_pool);
    assert!(equivalent(
        result.get(&PipelineState::node_accept("B")).unwrap(),
        &accepted
    ));

    // No translation happens before the unreachable neighbor, only the filter.
    let unreachable = dst(packet, y).and_not(&from_pool);
    assert!(equivalent(
        result
            .get(&PipelineState::node_interface_neighbor_unreachable("A", "a2"))
            .unwrap(),
        &unreachable
    ));
    assert!(equivalent(&result.neighbor_unreachable(), &unreachable));

    let coarse_graph = build_graph(&configs, &facts, GraphConfig::new(Coarsening::DstIpOnly));
    let coarse = solve(&coarse_graph, &from_vrf(&coarse_graph, "A"), &destinations);
    for (state, space) in result.iter() {
        let projected = packet.project_to_dst_ip(space);
        assert!(is_subset(&projected, &coarse.reached_space(state)), "{state}");
    }
}

#[test]
fn forwarding_loop_terminates() {
    init_logger();
    // Both routers forward every destination they do not own to each other.
    let mut facts = facts();
    facts.set_routable("A", VRF, IpSpace::Universe);
    facts.set_routable("B", VRF, IpSpace::Universe);
    let graph = build_graph(&configs(), &facts, GraphConfig::default());

    let first = solve(&graph, &from_vrf(&graph, "A"), &IpSpace::Ip(ip(X)));
    let to_x = dst(graph.packet(), X);

    assert!(first.accepted().is_false());
    assert!(first.dropped().is_false());
    for state in [
        PipelineState::PreOutEdge(a_to_b()),
        PipelineState::PreOutEdge(a_to_b().reversed()),
        PipelineState::post_in_vrf("A", VRF),
        PipelineState::post_in_vrf("B", VRF),
    ] {
        assert!(equivalent(first.get(&state).unwrap(), &to_x), "{state}");
    }

    let second = solve(&graph, &from_vrf(&graph, "A"), &IpSpace::Ip(ip(X)));
    assert_eq!(
        first.reached_states().collect::<Vec<_>>(),
        second.reached_states().collect::<Vec<_>>()
    );
    for (state, space) in first.iter() {
        assert!(equivalent(space, second.get(state).unwrap()));
    }
}

#[test]
fn coarse_result_over_approximates_precise_result() {
    let precise_graph = build_graph(&configs(), &facts(), GraphConfig::default());
    let coarse_graph = build_graph(
        &configs(),
        &facts(),
        GraphConfig::new(Coarsening::DstIpOnly),
    );
    let destination = IpSpace::Ip(ip(D));
    let precise = solve(&precise_graph, &from_link(&precise_graph), &destination);
    let coarse = solve(&coarse_graph, &from_link(&coarse_graph), &destination);

    let packet = precise_graph.packet();
    for (state, space) in precise.iter() {
        let projected = packet.project_to_dst_ip(space);
        let coarse_space = coarse.reached_space(state);
        assert!(is_subset(&projected, &coarse_space), "{state}");
    }
    // The protocol filter is lost, so D is both accepted and filtered on A.
    let to_d = dst(packet, D);
    assert!(equivalent(&coarse.accepted(), &to_d));
    assert!(is_subset(
        &to_d,
        coarse.get(&PipelineState::node_drop_acl_in("A")).unwrap()
    ));
}
