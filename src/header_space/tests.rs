use crate::error::ModelError;
use crate::header_space::{
    Coarsening, HeaderField, Packet, PacketVariables, TcpFlag, equivalent, is_subset,
};
use crate::model::IpSpace;
use crate::test_utils::ip;
use biodivine_lib_bdd::Bdd;

fn packet_with(field: HeaderField, value: u64) -> Packet {
    let mut packet = Packet::default();
    match field {
        HeaderField::DstIp => packet.dst_ip = value as u32,
        HeaderField::SrcIp => packet.src_ip = value as u32,
        HeaderField::DstPort => packet.dst_port = value as u16,
        HeaderField::SrcPort => packet.src_port = value as u16,
        HeaderField::IpProtocol => packet.ip_protocol = value as u8,
        HeaderField::IcmpType => packet.icmp_type = value as u8,
        HeaderField::IcmpCode => packet.icmp_code = value as u8,
        HeaderField::TcpFlags => packet.tcp_flags = value as u8,
    }
    packet
}

/// Fraction of the full header space covered by `bdd`, scaled to the domain of one field.
fn field_cardinality(vars: &PacketVariables, field: HeaderField, bdd: &Bdd) -> f64 {
    let domain = 2f64.powi(i32::from(field.width()));
    bdd.cardinality() / vars.mk_true().cardinality() * domain
}

#[test]
fn variable_layout_follows_field_order() {
    let vars = PacketVariables::new();
    assert_eq!(vars.variable_set().num_vars(), 126);
    let dst = vars.field_variables(HeaderField::DstIp);
    let src = vars.field_variables(HeaderField::SrcIp);
    assert_eq!(dst.len(), 32);
    assert_eq!(vars.variable_set().name_of(dst[0]), "dst_ip_0");
    assert_eq!(vars.variable_set().name_of(src[31]), "src_ip_31");
    assert_eq!(vars.field_variables(HeaderField::TcpFlags).len(), 6);
}

#[test]
fn range_contains_exactly_its_bounds() {
    let vars = PacketVariables::new();
    let range = vars.mk_range(HeaderField::DstPort, 10, 20);

    for port in [10, 15, 20] {
        assert!(vars.contains(&range, &packet_with(HeaderField::DstPort, port)));
    }
    for port in [0, 9, 21, 65535] {
        assert!(!vars.contains(&range, &packet_with(HeaderField::DstPort, port)));
    }
    assert_eq!(field_cardinality(&vars, HeaderField::DstPort, &range), 11.0);
}

#[test]
fn range_edge_cases() {
    let vars = PacketVariables::new();
    let field = HeaderField::SrcPort;

    assert!(vars.mk_range(field, 20, 10).is_false());
    assert!(equivalent(&vars.mk_range(field, 0, 65535), &vars.mk_true()));
    assert!(equivalent(&vars.mk_range(field, 443, 443), &vars.mk_value(field, 443)));
    assert!(equivalent(
        &vars.mk_leq(field, 99).or(&vars.mk_geq(field, 100)),
        &vars.mk_true()
    ));
    assert!(vars.mk_leq(field, 99).and(&vars.mk_geq(field, 100)).is_false());
}

#[test]
fn prefix_matches_leading_bits() {
    let vars = PacketVariables::new();
    let net = u64::from(u32::from(ip("10.1.0.0")));
    let prefix = vars.mk_prefix(HeaderField::DstIp, net, 16);

    let inside = u64::from(u32::from(ip("10.1.255.7")));
    let outside = u64::from(u32::from(ip("10.2.0.0")));
    assert!(vars.contains(&prefix, &packet_with(HeaderField::DstIp, inside)));
    assert!(!vars.contains(&prefix, &packet_with(HeaderField::DstIp, outside)));
    assert_eq!(
        field_cardinality(&vars, HeaderField::DstIp, &prefix),
        65536.0
    );

    // A zero-length prefix is the whole space.
    assert!(equivalent(&vars.mk_prefix(HeaderField::DstIp, net, 0), &vars.mk_true()));
}

#[test]
fn tcp_flags_are_independent_bits() {
    let vars = PacketVariables::new();
    let syn = vars.mk_tcp_flag(TcpFlag::Syn, true);
    let ack = vars.mk_tcp_flag(TcpFlag::Ack, true);
    let both = syn.and(&ack);

    assert!(!both.is_false());
    assert!(is_subset(&both, &syn));
    assert!(!is_subset(&syn, &both));
    assert!(syn.and(&vars.mk_tcp_flag(TcpFlag::Syn, false)).is_false());
}

#[test]
fn example_packet_decodes_witness() {
    let vars = PacketVariables::new();
    let expected = Packet {
        dst_ip: u32::from(ip("10.0.0.2")),
        src_ip: u32::from(ip("192.168.1.5")),
        dst_port: 443,
        src_port: 50000,
        ip_protocol: 6,
        icmp_type: 0,
        icmp_code: 0,
        tcp_flags: 0b000010,
    };
    let singleton = vars.mk_packet(&expected);

    assert_eq!(singleton.cardinality(), 1.0);
    assert_eq!(vars.example_packet(&singleton), Some(expected.clone()));
    assert!(vars.contains(&singleton, &expected));
    assert_eq!(vars.example_packet(&vars.mk_false()), None);
}

#[test]
fn example_packet_lies_in_space() {
    let vars = PacketVariables::new();
    let space = vars
        .mk_range(HeaderField::DstPort, 8000, 8080)
        .and(&vars.mk_value(HeaderField::IpProtocol, 17));
    let witness = vars.example_packet(&space).unwrap();

    assert!(vars.contains(&space, &witness));
    assert!((8000..=8080).contains(&witness.dst_port));
    assert_eq!(witness.ip_protocol, 17);
}

#[test]
fn ip_space_conversion() {
    let vars = PacketVariables::new();
    let field = HeaderField::SrcIp;

    let prefix = vars
        .mk_ip_space(field, &IpSpace::prefix(ip("10.0.0.0"), 24))
        .unwrap();
    let range = vars
        .mk_ip_space(field, &IpSpace::range(ip("10.0.0.0"), ip("10.0.0.255")))
        .unwrap();
    assert!(equivalent(&prefix, &range));

    let union = vars
        .mk_ip_space(
            field,
            &IpSpace::Union(vec![
                IpSpace::prefix(ip("10.0.0.0"), 25),
                IpSpace::prefix(ip("10.0.0.128"), 25),
            ]),
        )
        .unwrap();
    assert!(equivalent(&prefix, &union));

    let difference = vars
        .mk_ip_space(
            field,
            &IpSpace::difference(IpSpace::prefix(ip("10.0.0.0"), 24), ip("10.0.0.1").into()),
        )
        .unwrap();
    assert!(is_subset(&difference, &prefix));
    assert_eq!(field_cardinality(&vars, field, &difference), 255.0);

    assert!(vars.mk_ip_space(field, &IpSpace::Empty).unwrap().is_false());
    assert!(equivalent(
        &vars.mk_ip_space(field, &IpSpace::Universe).unwrap(),
        &vars.mk_true()
    ));
}

#[test]
fn malformed_ip_spaces_are_rejected() {
    let vars = PacketVariables::new();

    let long_prefix = vars.mk_ip_space(HeaderField::DstIp, &IpSpace::prefix(ip("10.0.0.0"), 33));
    assert_eq!(long_prefix.unwrap_err(), ModelError::InvalidPrefixLength(33));

    let inverted = vars.mk_ip_space(
        HeaderField::DstIp,
        &IpSpace::range(ip("10.0.0.9"), ip("10.0.0.1")),
    );
    assert!(matches!(
        inverted,
        Err(ModelError::InvalidRange {
            field: HeaderField::DstIp,
            ..
        })
    ));

    // Errors inside composite spaces propagate.
    let nested = vars.mk_ip_space(
        HeaderField::DstIp,
        &IpSpace::Union(vec![IpSpace::Universe, IpSpace::prefix(ip("10.0.0.0"), 40)]),
    );
    assert_eq!(nested.unwrap_err(), ModelError::InvalidPrefixLength(40));
}

#[test]
fn dst_ip_coarsening_forgets_other_fields() {
    let vars = PacketVariables::new();
    let dst = vars.mk_value(HeaderField::DstIp, u64::from(u32::from(ip("10.0.0.2"))));
    let space = dst
        .and(&vars.mk_value(HeaderField::IpProtocol, 6))
        .and(&vars.mk_range(HeaderField::DstPort, 22, 22));

    assert!(equivalent(&Coarsening::Precise.apply(&vars, &space), &space));
    let coarse = Coarsening::DstIpOnly.apply(&vars, &space);
    assert!(equivalent(&coarse, &dst));
    assert!(is_subset(&space, &coarse));
}

#[test]
fn forget_field_removes_one_constraint() {
    let vars = PacketVariables::new();
    let src = vars.mk_value(HeaderField::SrcIp, 1);
    let proto = vars.mk_value(HeaderField::IpProtocol, 17);
    let forgotten = vars.forget_field(&src.and(&proto), HeaderField::SrcIp);
    assert!(equivalent(&forgotten, &proto));
}
