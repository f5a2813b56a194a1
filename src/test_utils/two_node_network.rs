//! A small two-router snapshot used by most tests.
//!
//! ```text
//!            (tcp_only)
//!   host --- a1 [A] a2 ------ b1 [B] b2
//! ```
//!
//! - Both nodes use a single VRF called `default`.
//! - `A.a1` has the incoming filter `tcp_only` (permit IP protocol 6, deny the rest).
//! - `B.b1` owns the address [`D`], `A.a1` owns [`A_ADDR`]; `B.b2` has no address.
//! - The link `A.a2 <-> B.b1` resolves ARP for every destination, in both directions.
//! - Both nodes have a route to [`D`].

use crate::model::{
    Acl, AclLine, Configuration, ForwardingFacts, HeaderMatch, Interface, IpSpace, PhysicalEdge,
};
use crate::test_utils::ip;
use std::collections::BTreeMap;

pub const VRF: &str = "default";
pub const D: &str = "10.0.0.2";
pub const A_ADDR: &str = "192.168.0.1";
pub const TCP: u8 = 6;
pub const UDP: u8 = 17;

/// Node configurations of the two-node network.
pub fn configs() -> BTreeMap<String, Configuration> {
    let mut a = Configuration::new("A");
    a.add_acl(Acl::new(
        "tcp_only",
        vec![AclLine::permit(HeaderMatch::protocols(&[TCP]))],
    ));
    a.add_interface(
        Interface::new("a1", VRF)
            .with_address(ip(A_ADDR))
            .with_incoming_filter("tcp_only"),
    );
    a.add_interface(Interface::new("a2", VRF).with_address(ip("10.0.0.1")));

    let mut b = Configuration::new("B");
    b.add_interface(Interface::new("b1", VRF).with_address(ip(D)));
    b.add_interface(Interface::new("b2", VRF));

    BTreeMap::from([("A".to_string(), a), ("B".to_string(), b)])
}

/// The `A.a2 -> B.b1` edge.
pub fn a_to_b() -> PhysicalEdge {
    PhysicalEdge::new("A", "a2", "B", "b1")
}

/// Forwarding facts of the two-node network.
pub fn facts() -> ForwardingFacts {
    let mut facts = ForwardingFacts::default();
    facts.set_arp_true(a_to_b(), IpSpace::Universe);
    facts.set_arp_true(a_to_b().reversed(), IpSpace::Universe);
    facts.set_routable("A", VRF, IpSpace::Ip(ip(D)));
    facts.set_routable("B", VRF, IpSpace::Ip(ip(D)));
    facts
}
