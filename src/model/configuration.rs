use crate::header_space::TcpFlag;
use crate::model::IpSpace;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

/// The vendor-independent configuration of one device.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    pub hostname: String,
    pub interfaces: BTreeMap<String, Interface>,
    pub vrfs: BTreeMap<String, Vrf>,
    pub acls: BTreeMap<String, Acl>,
}

/// A layer-3 interface. The interface belongs to exactly one VRF.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interface {
    pub name: String,
    pub vrf: String,
    /// Addresses owned by this interface. Packets destined to these addresses are accepted
    /// by the owning VRF.
    pub addresses: Vec<Ipv4Addr>,
    /// Name of the ACL applied to packets entering through this interface.
    pub incoming_filter: Option<String>,
    /// Name of the ACL applied to packets leaving through this interface.
    pub outgoing_filter: Option<String>,
    /// Source NAT rules applied on egress, in priority order.
    pub source_nats: Vec<SourceNat>,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vrf {
    pub name: String,
    pub interfaces: BTreeSet<String>,
}

/// Rewrite the source IP of packets permitted by `acl` into the pool `pool_first..=pool_last`.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceNat {
    pub acl: String,
    pub pool_first: Ipv4Addr,
    pub pool_last: Ipv4Addr,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Acl {
    pub name: String,
    pub lines: Vec<AclLine>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineAction {
    Permit,
    Deny,
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclLine {
    pub action: LineAction,
    pub matches: HeaderMatch,
}

/// Inclusive port range.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortRange {
    pub first: u16,
    pub last: u16,
}

/// The match condition of an ACL line.
///
/// Different fields are combined by conjunction; the alternatives listed for one field
/// are combined by disjunction. A field without constraints (`None` or an empty list)
/// matches anything.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderMatch {
    pub src_ips: Option<IpSpace>,
    pub dst_ips: Option<IpSpace>,
    pub src_ports: Vec<PortRange>,
    pub dst_ports: Vec<PortRange>,
    pub ip_protocols: Vec<u8>,
    pub icmp_types: Vec<u8>,
    pub icmp_codes: Vec<u8>,
    /// Required values of individual TCP flags (all must hold).
    pub tcp_flags: Vec<(TcpFlag, bool)>,
}

impl Configuration {
    pub fn new(hostname: &str) -> Configuration {
        Configuration {
            hostname: hostname.to_string(),
            ..Default::default()
        }
    }

    /// Add an interface and register it as a member of its VRF (creating the VRF if needed).
    pub fn add_interface(&mut self, interface: Interface) {
        self.vrfs
            .entry(interface.vrf.clone())
            .or_insert_with(|| Vrf::new(&interface.vrf))
            .interfaces
            .insert(interface.name.clone());
        self.interfaces.insert(interface.name.clone(), interface);
    }

    pub fn add_vrf(&mut self, vrf: Vrf) {
        self.vrfs.insert(vrf.name.clone(), vrf);
    }

    pub fn add_acl(&mut self, acl: Acl) {
        self.acls.insert(acl.name.clone(), acl);
    }
}

impl Interface {
    pub fn new(name: &str, vrf: &str) -> Interface {
        Interface {
            name: name.to_string(),
            vrf: vrf.to_string(),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: Ipv4Addr) -> Interface {
        self.addresses.push(address);
        self
    }

    pub fn with_incoming_filter(mut self, acl: &str) -> Interface {
        self.incoming_filter = Some(acl.to_string());
        self
    }

    pub fn with_outgoing_filter(mut self, acl: &str) -> Interface {
        self.outgoing_filter = Some(acl.to_string());
        self
    }

    pub fn with_source_nat(mut self, nat: SourceNat) -> Interface {
        self.source_nats.push(nat);
        self
    }
}

impl Vrf {
    pub fn new(name: &str) -> Vrf {
        Vrf {
            name: name.to_string(),
            interfaces: BTreeSet::new(),
        }
    }
}

impl SourceNat {
    pub fn new(acl: &str, pool_first: Ipv4Addr, pool_last: Ipv4Addr) -> SourceNat {
        SourceNat {
            acl: acl.to_string(),
            pool_first,
            pool_last,
        }
    }
}

impl Acl {
    pub fn new(name: &str, lines: Vec<AclLine>) -> Acl {
        Acl {
            name: name.to_string(),
            lines,
        }
    }
}

impl AclLine {
    pub fn permit(matches: HeaderMatch) -> AclLine {
        AclLine {
            action: LineAction::Permit,
            matches,
        }
    }

    pub fn deny(matches: HeaderMatch) -> AclLine {
        AclLine {
            action: LineAction::Deny,
            matches,
        }
    }
}

impl PortRange {
    pub fn new(first: u16, last: u16) -> PortRange {
        PortRange { first, last }
    }

    pub fn single(port: u16) -> PortRange {
        PortRange::new(port, port)
    }
}

impl HeaderMatch {
    /// Matches every packet.
    pub fn any() -> HeaderMatch {
        HeaderMatch::default()
    }

    pub fn protocols(protocols: &[u8]) -> HeaderMatch {
        HeaderMatch {
            ip_protocols: protocols.to_vec(),
            ..Default::default()
        }
    }

    pub fn with_src_ips(mut self, space: IpSpace) -> HeaderMatch {
        self.src_ips = Some(space);
        self
    }

    pub fn with_dst_ips(mut self, space: IpSpace) -> HeaderMatch {
        self.dst_ips = Some(space);
        self
    }

    pub fn with_dst_ports(mut self, ranges: &[PortRange]) -> HeaderMatch {
        self.dst_ports = ranges.to_vec();
        self
    }

    pub fn with_src_ports(mut self, ranges: &[PortRange]) -> HeaderMatch {
        self.src_ports = ranges.to_vec();
        self
    }

    pub fn with_tcp_flag(mut self, flag: TcpFlag, value: bool) -> HeaderMatch {
        self.tcp_flags.push((flag, value));
        self
    }
}
