//! Compilation of ordered ACLs into header predicates.
//!
//! An ACL is a list of lines evaluated top to bottom: the first line whose match condition
//! accepts a packet decides the outcome, and a packet matched by no line is denied. The
//! compiler reproduces this exactly by folding the lines while tracking the set of packets
//! that no earlier line has matched yet.

use crate::error::ModelError;
use crate::header_space::{Coarsening, HeaderField, PacketVariables};
use crate::log_space;
use crate::model::{Acl, Configuration, HeaderMatch, LineAction, PortRange};
use biodivine_lib_bdd::Bdd;
use log::{debug, trace};
use std::collections::BTreeMap;


/// The permit/deny partition of the header space induced by one ACL.
#[derive(Clone, Debug)]
pub struct CompiledAcl {
    permit: Bdd,
    deny: Bdd,
}

impl CompiledAcl {
    /// Packets permitted by the ACL.
    pub fn permit(&self) -> &Bdd {
        &self.permit
    }

    /// Packets denied by the ACL (explicitly or by the implicit default).
    pub fn deny(&self) -> &Bdd {
        &self.deny
    }

    /// Apply a [`Coarsening`] to both halves of the partition.
    ///
    /// With [`Coarsening::DstIpOnly`], the halves are projected independently and may overlap.
    pub fn coarsen(&self, packet: &PacketVariables, coarsening: Coarsening) -> CompiledAcl {
        CompiledAcl {
            permit: coarsening.apply(packet, &self.permit),
            deny: coarsening.apply(packet, &self.deny),
        }
    }
}

/// Turns [`HeaderMatch`] conditions and whole [`Acl`] objects into predicates.
pub struct AclCompiler<'a> {
    packet: &'a PacketVariables,
}

impl<'a> AclCompiler<'a> {
    pub fn new(packet: &'a PacketVariables) -> AclCompiler<'a> {
        AclCompiler { packet }
    }

    /// Compile the match condition of a single ACL line.
    pub fn compile_match(&self, matches: &HeaderMatch) -> Result<Bdd, ModelError> {
        let packet = self.packet;
        let mut result = packet.mk_true();

        if let Some(space) = &matches.src_ips {
            result = result.and(&packet.mk_ip_space(HeaderField::SrcIp, space)?);
        }
        if let Some(space) = &matches.dst_ips {
            result = result.and(&packet.mk_ip_space(HeaderField::DstIp, space)?);
        }
        result = result.and(&self.compile_ports(HeaderField::SrcPort, &matches.src_ports)?);
        result = result.and(&self.compile_ports(HeaderField::DstPort, &matches.dst_ports)?);
        result = result.and(&self.compile_values(HeaderField::IpProtocol, &matches.ip_protocols));
        result = result.and(&self.compile_values(HeaderField::IcmpType, &matches.icmp_types));
        result = result.and(&self.compile_values(HeaderField::IcmpCode, &matches.icmp_codes));
        for (flag, value) in &matches.tcp_flags {
            result = result.and(&packet.mk_tcp_flag(*flag, *value));
        }

        Ok(result)
    }

    /// Fold already compiled lines using first-match, default-deny semantics.
    pub fn compile_lines(&self, lines: &[(LineAction, Bdd)]) -> CompiledAcl {
        let mut remaining = self.packet.mk_true();
        let mut permit = self.packet.mk_false();
        for (action, matches) in lines {
            if *action == LineAction::Permit {
                permit = permit.or(&matches.and(&remaining));
            }
            remaining = remaining.and_not(matches);
            if remaining.is_false() {
                // Lines below are shadowed.
                break;
            }
        }
        CompiledAcl {
            deny: permit.not(),
            permit,
        }
    }

    /// Compile an ACL into its permit/deny partition.
    pub fn compile(&self, acl: &Acl) -> Result<CompiledAcl, ModelError> {
        let lines = acl
            .lines
            .iter()
            .map(|line| Ok((line.action, self.compile_match(&line.matches)?)))
            .collect::<Result<Vec<_>, ModelError>>()?;
        let compiled = self.compile_lines(&lines);
        trace!(
            "Compiled ACL `{}` with {} lines (permit: {}).",
            acl.name,
            lines.len(),
            log_space(compiled.permit())
        );
        Ok(compiled)
    }

    fn compile_ports(&self, field: HeaderField, ranges: &[PortRange]) -> Result<Bdd, ModelError> {
        if ranges.is_empty() {
            return Ok(self.packet.mk_true());
        }
        let mut result = self.packet.mk_false();
        for range in ranges {
            if range.first > range.last {
                return Err(ModelError::InvalidRange {
                    field,
                    first: u64::from(range.first),
                    last: u64::from(range.last),
                });
            }
            let space = self
                .packet
                .mk_range(field, u64::from(range.first), u64::from(range.last));
            result = result.or(&space);
        }
        Ok(result)
    }

    fn compile_values(&self, field: HeaderField, values: &[u8]) -> Bdd {
        if values.is_empty() {
            return self.packet.mk_true();
        }
        values.iter().fold(self.packet.mk_false(), |acc, value| {
            acc.or(&self.packet.mk_value(field, u64::from(*value)))
        })
    }
}

/// Compile every ACL of every node, applying the given coarsening.
///
/// The result is indexed by node name and then ACL name. Fails with [`ModelError::UnknownAcl`]
/// if an interface filter or source NAT rule refers to an ACL that the node does not define.
pub fn compile_node_acls(
    packet: &PacketVariables,
    configs: &BTreeMap<String, Configuration>,
    coarsening: Coarsening,
) -> Result<BTreeMap<String, BTreeMap<String, CompiledAcl>>, ModelError> {
    let compiler = AclCompiler::new(packet);
    let mut result = BTreeMap::new();
    for (node, config) in configs {
        let mut node_acls = BTreeMap::new();
        for (name, acl) in &config.acls {
            let compiled = compiler.compile(acl)?.coarsen(packet, coarsening);
            node_acls.insert(name.clone(), compiled);
        }
        for interface in config.interfaces.values() {
            let referenced = interface
                .incoming_filter
                .iter()
                .chain(interface.outgoing_filter.iter())
                .chain(interface.source_nats.iter().map(|nat| &nat.acl));
            for name in referenced {
                if !node_acls.contains_key(name) {
                    return Err(ModelError::UnknownAcl {
                        node: node.clone(),
                        acl: name.clone(),
                    });
                }
            }
        }
        debug!("Compiled {} ACLs on node `{node}`.", node_acls.len());
        result.insert(node.clone(), node_acls);
    }
    Ok(result)
}
