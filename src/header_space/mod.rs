//! Packet-header encoding on top of `biodivine-lib-bdd`.
//!
//! Every header field is a fixed-width bit vector of BDD variables (most significant bit first).
//! The fields are laid out in a single [`BddVariableSet`] so that every predicate produced by
//! this crate speaks about the same variables, no matter which component created it.
//!
//! The destination IP comes first in the variable ordering: it is the field that appears in
//! almost every forwarding fact, so keeping it at the top of the diagram keeps the BDDs small.

use biodivine_lib_bdd::Bdd;

#[cfg(test)]
mod tests;

mod ip_space;
mod packet;

pub use packet::{HeaderField, Packet, PacketVariables, TcpFlag};

/// Controls how much header information survives in the compiled predicates.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Coarsening {
    /// Keep every header field.
    #[default]
    Precise,
    /// Existentially quantify every field except the destination IP.
    ///
    /// This is an over-approximation: a packet is considered permitted if *some* assignment of
    /// the removed fields would be permitted.
    DstIpOnly,
}

impl Coarsening {
    /// Apply the coarsening to a header predicate.
    pub fn apply(&self, packet: &PacketVariables, space: &Bdd) -> Bdd {
        match self {
            Coarsening::Precise => space.clone(),
            Coarsening::DstIpOnly => packet.project_to_dst_ip(space),
        }
    }
}

/// Two header predicates are equivalent when they accept exactly the same packets.
pub fn equivalent(left: &Bdd, right: &Bdd) -> bool {
    left.xor(right).is_false()
}

/// True if every packet accepted by `sub` is also accepted by `sup`.
pub fn is_subset(sub: &Bdd, sup: &Bdd) -> bool {
    sub.and_not(sup).is_false()
}
