use crate::graph::{Edge, NatRule};
use crate::header_space::{HeaderField, PacketVariables};
use biodivine_lib_bdd::Bdd;

/// The header space that arrives at `edge.to()` when `input` is present at `edge.from()`.
///
/// The guard is applied first, then the source NAT rules of the edge (if any).
pub fn traverse(packet: &PacketVariables, edge: &Edge, input: &Bdd) -> Bdd {
    let admitted = input.and(edge.guard());
    if admitted.is_false() || edge.source_nat().is_empty() {
        admitted
    } else {
        apply_source_nat(packet, edge.source_nat(), &admitted)
    }
}

/// Rewrite the source IP of `input` using the first matching rule of `rules`.
///
/// Packets matched by a rule lose their original source IP and take any address of the
/// rule's pool. Packets matched by no rule are left unchanged.
pub fn apply_source_nat(packet: &PacketVariables, rules: &[NatRule], input: &Bdd) -> Bdd {
    let mut remaining = input.clone();
    let mut result = packet.mk_false();
    for rule in rules {
        let hit = remaining.and(rule.matches());
        if !hit.is_false() {
            let rewritten = packet
                .forget_field(&hit, HeaderField::SrcIp)
                .and(rule.rewrite());
            result = result.or(&rewritten);
        }
        remaining = remaining.and_not(rule.matches());
        if remaining.is_false() {
            break;
        }
    }
    result.or(&remaining)
}
