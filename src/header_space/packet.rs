use biodivine_lib_bdd::{Bdd, BddValuation, BddVariable, BddVariableSet, BddVariableSetBuilder};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// One field of the modelled packet header.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderField {
    DstIp,
    SrcIp,
    DstPort,
    SrcPort,
    IpProtocol,
    IcmpType,
    IcmpCode,
    TcpFlags,
}

impl HeaderField {
    /// All fields in variable order.
    pub const ALL: [HeaderField; 8] = [
        HeaderField::DstIp,
        HeaderField::SrcIp,
        HeaderField::DstPort,
        HeaderField::SrcPort,
        HeaderField::IpProtocol,
        HeaderField::IcmpType,
        HeaderField::IcmpCode,
        HeaderField::TcpFlags,
    ];

    /// Number of bits used to encode this field.
    pub fn width(self) -> u16 {
        match self {
            HeaderField::DstIp | HeaderField::SrcIp => 32,
            HeaderField::DstPort | HeaderField::SrcPort => 16,
            HeaderField::IpProtocol | HeaderField::IcmpType | HeaderField::IcmpCode => 8,
            HeaderField::TcpFlags => 6,
        }
    }

    fn var_prefix(self) -> &'static str {
        match self {
            HeaderField::DstIp => "dst_ip",
            HeaderField::SrcIp => "src_ip",
            HeaderField::DstPort => "dst_port",
            HeaderField::SrcPort => "src_port",
            HeaderField::IpProtocol => "ip_protocol",
            HeaderField::IcmpType => "icmp_type",
            HeaderField::IcmpCode => "icmp_code",
            HeaderField::TcpFlags => "tcp_flag",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl Display for HeaderField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.var_prefix())
    }
}

/// A single TCP flag bit. The discriminant is the bit position inside [`HeaderField::TcpFlags`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TcpFlag {
    Ack = 0,
    Fin = 1,
    Psh = 2,
    Rst = 3,
    Syn = 4,
    Urg = 5,
}

/// One concrete packet header, as decoded from a predicate witness.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    pub dst_ip: u32,
    pub src_ip: u32,
    pub dst_port: u16,
    pub src_port: u16,
    pub ip_protocol: u8,
    pub icmp_type: u8,
    pub icmp_code: u8,
    /// Bit `i` (counting from the most significant of the six) is the [`TcpFlag`] with
    /// discriminant `i`.
    pub tcp_flags: u8,
}

impl Packet {
    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst_ip)
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src_ip)
    }

    /// The value of a field widened to `u64`.
    pub fn field(&self, field: HeaderField) -> u64 {
        match field {
            HeaderField::DstIp => u64::from(self.dst_ip),
            HeaderField::SrcIp => u64::from(self.src_ip),
            HeaderField::DstPort => u64::from(self.dst_port),
            HeaderField::SrcPort => u64::from(self.src_port),
            HeaderField::IpProtocol => u64::from(self.ip_protocol),
            HeaderField::IcmpType => u64::from(self.icmp_type),
            HeaderField::IcmpCode => u64::from(self.icmp_code),
            HeaderField::TcpFlags => u64::from(self.tcp_flags),
        }
    }

    fn set_field(&mut self, field: HeaderField, value: u64) {
        // The value never exceeds the field width, see `PacketVariables::decode`.
        match field {
            HeaderField::DstIp => self.dst_ip = value as u32,
            HeaderField::SrcIp => self.src_ip = value as u32,
            HeaderField::DstPort => self.dst_port = value as u16,
            HeaderField::SrcPort => self.src_port = value as u16,
            HeaderField::IpProtocol => self.ip_protocol = value as u8,
            HeaderField::IcmpType => self.icmp_type = value as u8,
            HeaderField::IcmpCode => self.icmp_code = value as u8,
            HeaderField::TcpFlags => self.tcp_flags = value as u8,
        }
    }
}

impl Display for Packet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{} proto={} icmp={}/{} flags={:06b}",
            self.src_addr(),
            self.src_port,
            self.dst_addr(),
            self.dst_port,
            self.ip_protocol,
            self.icmp_type,
            self.icmp_code,
            self.tcp_flags
        )
    }
}

/// The BDD variables of all packet-header fields.
///
/// All predicates in one transition graph must be created through the same layout. Two
/// separately created instances are compatible, since the layout is fixed.
#[derive(Clone)]
pub struct PacketVariables {
    variables: BddVariableSet,
    fields: Vec<Vec<BddVariable>>,
    non_dst_ip: Vec<BddVariable>,
}

impl Default for PacketVariables {
    fn default() -> Self {
        PacketVariables::new()
    }
}

impl PacketVariables {
    pub fn new() -> PacketVariables {
        let mut builder = BddVariableSetBuilder::new();
        let mut fields = Vec::with_capacity(HeaderField::ALL.len());
        for field in HeaderField::ALL {
            let bits = (0..field.width())
                .map(|bit| builder.make_variable(&format!("{}_{bit}", field.var_prefix())))
                .collect::<Vec<_>>();
            fields.push(bits);
        }

        let non_dst_ip = HeaderField::ALL
            .iter()
            .filter(|it| **it != HeaderField::DstIp)
            .flat_map(|it| fields[it.index()].iter().copied())
            .collect();

        PacketVariables {
            variables: builder.build(),
            fields,
            non_dst_ip,
        }
    }

    pub fn variable_set(&self) -> &BddVariableSet {
        &self.variables
    }

    /// The bits of the given field, most significant first.
    pub fn field_variables(&self, field: HeaderField) -> &[BddVariable] {
        &self.fields[field.index()]
    }

    /// The predicate that accepts every packet.
    pub fn mk_true(&self) -> Bdd {
        self.variables.mk_true()
    }

    /// The predicate that accepts no packet.
    pub fn mk_false(&self) -> Bdd {
        self.variables.mk_false()
    }

    /// Packets whose `field` is exactly `value`. Bits above the field width are ignored.
    pub fn mk_value(&self, field: HeaderField, value: u64) -> Bdd {
        self.mk_prefix(field, value, field.width())
    }

    /// Packets whose `field` agrees with `value` on the `length` most significant bits.
    ///
    /// A `length` greater than the field width is treated as the full width.
    pub fn mk_prefix(&self, field: HeaderField, value: u64, length: u16) -> Bdd {
        let width = field.width();
        let bits = self.field_variables(field);
        let mut result = self.mk_true();
        for (i, var) in bits.iter().enumerate().take(usize::from(length.min(width))) {
            let shift = u32::from(width) - 1 - i as u32;
            let bit = (value >> shift) & 1 == 1;
            result = result.and(&self.variables.mk_literal(*var, bit));
        }
        result
    }

    /// Packets whose `field` lies in the inclusive range `first..=last`.
    ///
    /// An inverted range is empty.
    pub fn mk_range(&self, field: HeaderField, first: u64, last: u64) -> Bdd {
        if first > last {
            return self.mk_false();
        }
        self.mk_geq(field, first).and(&self.mk_leq(field, last))
    }

    /// Packets whose `field` is at most `value`.
    pub fn mk_leq(&self, field: HeaderField, value: u64) -> Bdd {
        // Built from the least significant bit upwards: `acc` is the constraint on the
        // already processed (lower) bits, assuming all higher bits are equal to `value`.
        let width = field.width();
        let mut acc = self.mk_true();
        for (i, var) in self.field_variables(field).iter().enumerate().rev() {
            let shift = u32::from(width) - 1 - i as u32;
            let x = self.variables.mk_var(*var);
            acc = if (value >> shift) & 1 == 1 {
                x.not().or(&acc)
            } else {
                x.not().and(&acc)
            };
        }
        acc
    }

    /// Packets whose `field` is at least `value`.
    pub fn mk_geq(&self, field: HeaderField, value: u64) -> Bdd {
        let width = field.width();
        let mut acc = self.mk_true();
        for (i, var) in self.field_variables(field).iter().enumerate().rev() {
            let shift = u32::from(width) - 1 - i as u32;
            let x = self.variables.mk_var(*var);
            acc = if (value >> shift) & 1 == 1 {
                x.and(&acc)
            } else {
                x.or(&acc)
            };
        }
        acc
    }

    /// Packets with the given TCP flag set (or cleared).
    pub fn mk_tcp_flag(&self, flag: TcpFlag, value: bool) -> Bdd {
        let var = self.field_variables(HeaderField::TcpFlags)[flag as usize];
        self.variables.mk_literal(var, value)
    }

    /// The predicate accepting exactly one concrete packet.
    pub fn mk_packet(&self, packet: &Packet) -> Bdd {
        HeaderField::ALL.iter().fold(self.mk_true(), |acc, field| {
            acc.and(&self.mk_value(*field, packet.field(*field)))
        })
    }

    /// Existentially quantify every field except the destination IP.
    pub fn project_to_dst_ip(&self, space: &Bdd) -> Bdd {
        space.exists(&self.non_dst_ip)
    }

    /// Remove all constraints on the given field.
    pub fn forget_field(&self, space: &Bdd, field: HeaderField) -> Bdd {
        space.exists(self.field_variables(field))
    }

    /// Read a concrete packet out of a full valuation of the header variables.
    pub fn decode(&self, valuation: &BddValuation) -> Packet {
        let mut packet = Packet::default();
        for field in HeaderField::ALL {
            let value = self
                .field_variables(field)
                .iter()
                .fold(0u64, |acc, var| (acc << 1) | u64::from(valuation[*var]));
            packet.set_field(field, value);
        }
        packet
    }

    /// Pick one packet from a predicate, or `None` if the predicate is empty.
    pub fn example_packet(&self, space: &Bdd) -> Option<Packet> {
        space.sat_witness().map(|witness| self.decode(&witness))
    }

    /// Test whether a concrete packet is accepted by a predicate.
    pub fn contains(&self, space: &Bdd, packet: &Packet) -> bool {
        !space.and(&self.mk_packet(packet)).is_false()
    }
}
