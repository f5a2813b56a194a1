use std::net::Ipv4Addr;

/// A set of IPv4 addresses.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IpSpace {
    Universe,
    Empty,
    Ip(Ipv4Addr),
    /// All addresses sharing the first `length` bits with `ip`.
    Prefix {
        ip: Ipv4Addr,
        length: u8,
    },
    /// Inclusive address range.
    Range {
        first: Ipv4Addr,
        last: Ipv4Addr,
    },
    Union(Vec<IpSpace>),
    Difference {
        include: Box<IpSpace>,
        exclude: Box<IpSpace>,
    },
}

impl IpSpace {
    pub fn prefix(ip: Ipv4Addr, length: u8) -> IpSpace {
        IpSpace::Prefix { ip, length }
    }

    pub fn range(first: Ipv4Addr, last: Ipv4Addr) -> IpSpace {
        IpSpace::Range { first, last }
    }

    pub fn difference(include: IpSpace, exclude: IpSpace) -> IpSpace {
        IpSpace::Difference {
            include: Box::new(include),
            exclude: Box::new(exclude),
        }
    }
}

impl From<Ipv4Addr> for IpSpace {
    fn from(value: Ipv4Addr) -> Self {
        IpSpace::Ip(value)
    }
}
