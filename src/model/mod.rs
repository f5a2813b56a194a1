//! The data consumed by the graph compiler.
//!
//! These types describe an already parsed network snapshot: per-device configuration
//! ([`Configuration`]), data-plane facts computed by some forwarding analysis
//! ([`ForwardingFacts`]), and the symbolic traffic origins of a query ([`Location`]).
//! Nothing in this module knows about BDDs.


mod configuration;
mod forwarding_facts;
mod ip_space;
mod location;

pub use configuration::{
    Acl, AclLine, Configuration, HeaderMatch, Interface, LineAction, PortRange, SourceNat, Vrf,
};
pub use forwarding_facts::{ForwardingFacts, PhysicalEdge};
pub use ip_space::IpSpace;
pub use location::Location;
