pub mod two_node_network;

use std::net::Ipv4Addr;

/// Initialize env_logger for tests. Safe to call multiple times.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Parse a dotted IPv4 address literal.
pub fn ip(address: &str) -> Ipv4Addr {
    address
        .parse()
        .unwrap_or_else(|_| panic!("Invalid IPv4 address literal `{address}`"))
}
