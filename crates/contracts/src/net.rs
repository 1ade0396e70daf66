//! Default addressing for network-transport collaborators.
//!
//! The core mandates no wire framing; these are only the multicast defaults a
//! network-facing write/read collaborator falls back to when unconfigured.

/// IPv4 Organization Local Scope group (239.192.0.0/14).
pub const DEFAULT_V4_GROUP: &str = "239.192.74.66";

/// IPv6 organization-local multicast group.
pub const DEFAULT_V6_GROUP: &str = "ff18::efc0:4a42";

/// Default UDP port.
pub const DEFAULT_PORT: u16 = 25826;
