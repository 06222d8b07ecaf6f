//! Primitive validators
//!
//! Standalone checks for a single value. They return the first (and only)
//! problem with that value; callers decide whether to accumulate.

use ipnet::IpNet;

use crate::types::{AddressFamily, IpFamily, NodeRole};
use crate::{Error, Result};

/// Parse a subnet in network/prefix notation
///
/// Host bits are allowed (`192.168.0.2/24` is accepted). Returns the parsed
/// network together with its address family.
pub fn validate_cidr(field: &str, value: &str) -> Result<(IpNet, AddressFamily)> {
    let net: IpNet = value
        .parse()
        .map_err(|e: ipnet::AddrParseError| Error::invalid_subnet(field, value, e.to_string()))?;
    let family = AddressFamily::of(&net);
    Ok((net, family))
}

/// Check that a port lies in 1-65535
pub fn validate_port(field: &str, port: i32) -> Result<u16> {
    match u16::try_from(port) {
        Ok(valid) if valid != 0 => Ok(valid),
        _ => Err(Error::port_out_of_range(field, port)),
    }
}

/// Check that an IP family is one of ipv4, ipv6 or dual
pub fn validate_ip_family(field: &str, family: &IpFamily) -> Result<()> {
    match family {
        IpFamily::Ipv4 | IpFamily::Ipv6 | IpFamily::DualStack => Ok(()),
        IpFamily::Unrecognized(value) => Err(Error::unknown_ip_family(field, value.as_str())),
    }
}

/// Check that a role is control-plane or worker
pub fn validate_role(field: &str, role: &NodeRole) -> Result<()> {
    match role {
        NodeRole::ControlPlane | NodeRole::Worker => Ok(()),
        NodeRole::Unrecognized(value) => Err(Error::unknown_role(field, value.as_str())),
    }
}
