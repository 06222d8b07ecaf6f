//! Pod CIDR routes to peer nodes
//!
//! For every pod CIDR of a peer, the local node needs a route
//! `pod CIDR -> peer address`. Syncing is idempotent: a pod CIDR that
//! already has a route, through any gateway, is left alone.

use std::collections::HashMap;
use std::net::IpAddr;

use ipnet::IpNet;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info, warn};

use kindling_config::validate::validate_cidr;
use kindling_config::AddressFamily;

use crate::{Error, Result};

/// A host route to a pod CIDR through a peer node
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    /// Destination pod CIDR
    pub dst: IpNet,
    /// Peer node address
    pub gateway: IpAddr,
}

/// Routing table backend
///
/// Abstracts the kernel routing table for testability.
#[cfg_attr(test, automock)]
pub trait RouteTable {
    /// True if any route to `dst` is installed, whatever its gateway
    fn has_route_to(&self, dst: &IpNet) -> Result<bool>;

    /// Install the route
    fn add_route(&mut self, route: &Route) -> Result<()>;
}

/// In-memory routing table, for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryRouteTable {
    routes: HashMap<IpNet, IpAddr>,
}

impl MemoryRouteTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of installed routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when no route is installed
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// True if the exact route, gateway included, is installed
    pub fn contains(&self, route: &Route) -> bool {
        self.routes.get(&route.dst) == Some(&route.gateway)
    }
}

impl RouteTable for MemoryRouteTable {
    fn has_route_to(&self, dst: &IpNet) -> Result<bool> {
        Ok(self.routes.contains_key(dst))
    }

    fn add_route(&mut self, route: &Route) -> Result<()> {
        if let Some(existing) = self.routes.get(&route.dst) {
            return Err(Error::route_table(format!(
                "route to {} via {} already exists",
                route.dst, existing
            )));
        }
        self.routes.insert(route.dst, route.gateway);
        Ok(())
    }
}

/// True for addresses usable as a route gateway
///
/// Rejects unspecified, loopback, multicast, link-local and the IPv4
/// broadcast address. Private ranges are accepted. IPv4-mapped IPv6
/// addresses are judged as IPv4.
pub fn is_global_unicast(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_unspecified()
                || v4.is_loopback()
                || v4.is_multicast()
                || v4.is_link_local()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_global_unicast(&IpAddr::V4(v4)),
            None => {
                let link_local = (v6.segments()[0] & 0xffc0) == 0xfe80;
                !(v6.is_unspecified() || v6.is_loopback() || v6.is_multicast() || link_local)
            }
        },
    }
}

/// Install routes to each of a peer's pod CIDRs via the peer's address
///
/// Returns the number of routes added. A peer address that does not parse
/// or is not global unicast is skipped. Pod CIDRs of the other address
/// family are skipped. An unparsable pod CIDR is an error.
pub fn sync_routes<T: RouteTable + ?Sized>(
    table: &mut T,
    node_ip: &str,
    pod_cidrs: &[String],
) -> Result<usize> {
    let gateway = match node_ip.parse::<IpAddr>() {
        Ok(ip) if is_global_unicast(&ip) => ip,
        _ => {
            warn!(node_ip, "skipping peer without a global unicast address");
            return Ok(0);
        }
    };
    let gateway_family = AddressFamily::of_addr(&gateway);

    let mut added = 0;
    for cidr in pod_cidrs {
        let (dst, family) = validate_cidr("podCIDR", cidr).map_err(|e| Error::InvalidPodCidr {
            cidr: cidr.clone(),
            reason: e.to_string(),
        })?;
        if family != gateway_family {
            debug!(%dst, %gateway, "skipping pod CIDR of the other address family");
            continue;
        }

        let route = Route {
            dst: dst.trunc(),
            gateway,
        };
        if table.has_route_to(&route.dst)? {
            debug!(dst = %route.dst, "pod CIDR already routed");
            continue;
        }

        info!(dst = %route.dst, gateway = %route.gateway, "Adding route");
        table.add_route(&route)?;
        added += 1;
    }
    Ok(added)
}
