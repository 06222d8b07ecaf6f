//! Defaulting stage
//!
//! Fills every unset field of a cluster or node from an immutable
//! [`Defaults`] table. Defaulting only touches unset values, so applying it
//! twice gives the same result as applying it once.

use tracing::debug;

use crate::cluster::Cluster;
use crate::node::Node;
use crate::types::{IpFamily, NodeRole};

/// Node image used when a node does not name one
pub const DEFAULT_NODE_IMAGE: &str = "kindest/node:v1.32.0";

/// Port the API server listens on when unset
pub const DEFAULT_API_SERVER_PORT: i32 = 6443;

/// Canonical values applied by the defaulting stage
#[derive(Clone, Debug, PartialEq)]
pub struct Defaults {
    /// Node image reference
    pub node_image: &'static str,
    /// API server port
    pub api_server_port: i32,
    /// IP family when none is declared
    pub ip_family: IpFamily,
    /// IPv4 pod range
    pub ipv4_pod_subnet: &'static str,
    /// IPv4 service range
    pub ipv4_service_subnet: &'static str,
    /// IPv6 pod range
    pub ipv6_pod_subnet: &'static str,
    /// IPv6 service range
    pub ipv6_service_subnet: &'static str,
}

impl Defaults {
    /// The built-in table
    pub const CANONICAL: Defaults = Defaults {
        node_image: DEFAULT_NODE_IMAGE,
        api_server_port: DEFAULT_API_SERVER_PORT,
        ip_family: IpFamily::Ipv4,
        ipv4_pod_subnet: "10.244.0.0/16",
        ipv4_service_subnet: "10.96.0.0/16",
        ipv6_pod_subnet: "fd00:10:244::/56",
        ipv6_service_subnet: "fd00:10:96::/112",
    };

    /// Pod ranges for the given family
    ///
    /// Dual-stack lists IPv4 first. An unrecognized family falls back to IPv4
    /// so the family error is the only one reported.
    pub fn pod_subnets(&self, family: &IpFamily) -> Vec<String> {
        self.subnets_for(family, self.ipv4_pod_subnet, self.ipv6_pod_subnet)
    }

    /// Service ranges for the given family
    pub fn service_subnets(&self, family: &IpFamily) -> Vec<String> {
        self.subnets_for(family, self.ipv4_service_subnet, self.ipv6_service_subnet)
    }

    fn subnets_for(&self, family: &IpFamily, v4: &str, v6: &str) -> Vec<String> {
        match family {
            IpFamily::Ipv6 => vec![v6.to_string()],
            IpFamily::DualStack => vec![v4.to_string(), v6.to_string()],
            IpFamily::Ipv4 | IpFamily::Unrecognized(_) => vec![v4.to_string()],
        }
    }

    /// Fill unset node fields
    pub fn apply_node(&self, node: &mut Node) {
        if node.role.is_none() {
            node.role = Some(NodeRole::Worker);
        }
        if node.image.is_empty() {
            node.image = self.node_image.to_string();
        }
    }

    /// Fill unset cluster fields, then every node
    pub fn apply_cluster(&self, cluster: &mut Cluster) {
        let networking = &mut cluster.networking;
        let family = networking
            .ip_family
            .get_or_insert_with(|| self.ip_family.clone())
            .clone();
        if networking.api_server_port.is_none() {
            networking.api_server_port = Some(self.api_server_port);
        }
        if networking.pod_subnet.is_empty() {
            networking.pod_subnet = self.pod_subnets(&family);
        }
        if networking.service_subnet.is_empty() {
            networking.service_subnet = self.service_subnets(&family);
        }

        // An explicitly empty node list is left for validation to reject.
        let nodes = cluster
            .nodes
            .get_or_insert_with(|| vec![Node::new(NodeRole::ControlPlane)]);

        if !nodes.iter().any(Node::is_control_plane) {
            if let Some(first_unset) = nodes.iter_mut().find(|n| n.role.is_none()) {
                first_unset.role = Some(NodeRole::ControlPlane);
            }
        }
        for node in nodes.iter_mut() {
            self.apply_node(node);
        }

        debug!(
            ip_family = %family,
            nodes = nodes.len(),
            "applied cluster defaults"
        );
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// Default a cluster in place using [`Defaults::CANONICAL`]
pub fn set_defaults_cluster(cluster: &mut Cluster) {
    Defaults::CANONICAL.apply_cluster(cluster);
}

/// Default a node in place using [`Defaults::CANONICAL`]
pub fn set_defaults_node(node: &mut Node) {
    Defaults::CANONICAL.apply_node(node);
}
