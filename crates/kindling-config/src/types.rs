//! Closed value types used by the configuration document
//!
//! Role and IP family are free-form strings in the document. They parse into
//! closed enums with an `Unrecognized` arm so that unknown values survive
//! deserialization and are rejected by validation instead of being coerced.

use std::fmt;
use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an optional string-backed value, treating `""` as unset
///
/// Lets defaulting fill `role: ""` and `ipFamily: ""` the same way it fills
/// a missing key.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|value| !value.is_empty())
        .map(T::from))
}

/// Networking mode for pod and service ranges
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum IpFamily {
    /// Single-stack IPv4
    Ipv4,
    /// Single-stack IPv6
    Ipv6,
    /// IPv4 and IPv6 ranges side by side
    DualStack,
    /// Any other value; always rejected by validation
    Unrecognized(String),
}

impl IpFamily {
    /// Canonical document spelling
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::DualStack => "dual",
            Self::Unrecognized(value) => value,
        }
    }

    /// Number of entries each subnet list must hold, `None` if unrecognized
    pub fn subnet_count(&self) -> Option<usize> {
        match self {
            Self::Ipv4 | Self::Ipv6 => Some(1),
            Self::DualStack => Some(2),
            Self::Unrecognized(_) => None,
        }
    }

    /// Address family of a single-stack mode
    pub fn single_stack(&self) -> Option<AddressFamily> {
        match self {
            Self::Ipv4 => Some(AddressFamily::V4),
            Self::Ipv6 => Some(AddressFamily::V6),
            Self::DualStack | Self::Unrecognized(_) => None,
        }
    }
}

impl From<String> for IpFamily {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "ipv4" => Self::Ipv4,
            "ipv6" => Self::Ipv6,
            "dual" | "dualstack" => Self::DualStack,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<&str> for IpFamily {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<IpFamily> for String {
    fn from(family: IpFamily) -> Self {
        match family {
            IpFamily::Unrecognized(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a node plays in the cluster
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum NodeRole {
    /// Hosts the cluster management components
    ControlPlane,
    /// Runs workloads only
    Worker,
    /// Any other value; always rejected by validation
    Unrecognized(String),
}

impl NodeRole {
    /// Canonical document spelling
    pub fn as_str(&self) -> &str {
        match self {
            Self::ControlPlane => "control-plane",
            Self::Worker => "worker",
            Self::Unrecognized(value) => value,
        }
    }
}

impl From<String> for NodeRole {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "control-plane" | "controlplane" => Self::ControlPlane,
            "worker" => Self::Worker,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<&str> for NodeRole {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<NodeRole> for String {
    fn from(role: NodeRole) -> Self {
        match role {
            NodeRole::Unrecognized(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address family of a parsed subnet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl AddressFamily {
    /// Family of a parsed network
    pub fn of(net: &IpNet) -> Self {
        match net {
            IpNet::V4(_) => Self::V4,
            IpNet::V6(_) => Self::V6,
        }
    }

    /// Family of an address
    pub fn of_addr(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => f.write_str("IPv4"),
            Self::V6 => f.write_str("IPv6"),
        }
    }
}

/// Transport protocol of a port mapping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortProtocol {
    /// TCP (default)
    #[default]
    Tcp,
    /// UDP
    Udp,
    /// SCTP
    Sctp,
}

impl PortProtocol {
    /// True for the default protocol
    pub fn is_default(&self) -> bool {
        *self == Self::Tcp
    }
}
