//! Cluster configuration for Kindling: defaulting and validation
//!
//! A configuration moves through three stages:
//!
//! 1. defaulting fills unset fields ([`set_defaults_cluster`])
//! 2. each node is validated on its own ([`Node::validate`])
//! 3. the cluster is validated as a whole ([`Cluster::validate`])
//!
//! Validation never stops at the first problem. Every failure is collected
//! and returned as one [`Error::Aggregate`]; [`Error::errors`] unwraps it to
//! the ordered list.

#![deny(missing_docs)]

pub mod cluster;
pub mod defaults;
pub mod error;
pub mod node;
pub mod types;
pub mod validate;
pub mod yaml;

pub use cluster::{split_subnets, Cluster, Networking};
pub use defaults::{set_defaults_cluster, set_defaults_node, Defaults};
pub use error::{Aggregate, Error, ErrorKind, ErrorList};
pub use node::{Node, PortMapping};
pub use types::{AddressFamily, IpFamily, NodeRole, PortProtocol};
pub use yaml::{load_cluster, load_cluster_file, to_yaml};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
