//! Configuration document loading
//!
//! Parses the YAML document into a [`Cluster`]. Parsing only checks shape;
//! values that are merely wrong (unknown roles, bad subnets, ports out of
//! range) come through untouched for validation to report.

use std::path::Path;

use crate::cluster::Cluster;
use crate::{Error, Result};

/// Parse a cluster from YAML
///
/// An empty document yields an all-unset cluster.
pub fn load_cluster(input: &str) -> Result<Cluster> {
    if input.trim().is_empty() {
        return Ok(Cluster::default());
    }
    serde_yaml::from_str(input).map_err(|e| Error::document(e.to_string()))
}

/// Read and parse a cluster from a YAML file
pub fn load_cluster_file(path: &Path) -> Result<Cluster> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::document(format!("failed to read {}: {}", path.display(), e)))?;
    load_cluster(&content).map_err(|e| match e {
        Error::Document { message } => {
            Error::document(format!("{}: {}", path.display(), message))
        }
        other => other,
    })
}

/// Render a cluster as YAML
pub fn to_yaml(cluster: &Cluster) -> Result<String> {
    serde_yaml::to_string(cluster).map_err(|e| Error::document(e.to_string()))
}
