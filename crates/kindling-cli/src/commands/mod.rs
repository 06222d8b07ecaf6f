//! CLI subcommands

pub mod defaults;
pub mod validate;

use std::path::Path;

use kindling_config::{load_cluster_file, Cluster};

/// Load a configuration file and apply defaults
pub fn load_defaulted(path: &Path) -> crate::Result<Cluster> {
    let mut cluster = load_cluster_file(path)?;
    cluster.set_defaults();
    Ok(cluster)
}

/// Output format for printed configuration
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML document
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}
