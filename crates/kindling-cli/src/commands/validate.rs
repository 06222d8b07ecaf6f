//! Validate command

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use kindling_config::Cluster;

use super::load_defaulted;
use crate::{Error, Result};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Cluster configuration file
    pub file: PathBuf,
}

/// Outcome of validating one configuration file
#[derive(Debug)]
pub struct Report {
    /// The defaulted cluster that was validated
    pub cluster: Cluster,
    /// Every failure, in detection order
    pub failures: Vec<kindling_config::Error>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load, default and validate a configuration file
///
/// Read and parse failures are returned as errors; validation failures are
/// collected in the report.
pub fn validate_path(path: &Path) -> Result<Report> {
    let cluster = load_defaulted(path)?;
    let failures = match cluster.validate() {
        Ok(()) => Vec::new(),
        Err(err) => err.into_errors(),
    };
    debug!(path = %path.display(), failures = failures.len(), "validated configuration");
    Ok(Report { cluster, failures })
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let report = validate_path(&args.file)?;

    let family = report
        .cluster
        .networking
        .ip_family
        .as_ref()
        .map(|f| f.to_string())
        .unwrap_or_default();
    println!("File:     {}", args.file.display());
    println!("Family:   {}", family);
    println!("Nodes:    {}", report.cluster.nodes().len());
    println!();

    if report.is_valid() {
        println!("All validations passed");
        return Ok(());
    }

    println!("Validation errors:");
    for failure in &report.failures {
        println!("  - {}", failure);
    }
    Err(Error::validation(report.failures.len()))
}
