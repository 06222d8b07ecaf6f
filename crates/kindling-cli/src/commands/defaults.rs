//! Defaults command

use std::path::PathBuf;

use clap::Args;

use super::{load_defaulted, OutputFormat};
use crate::Result;

#[derive(Args, Debug)]
pub struct DefaultsArgs {
    /// Cluster configuration file
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,
}

pub fn run(args: DefaultsArgs) -> Result<()> {
    let cluster = load_defaulted(&args.file)?;
    let rendered = match args.output {
        OutputFormat::Yaml => kindling_config::to_yaml(&cluster)?,
        OutputFormat::Json => serde_json::to_string_pretty(&cluster)?,
    };
    println!("{}", rendered);
    Ok(())
}
