use std::error::Error;

use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit the version and the model artifact schema as JSON.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
    artifact_schema: String,
}

pub fn run(args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let schema = omf_unfold::ARTIFACT_SCHEMA;
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
        artifact_schema: format!("{}.{}.{}", schema.major, schema.minor, schema.patch),
    };
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
