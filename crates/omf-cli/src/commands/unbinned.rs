use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use omf_boost::GbdtProvider;
use omf_unfold::json::read_json_file;
use omf_unfold::metrics::write_summaries_csv;
use omf_unfold::{unbinned_omnifold, RunManifest, UnbinnedRequest, UnfoldConfig};
use tracing::info;

use crate::write_weight_columns;

#[derive(Args, Debug)]
pub struct UnbinnedArgs {
    /// YAML configuration describing iterations, hyperparameters and persistence.
    #[arg(long)]
    pub config: PathBuf,
    /// JSON document holding the event arrays, masks and weights.
    #[arg(long)]
    pub input: PathBuf,
    /// Output directory for weights, metrics and the run manifest.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &UnbinnedArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let config = UnfoldConfig::load(&args.config)?;
    let request: UnbinnedRequest = read_json_file(&args.input)?;

    let output = unbinned_omnifold(&request, &config, &GbdtProvider)?;

    let weights_path = args.out.join("weights.csv");
    write_weight_columns(
        &weights_path,
        &[
            ("weight_pull", output.weights_pull.as_slice()),
            ("weight_push", output.weights_push.as_slice()),
        ],
    )?;
    let metrics_path = args.out.join("metrics.csv");
    write_summaries_csv(&output.iterations, &metrics_path)?;

    let mut manifest = RunManifest::new(&config, output.iterations.len())?;
    manifest.artifacts = output.artifacts.clone();
    manifest.outputs = vec![weights_path, metrics_path];
    manifest.write(&args.out.join("manifest.json"))?;

    // Keep the configuration next to the outputs for reproducibility.
    fs::copy(&args.config, args.out.join("config.yaml"))?;
    info!(out = %args.out.display(), "wrote unbinned outputs");
    Ok(())
}
