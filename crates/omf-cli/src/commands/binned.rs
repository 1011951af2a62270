use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use omf_boost::GbdtProvider;
use omf_hist::{binned_omnifold, Histogram1D, Histogram2D};
use omf_unfold::json::{read_json_file, write_json_file};
use omf_unfold::UnfoldConfig;
use tracing::info;

#[derive(Args, Debug)]
pub struct BinnedArgs {
    /// JSON response histogram (reco on x, gen on y).
    #[arg(long)]
    pub response: PathBuf,
    /// JSON measured histogram over the reco axis.
    #[arg(long)]
    pub measured: PathBuf,
    /// Number of OmniFold iterations.
    #[arg(long)]
    pub iterations: usize,
    /// Weight synthetic events by their bin width.
    #[arg(long)]
    pub density: bool,
    /// Optional YAML configuration supplying hyperparameters and seeds.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output JSON file receiving the unfolded histogram and weights.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &BinnedArgs) -> Result<(), Box<dyn Error>> {
    let response: Histogram2D = read_json_file(&args.response)?;
    response.validate()?;
    let measured: Histogram1D = read_json_file(&args.measured)?;
    measured.validate()?;
    let config = match &args.config {
        Some(path) => UnfoldConfig::load(path)?,
        None => UnfoldConfig::default(),
    };

    let output = binned_omnifold(
        &response,
        &measured,
        args.iterations,
        args.density,
        &GbdtProvider,
        &config,
    )?;

    write_json_file(&args.out, &output)?;
    info!(
        out = %args.out.display(),
        integral = output.unfolded.integral(),
        "wrote unfolded histogram"
    );
    Ok(())
}
