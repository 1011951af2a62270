use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use omf_boost::{GbdtClassifier, GbdtRegressor};
use omf_unfold::json::read_json_file;
use omf_unfold::{get_step1_predictions, get_step2_predictions, EventArray, ModelStore};
use serde::Deserialize;
use tracing::info;

use crate::write_weight_columns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StepArg {
    /// Reco-level models (classifier plus optional regressor).
    #[value(name = "1")]
    One,
    /// Gen-level classifier.
    #[value(name = "2")]
    Two,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Which step's artifact to apply.
    #[arg(long, value_enum)]
    pub step: StepArg,
    /// Directory holding the saved artifacts.
    #[arg(long, default_value = "./weights/")]
    pub models: PathBuf,
    /// Artifact name prefix.
    #[arg(long, default_value = "bdt_unbinned_omnifold")]
    pub name: String,
    /// One-indexed iteration to load.
    #[arg(long, default_value_t = 4)]
    pub iteration: usize,
    /// JSON document with `gen`, and for step 1 `reco` and optional `pass_reco`.
    #[arg(long)]
    pub input: PathBuf,
    /// Output CSV file.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PredictInput {
    gen: EventArray,
    #[serde(default)]
    reco: Option<EventArray>,
    #[serde(default)]
    pass_reco: Option<Vec<bool>>,
}

pub fn run(args: &PredictArgs) -> Result<(), Box<dyn Error>> {
    let store = ModelStore::new(args.models.clone(), args.name.clone());
    let input: PredictInput = read_json_file(&args.input)?;
    let gen = input.gen.to_matrix()?;

    let weights = match args.step {
        StepArg::One => {
            let reco = input
                .reco
                .as_ref()
                .ok_or("step 1 predictions need a `reco` array")?
                .to_matrix()?;
            get_step1_predictions::<GbdtClassifier, GbdtRegressor>(
                &gen,
                &reco,
                &store,
                args.iteration,
                input.pass_reco.as_deref(),
            )?
        }
        StepArg::Two => get_step2_predictions::<GbdtClassifier>(&gen, &store, args.iteration)?,
    };

    write_weight_columns(&args.out, &[("weight", weights.as_slice())])?;
    info!(out = %args.out.display(), events = weights.len(), "wrote predictions");
    Ok(())
}
