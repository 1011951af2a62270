use std::error::Error;
use std::fs::File;
use std::path::Path;

use clap::{Parser, Subcommand};

mod commands;

use commands::{
    binned::{self, BinnedArgs},
    predict::{self, PredictArgs},
    unbinned::{self, UnbinnedArgs},
    version::{self, VersionArgs},
};

#[derive(Parser, Debug)]
#[command(name = "omnifold", about = "OmniFold iterative unfolding")]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Unfold raw event arrays read from JSON.
    Unbinned(UnbinnedArgs),
    /// Unfold a measured histogram through a response histogram.
    Binned(BinnedArgs),
    /// Apply saved models of one iteration to new events.
    Predict(PredictArgs),
    /// Print the tool version.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Unbinned(args) => unbinned::run(&args),
        Command::Binned(args) => binned::run(&args),
        Command::Predict(args) => predict::run(&args),
        Command::Version(args) => version::run(&args),
    }
}

/// Writes equally long named columns as CSV, prefixed by an `event` index.
pub(crate) fn write_weight_columns(
    path: &Path,
    columns: &[(&str, &[f64])],
) -> Result<(), Box<dyn Error>> {
    let rows = columns.first().map(|(_, values)| values.len()).unwrap_or(0);
    if let Some((name, values)) = columns.iter().find(|(_, values)| values.len() != rows) {
        return Err(format!("column {name} has {} rows, expected {rows}", values.len()).into());
    }
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    let mut header = vec!["event".to_string()];
    header.extend(columns.iter().map(|(name, _)| name.to_string()));
    writer.write_record(&header)?;
    for row in 0..rows {
        let mut record = vec![row.to_string()];
        record.extend(columns.iter().map(|(_, values)| values[row].to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn weight_columns_share_one_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.csv");
        let pull = [1.0, 2.5];
        let push = [0.5, 1.0];
        write_weight_columns(&path, &[("pull", &pull[..]), ("push", &push[..])]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "event,pull,push\n0,1,0.5\n1,2.5,1\n");
    }

    #[test]
    fn ragged_columns_are_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.csv");
        let short: [f64; 0] = [];
        let long = [1.0];
        assert!(write_weight_columns(&path, &[("a", &long[..]), ("b", &short[..])]).is_err());
    }

    #[test]
    fn cli_parses_global_log_level() {
        let cli = Cli::try_parse_from([
            "omnifold",
            "--log-level",
            "debug",
            "binned",
            "--response",
            "r.json",
            "--measured",
            "m.json",
            "--iterations",
            "2",
            "--out",
            "o.json",
        ])
        .unwrap();
        assert_eq!(cli.log_level, tracing::Level::DEBUG);
        assert!(matches!(
            cli.command,
            Command::Binned(ref args) if args.iterations == 2 && !args.density
        ));
    }
}
