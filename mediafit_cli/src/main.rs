//! Command-line interface for mediafit
//!
//! Infers the media conditions of a COBRA json model from a measured media table and an
//! observed growth rate.
//!
//! # Usage
//!
//! ```bash
//! mediafit --model model.json --media media.csv --biomass BIOMASS --growth 0.03 \
//!     --output result.json
//! ```
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::info;
use mediafit_core::io::media_table::MediaTable;
use mediafit_core::media::search::{SearchOrder, SearchSettingsBuilder};
use mediafit_core::media::{infer_media, MediaResult};
use mediafit_core::metabolic_model::model::Model;

/// Infer the media of a metabolic model consistent with an observed growth rate
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the model, in COBRA json format
    #[arg(short, long)]
    model: PathBuf,

    /// Path to the measured media table (csv)
    #[arg(long)]
    media: PathBuf,

    /// Id of the biomass reaction
    #[arg(short, long)]
    biomass: String,

    /// Observed growth rate (h⁻¹)
    #[arg(short, long)]
    growth: f64,

    /// Growth at or below this value counts as no growth
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Order in which unmeasured exchange reactions are visited
    #[arg(long, value_enum, default_value_t = Order::Natural)]
    order: Order,

    /// Path to write the json result to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log more, repeat for debug output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Order {
    /// Order of the reactions in the model file
    Natural,
    /// Sorted by reaction id
    Sorted,
}

impl From<Order> for SearchOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Natural => SearchOrder::Natural,
            Order::Sorted => SearchOrder::Sorted,
        }
    }
}

fn run(cli: &Cli) -> Result<MediaResult> {
    let model = Model::read_json(&cli.model)
        .with_context(|| format!("Failed to read model {}", cli.model.display()))?;
    let media = MediaTable::read_csv(&cli.media)
        .with_context(|| format!("Failed to read media table {}", cli.media.display()))?;
    info!(
        "Read {} reactions and {} media entries",
        model.reactions.len(),
        media.len()
    );

    let mut settings = SearchSettingsBuilder::default();
    settings
        .experimental_growth(cli.growth)
        .order(cli.order.into());
    if let Some(tolerance) = cli.tolerance {
        settings.growth_tolerance(tolerance);
    }
    let settings = settings.build()?;

    let result = infer_media(&model, &cli.biomass, &media, &settings)?;
    if let Some(output) = &cli.output {
        let json = serde_json::to_string_pretty(&result)?;
        fs::write(output, json)
            .with_context(|| format!("Failed to write result to {}", output.display()))?;
        info!("Wrote result to {}", output.display());
    }
    Ok(result)
}

fn print_summary(result: &MediaResult) {
    println!("=== Inferred media for {} ===\n", result.objective);
    println!("Observed growth: {:.4} h⁻¹", result.experimental_growth);
    println!("Predicted growth: {:.4} h⁻¹", result.final_growth);
    match result.doubling_time {
        Some(time) => println!("Doubling time: {:.4} h", time),
        None => println!("Doubling time: undefined (no growth)"),
    }
    println!(
        "\nDefined: {}, closed: {}, reopened: {}, essential: {}",
        result.counts.defined,
        result.counts.closed,
        result.counts.reopened,
        result.essential.len()
    );
    if !result.unmatched_media.is_empty() {
        println!("Unmatched media entries: {}", result.unmatched_media.join(", "));
    }
    if !result.classification.reopened.is_empty() {
        println!("\nReopened exchange reactions:");
        for id in &result.classification.reopened {
            let names = result
                .metabolite_names
                .get(id)
                .map(|names| names.join(", "))
                .unwrap_or_default();
            println!("  {id}\t{names}");
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = run(&cli)?;
    print_summary(&result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn test_data(parts: &[&str]) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("mediafit_core")
            .join("test_data");
        for part in parts {
            path.push(part);
        }
        path
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_args() {
        let cli = Cli::try_parse_from([
            "mediafit",
            "--model",
            "model.json",
            "--media",
            "media.csv",
            "--biomass",
            "BIOMASS",
            "--growth",
            "0.5",
            "--order",
            "sorted",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.biomass, "BIOMASS");
        assert_eq!(cli.order, Order::Sorted);
        assert_eq!(cli.verbose, 2);
        assert!(cli.tolerance.is_none());
        assert!(Cli::try_parse_from(["mediafit", "--model", "model.json"]).is_err());
    }

    #[test]
    fn run_writes_result() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("result.json");
        let cli = Cli {
            model: test_data(&["test_models", "toy_network.json"]),
            media: test_data(&["media", "toy_media.csv"]),
            biomass: "BIOMASS".to_string(),
            growth: 5.,
            tolerance: Some(1e-6),
            order: Order::Natural,
            output: Some(output.clone()),
            verbose: 0,
        };
        let result = run(&cli).unwrap();
        assert_eq!(result.classification.reopened, vec!["EX_ac_e"]);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written["reopened"][0], "EX_ac_e");
        assert_eq!(written["essential"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn run_reports_missing_biomass() {
        let cli = Cli {
            model: test_data(&["test_models", "toy_network.json"]),
            media: test_data(&["media", "toy_media.csv"]),
            biomass: "GROWTH".to_string(),
            growth: 5.,
            tolerance: None,
            order: Order::Natural,
            output: None,
            verbose: 0,
        };
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("GROWTH"));
    }
}
