use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colorprofile::{init, process_image, version, AnalyzerConfig, HistogramRegion, Mode, Outcome};

#[derive(Parser, Debug)]
#[command(name = "colorprofile")]
#[command(version, about = "Circular crop, edge filtering and Lab statistics for disc photos", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the library version
    Version,

    /// Keep only the edges inside the disc
    Edges {
        /// Input image
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Filtered image
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Report Lab histogram statistics of the crop
    Stats {
        /// Input image
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Square sRGB crop
        #[arg(value_name = "TRIMMED")]
        trimmed_output: PathBuf,

        /// Lab-encoded crop
        #[arg(value_name = "PROCESSED")]
        processed_output: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Only count pixels inside the disc
        #[arg(long)]
        disc: bool,
    },
}

fn load_config() -> anyhow::Result<AnalyzerConfig> {
    #[cfg(feature = "env-config")]
    let config = AnalyzerConfig::from_env().context("Invalid COLORPROFILE_* settings")?;
    #[cfg(not(feature = "env-config"))]
    let config = AnalyzerConfig::default();
    Ok(config)
}

fn run(input: PathBuf, mode: Mode, json: bool, disc: bool) -> anyhow::Result<()> {
    let mut config = load_config()?;
    if disc {
        config.histogram_region = HistogramRegion::Disc;
    }

    let outcome = process_image(&input, &mode, &config)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    match outcome {
        Outcome::Statistics(report) if json => println!("{}", report.to_json()?),
        other => println!("{}", other.message()),
    }
    Ok(())
}

fn main() -> ExitCode {
    // Usage errors exit with code 2 from inside clap
    let cli = Cli::parse();

    let (input, mode, json, disc) = match cli.command {
        Commands::Version => {
            println!("{}", version());
            return ExitCode::SUCCESS;
        }
        Commands::Edges { input, output } => (input, Mode::EdgeRemoval { output }, false, false),
        Commands::Stats {
            input,
            trimmed_output,
            processed_output,
            json,
            disc,
        } => (
            input,
            Mode::LabStatistics {
                trimmed_output,
                processed_output,
            },
            json,
            disc,
        ),
    };

    if let Err(e) = init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
    match run(input, mode, json, disc) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stats() {
        let cli = Cli::try_parse_from(["colorprofile", "stats", "in.jpg", "t.jpg", "p.jpg", "--json"]).unwrap();
        match cli.command {
            Commands::Stats {
                input,
                processed_output,
                json,
                disc,
                ..
            } => {
                assert_eq!(input, PathBuf::from("in.jpg"));
                assert_eq!(processed_output, PathBuf::from("p.jpg"));
                assert!(json);
                assert!(!disc);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_edges() {
        let cli = Cli::try_parse_from(["colorprofile", "edges", "in.jpg", "out.jpg"]).unwrap();
        assert!(matches!(cli.command, Commands::Edges { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Cli::try_parse_from(["colorprofile"]).is_err());
        assert!(Cli::try_parse_from(["colorprofile", "edges", "in.jpg"]).is_err());
        assert!(Cli::try_parse_from(["colorprofile", "edges", "in.jpg", "out.jpg", "--disc"]).is_err());
        assert!(Cli::try_parse_from(["colorprofile", "stats", "a", "b", "c", "--loud"]).is_err());

        let cli = Cli::try_parse_from(["colorprofile", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_usage_error_exit_code() {
        let err = Cli::try_parse_from(["colorprofile", "stats", "in.jpg"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
