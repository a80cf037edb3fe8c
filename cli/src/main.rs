//! Command-line scorer of entity-typing submissions.
//!
//! Usage:
//!   typeval data/ground_truth.json data/submission.json
//!   typeval data/ground_truth.json data/submission.json --format json --tally

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use typeval::{
    evaluate_maps, AnnotationMap, DivByZeroStrat, EntityTally, EvalConfigBuilder,
    EvaluationReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per strategy
    Text,
    /// JSON object
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "typeval")]
#[command(about = "Score entity-typing predictions against a ground truth")]
#[command(version)]
struct Args {
    /// Ground truth annotation file
    #[arg(value_name = "GROUND_TRUTH")]
    ground_truth: PathBuf,

    /// Submitted annotation file
    #[arg(value_name = "SUBMISSION")]
    submission: PathBuf,

    /// What to do when the loose micro precision or recall divides by zero (zero, one, error)
    #[arg(short = 'z', long, default_value = "zero", env = "TYPEVAL_ZERO_DIVISION")]
    zero_division: DivByZeroStrat,

    /// Reject the documents not holding their records under the `data` key
    #[arg(long)]
    strict_shape: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also print the frequency of the submitted entities of each type
    #[arg(short, long)]
    tally: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a EvaluationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    tally: Option<&'a EntityTally>,
}

impl Args {
    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
                .init();
        }
    }

    fn execute(&self) -> Result<String> {
        let config = EvalConfigBuilder::default()
            .division_by_zero(self.zero_division)
            .legacy_shape(!self.strict_shape)
            .build();
        log::debug!("Configuration: {}", config);

        let ground_truth = AnnotationMap::from_path(&self.ground_truth, &config)
            .with_context(|| format!("Invalid ground truth {}", self.ground_truth.display()))?;
        let submission = AnnotationMap::from_path(&self.submission, &config)
            .with_context(|| format!("Invalid submission {}", self.submission.display()))?;

        let report = evaluate_maps(&ground_truth, &submission, config.zero_division())
            .context("Invalid prediction output")?;
        let tally = self
            .tally
            .then(|| EntityTally::from_annotations(&submission));

        let output = match self.format {
            OutputFormat::Text => {
                let mut output = report.to_string();
                if let Some(tally) = &tally {
                    output.push('\n');
                    output.push_str(&tally.to_string());
                }
                output
            }
            OutputFormat::Json => {
                let json = JsonOutput {
                    report: &report,
                    tally: tally.as_ref(),
                };
                serde_json::to_string_pretty(&json)?
            }
        };
        Ok(output)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.init_logging();
    log::debug!("Arguments: {:?}", args);

    let output = args.execute()?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["typeval", "gt.json", "sub.json"]).unwrap();
        assert_eq!(args.zero_division, DivByZeroStrat::ReplaceBy0);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.strict_shape);
        assert!(!args.tally);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_parse_options() {
        let args = Args::try_parse_from([
            "typeval",
            "gt.json",
            "sub.json",
            "--zero-division",
            "error",
            "--format",
            "json",
            "--tally",
            "--strict-shape",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.zero_division, DivByZeroStrat::ReturnError);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.strict_shape);
        assert!(args.tally);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_invalid_zero_division() {
        let res = Args::try_parse_from(["typeval", "gt.json", "sub.json", "-z", "nan"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let res = Args::try_parse_from(["typeval", "gt.json", "sub.json", "-q", "-v"]);
        assert!(res.is_err());
    }
}
