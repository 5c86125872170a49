//! ---
//! cpes_section: "06-api-interfaces"
//! cpes_subsection: "01-bootstrap"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Synthetic dataset generator for scenario authoring and demos."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use cpes_calc_engine::export;
use cpes_calc_engine::MetricsRecord;
use cpes_core::FinancialParams;
use cpes_sim::{run_scenario, Scenario, ScenarioOutcome, SimulationConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioKind {
    Baseline,
    HighEfficiency,
    PeakLoad,
    HotWeather,
}

impl From<ScenarioKind> for Scenario {
    fn from(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Baseline => Scenario::Baseline,
            ScenarioKind::HighEfficiency => Scenario::HighEfficiency,
            ScenarioKind::PeakLoad => Scenario::PeakLoad,
            ScenarioKind::HotWeather => Scenario::HotWeather,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate synthetic chiller plant datasets with derived metrics",
    long_about = None
)]
struct Cli {
    /// Operating scenario to simulate
    #[arg(long, value_enum, default_value_t = ScenarioKind::Baseline)]
    scenario: ScenarioKind,

    /// Simulated span in hours
    #[arg(long, default_value_t = 24)]
    duration_hours: u32,

    /// Minutes between readings
    #[arg(long, default_value_t = 5)]
    timestep_minutes: u32,

    /// Fraction of rated plant load reached at the daily peak
    #[arg(long, default_value_t = 0.75)]
    load_factor: f64,

    /// Daily mean dry-bulb temperature in °C
    #[arg(long, default_value_t = 32.0)]
    ambient: f64,

    /// Electricity tariff in currency units per kWh
    #[arg(long)]
    tariff: Option<f64>,

    /// Random seed for the generator
    #[arg(long, default_value_t = 0xC001)]
    seed: u64,

    /// RFC 3339 start timestamp; omit to anchor at the current time
    #[arg(long)]
    start: Option<String>,

    /// Output file path. Use '-' for stdout.
    #[arg(long, default_value = "simulation.csv")]
    output: PathBuf,

    /// Explicit output format when the extension is ambiguous
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = determine_format(&cli.output, cli.format);
    let start = parse_start(cli.start.as_deref())?;
    let outcome = run(&cli, start)?;

    match format {
        OutputFormat::Csv => write_csv(&cli.output, &outcome.run.records)?,
        OutputFormat::Json => write_json(&cli.output, &outcome.run.records)?,
    }

    if cli.output.as_os_str() != "-" {
        eprintln!(
            "generated {} records ({} valid) for {} -> {}",
            outcome.run.summary.record_count,
            outcome.run.summary.valid_count,
            outcome.scenario.name(),
            cli.output.display()
        );
    }

    Ok(())
}

fn run(cli: &Cli, start: Option<DateTime<Utc>>) -> Result<ScenarioOutcome> {
    let config = SimulationConfig {
        duration_hours: cli.duration_hours,
        timestep_minutes: cli.timestep_minutes,
        load_factor: cli.load_factor,
        ambient_temp_base: cli.ambient,
        ..SimulationConfig::default()
    };
    let mut financial = FinancialParams::default();
    if let Some(tariff) = cli.tariff {
        financial.tariff_per_kwh = tariff;
        financial.validate()?;
    }

    let scenario = Scenario::from(cli.scenario);
    let outcome = run_scenario(scenario.name(), &config, cli.seed, &financial, start)?;
    Ok(outcome)
}

fn parse_start(start: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match start {
        Some(raw) => {
            let parsed = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid RFC 3339 start timestamp '{raw}'"))?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

fn determine_format(path: &Path, override_format: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = override_format {
        return format;
    }
    if path.as_os_str() == "-" {
        return OutputFormat::Json;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Csv,
    }
}

fn write_csv(output: &Path, records: &[MetricsRecord]) -> Result<()> {
    let writer: Box<dyn Write> = if output.as_os_str() == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            File::create(output)
                .with_context(|| format!("failed to create output file {}", output.display()))?,
        )
    };
    export::write_csv(records, writer)?;
    Ok(())
}

fn write_json(output: &Path, records: &[MetricsRecord]) -> Result<()> {
    if output.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, records)?;
        stdout.write_all(b"\n")?;
    } else {
        let file = File::create(output)
            .with_context(|| format!("failed to create output file {}", output.display()))?;
        serde_json::to_writer_pretty(file, records)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_cli() -> Cli {
        Cli {
            scenario: ScenarioKind::Baseline,
            duration_hours: 2,
            timestep_minutes: 5,
            load_factor: 0.75,
            ambient: 32.0,
            tariff: None,
            seed: 42,
            start: None,
            output: PathBuf::from("out.csv"),
            format: None,
        }
    }

    #[test]
    fn determine_format_defaults_csv() {
        assert!(matches!(
            determine_format(Path::new("plant.data"), None),
            OutputFormat::Csv
        ));
        assert!(matches!(
            determine_format(Path::new("plant.json"), None),
            OutputFormat::Json
        ));
    }

    #[test]
    fn determine_format_for_stdout_defaults_json() {
        assert!(matches!(
            determine_format(Path::new("-"), None),
            OutputFormat::Json
        ));
    }

    #[test]
    fn parse_start_accepts_rfc3339() {
        let parsed = parse_start(Some("2026-03-01T00:00:00Z")).unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert!(parse_start(Some("yesterday")).is_err());
        assert!(parse_start(None).unwrap().is_none());
    }

    #[test]
    fn run_produces_records_for_the_requested_span() {
        let cli = base_cli();
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let outcome = run(&cli, Some(start)).unwrap();
        assert_eq!(outcome.run.summary.record_count, 24);
        assert_eq!(outcome.scenario, Scenario::Baseline);
    }

    #[test]
    fn run_rejects_out_of_range_config() {
        let mut cli = base_cli();
        cli.duration_hours = 0;
        assert!(run(&cli, None).is_err());
    }

    #[test]
    fn run_rejects_invalid_tariff_override() {
        let mut cli = base_cli();
        cli.tariff = Some(-1.0);
        assert!(run(&cli, None).is_err());
    }

    #[test]
    fn fixed_seed_and_start_are_reproducible() {
        let cli = base_cli();
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let first = run(&cli, Some(start)).unwrap();
        let second = run(&cli, Some(start)).unwrap();
        assert_eq!(first.run.records, second.run.records);
    }
}
