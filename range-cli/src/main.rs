use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flight_range_core::core_types::{Kilograms, Meters, SquareMeters};
use flight_range_core::{
    simulate_record, simulate_records, BatchSummary, BirdRecord, FlightConfig, FlightOutcome,
    FlightRangeError, SpeedControl, TerminationReason,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Migratory flight range estimation
#[derive(Parser, Debug)]
#[command(name = "flight-range")]
#[command(about = "Estimate bird migration range from body measurements", long_about = None)]
struct Args {
    /// JSON file holding an array of bird records (batch mode)
    #[arg(short, long, conflicts_with = "mass")]
    input: Option<PathBuf>,

    /// JSON file overriding physical constants and run settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Body mass in kg
    #[arg(long, required_unless_present = "input")]
    mass: Option<f64>,

    /// Wingspan in m
    #[arg(long)]
    span: Option<f64>,

    /// Wing area in m²
    #[arg(long)]
    area: Option<f64>,

    /// Fat mass in kg
    #[arg(long)]
    fat: Option<f64>,

    /// Flight muscle mass in kg
    #[arg(long, default_value_t = 0.0)]
    muscle: f64,

    /// Taxonomic order (passerine, non-passerine)
    #[arg(long, default_value = "passerine")]
    order: String,

    /// Airspeed control strategy
    #[arg(short, long, value_enum)]
    speed_control: Option<SpeedControlArg>,

    /// Time step in seconds
    #[arg(short, long)]
    time_step: Option<f64>,

    /// Maximum number of steps per flight
    #[arg(long)]
    max_steps: Option<u32>,

    /// Print the per-step trace
    #[arg(long)]
    trace: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SpeedControlArg {
    /// Hold take-off airspeed
    ConstantSpeed,
    /// Hold airspeed at 1.2 × Vmp
    ConstantRatio,
}

impl From<SpeedControlArg> for SpeedControl {
    fn from(arg: SpeedControlArg) -> Self {
        match arg {
            SpeedControlArg::ConstantSpeed => SpeedControl::ConstantSpeed,
            SpeedControlArg::ConstantRatio => SpeedControl::ConstantRatio,
        }
    }
}

/// One line of JSON output per record
#[derive(Serialize)]
#[serde(untagged)]
enum RecordReport<'a> {
    Flown(&'a FlightOutcome),
    Rejected {
        name: Option<&'a str>,
        error: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let records = load_records(&args)?;
    info!("Loaded {} bird record(s)", records.len());

    let results = if let [record] = records.as_slice() {
        vec![simulate_record(record, &config)]
    } else {
        simulate_records(&records, &config)
    };

    if args.json {
        print_json(&records, &results)?;
    } else {
        print_table(&records, &results, args.trace);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<FlightConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = read(path)?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => FlightConfig::default(),
    };

    if let Some(control) = args.speed_control {
        config = config.with_speed_control(control.into());
    }
    if let Some(seconds) = args.time_step {
        config = config.with_time_step(seconds);
    }
    if let Some(max_steps) = args.max_steps {
        config = config.with_max_steps(max_steps);
    }
    if args.trace {
        config = config.with_trace(true);
    }

    Ok(config)
}

/// Read the dataset as raw records so a bad order label only rejects its row
fn load_records(args: &Args) -> Result<Vec<BirdRecord>> {
    if let Some(path) = &args.input {
        let contents = read(path)?;
        return serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse bird records in {}", path.display()));
    }

    let mass = args.mass.context("--mass is required without --input")?;
    let span = args.span.context("--span is required for a single bird")?;
    let area = args.area.context("--area is required for a single bird")?;
    let fat = args.fat.context("--fat is required for a single bird")?;

    Ok(vec![BirdRecord {
        name: None,
        body_mass: Kilograms::new(mass),
        wing_span: Meters::new(span),
        wing_area: SquareMeters::new(area),
        fat_mass: Kilograms::new(fat),
        muscle_mass: Kilograms::new(args.muscle),
        order: args.order.clone(),
    }])
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json(
    records: &[BirdRecord],
    results: &[Result<FlightOutcome, FlightRangeError>],
) -> Result<()> {
    let reports: Vec<RecordReport<'_>> = records
        .iter()
        .zip(results)
        .map(|(record, result)| match result {
            Ok(outcome) => RecordReport::Flown(outcome),
            Err(err) => RecordReport::Rejected {
                name: record.name.as_deref(),
                error: err.to_string(),
            },
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn print_table(
    records: &[BirdRecord],
    results: &[Result<FlightOutcome, FlightRangeError>],
    show_trace: bool,
) {
    println!("=== Flight Range Estimates ===\n");
    println!(
        "{:<4} {:<24} {:>10} {:>7} {:>9} {:>9}  Termination",
        "#", "Name", "Range km", "Steps", "Hours", "Vt m/s"
    );

    for (index, (record, result)) in records.iter().zip(results).enumerate() {
        let name = record.name.as_deref().unwrap_or("-");
        match result {
            Ok(outcome) => {
                println!(
                    "{:<4} {:<24} {:>10.1} {:>7} {:>9.2} {:>9.2}  {}",
                    index,
                    name,
                    outcome.range_km(),
                    outcome.step_count,
                    outcome.flight_duration.as_hours(),
                    *outcome.take_off_airspeed,
                    describe(&outcome.termination)
                );
                if show_trace {
                    print_trace(outcome);
                }
            }
            Err(err) => println!("{:<4} {:<24} rejected: {}", index, name, err),
        }
    }

    if results.len() > 1 {
        let summary = BatchSummary::from_results(results);
        println!(
            "\n{} records: {} exhausted, {} infeasible, {} hit step limit, {} rejected",
            summary.total,
            summary.exhausted,
            summary.infeasible,
            summary.max_steps_reached,
            summary.rejected
        );
    }
}

fn print_trace(outcome: &FlightOutcome) {
    let Some(trace) = &outcome.trace else {
        return;
    };

    println!(
        "     {:>6} {:>10} {:>9} {:>9} {:>9} {:>11}",
        "step", "mass kg", "Vt m/s", "Pmech W", "Pchem W", "dist km"
    );
    for sample in trace {
        println!(
            "     {:>6} {:>10.5} {:>9.3} {:>9.4} {:>9.4} {:>11.2}",
            sample.step,
            *sample.body_mass,
            *sample.airspeed,
            *sample.mechanical_power,
            *sample.chemical_power,
            *sample.distance / 1000.0
        );
    }
}

fn describe(termination: &TerminationReason) -> String {
    match termination {
        TerminationReason::Exhausted => "fuel exhausted".to_string(),
        TerminationReason::Infeasible {
            step,
            quantity,
            value,
        } => format!("infeasible at step {step} ({quantity} = {value})"),
        TerminationReason::MaxStepsReached => "step limit reached".to_string(),
    }
}
