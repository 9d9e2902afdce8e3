//! Hotel utility forecast entry point: CLI wiring, data loading and report
//! printing.

use std::path::Path;
use std::process;

use serde::Serialize;
use tracing::{info, warn};

use hotel_utility_forecast::config::TariffConfig;
use hotel_utility_forecast::engine::{ForecastEngine, GasInventory, MonthReadings, MonthReport};
use hotel_utility_forecast::io::export::export_daily_ledger;
use hotel_utility_forecast::io::import::{
    read_pricing_path, read_readings_path, read_tank_snapshots_path,
};
use hotel_utility_forecast::io::synthetic::generate_month;
use hotel_utility_forecast::logging::init_tracing;
use hotel_utility_forecast::readings::{
    DailyReading, GasTankSnapshot, PricingTable, YearMonth,
};

/// Seed used by `--demo` when `--seed` is not given.
const DEFAULT_DEMO_SEED: u64 = 42;

/// Month generated by `--demo` when `--month` is not given.
const DEFAULT_DEMO_MONTH: YearMonth = YearMonth {
    year: 2024,
    month: 6,
};

/// Parsed CLI arguments.
struct CliArgs {
    readings_path: Option<String>,
    pricing_path: Option<String>,
    tanks_path: Option<String>,
    month: Option<YearMonth>,
    config_path: Option<String>,
    daily_out: Option<String>,
    json: bool,
    demo: bool,
    demo_days: Option<usize>,
    seed: u64,
}

/// Inputs for one run, from files or the synthetic generator.
struct Inputs {
    period: YearMonth,
    history: Vec<DailyReading>,
    pricing: PricingTable,
    tanks: Vec<GasTankSnapshot>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a MonthReport,
    gas_inventory: Option<GasInventory>,
}

fn print_help() {
    eprintln!("hotel-forecast - Monthly utility cost forecast for a hotel property");
    eprintln!();
    eprintln!("Usage: hotel-forecast [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --readings <path>        Daily meter readings CSV");
    eprintln!("  --pricing <path>         Monthly pricing CSV");
    eprintln!("  --tanks <path>           Gas tank snapshot CSV");
    eprintln!("  --month <YYYY-MM>        Month to forecast (default: latest month read,");
    eprintln!("                           {DEFAULT_DEMO_MONTH} with --demo)");
    eprintln!("  --config <path>          Tariff configuration TOML");
    eprintln!("  --daily-out <path>       Export the daily cost ledger to CSV");
    eprintln!("  --json                   Print the report as JSON");
    eprintln!("  --demo                   Use a synthetic month instead of files");
    eprintln!("  --days <n>               Keep only the first n demo days (partial month)");
    eprintln!("  --seed <u64>             Seed for --demo (default: {DEFAULT_DEMO_SEED})");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Without --demo, --readings and --pricing are required.");
}

/// Returns the value following a flag or exits with a usage error.
fn flag_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    if let Some(v) = args.get(i) {
        v.clone()
    } else {
        eprintln!("error: {flag} requires {what}");
        process::exit(1);
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        readings_path: None,
        pricing_path: None,
        tanks_path: None,
        month: None,
        config_path: None,
        daily_out: None,
        json: false,
        demo: false,
        demo_days: None,
        seed: DEFAULT_DEMO_SEED,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--readings" => {
                i += 1;
                cli.readings_path = Some(flag_value(&args, i, "--readings", "a path argument"));
            }
            "--pricing" => {
                i += 1;
                cli.pricing_path = Some(flag_value(&args, i, "--pricing", "a path argument"));
            }
            "--tanks" => {
                i += 1;
                cli.tanks_path = Some(flag_value(&args, i, "--tanks", "a path argument"));
            }
            "--month" => {
                i += 1;
                let raw = flag_value(&args, i, "--month", "a YYYY-MM argument");
                if let Some(m) = YearMonth::parse(&raw) {
                    cli.month = Some(m);
                } else {
                    eprintln!("error: --month value \"{raw}\" is not a valid YYYY-MM month");
                    process::exit(1);
                }
            }
            "--config" => {
                i += 1;
                cli.config_path = Some(flag_value(&args, i, "--config", "a path argument"));
            }
            "--daily-out" => {
                i += 1;
                cli.daily_out = Some(flag_value(&args, i, "--daily-out", "a path argument"));
            }
            "--json" => cli.json = true,
            "--demo" => cli.demo = true,
            "--days" => {
                i += 1;
                let raw = flag_value(&args, i, "--days", "a count argument");
                if let Ok(n) = raw.parse::<usize>() {
                    cli.demo_days = Some(n);
                } else {
                    eprintln!("error: --days value \"{raw}\" is not a valid count");
                    process::exit(1);
                }
            }
            "--seed" => {
                i += 1;
                let raw = flag_value(&args, i, "--seed", "a u64 argument");
                if let Ok(s) = raw.parse::<u64>() {
                    cli.seed = s;
                } else {
                    eprintln!("error: --seed value \"{raw}\" is not a valid u64");
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Builds the synthetic demo inputs.
fn demo_inputs(cli: &CliArgs) -> Inputs {
    let period = cli.month.unwrap_or(DEFAULT_DEMO_MONTH);

    let complete = cli
        .demo_days
        .is_none_or(|n| n >= period.days_in_month() as usize);
    let mut month = generate_month(period, cli.seed, complete);
    if let Some(n) = cli.demo_days {
        month.readings.truncate(n);
    }

    let pricing = match PricingTable::from_records([month.pricing.clone()]) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    Inputs {
        period,
        history: month.history(),
        pricing,
        tanks: vec![month.tanks],
    }
}

/// Loads inputs from CSV files.
fn file_inputs(cli: &CliArgs) -> Inputs {
    let (Some(readings_path), Some(pricing_path)) = (&cli.readings_path, &cli.pricing_path)
    else {
        eprintln!("error: --readings and --pricing are required without --demo");
        print_help();
        process::exit(1);
    };

    let history = read_readings_path(Path::new(readings_path)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    let pricing = read_pricing_path(Path::new(pricing_path)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    let tanks = match &cli.tanks_path {
        Some(path) => read_tank_snapshots_path(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        }),
        None => Vec::new(),
    };

    let period = match cli.month.or_else(|| history.last().map(|r| YearMonth::of(r.date))) {
        Some(p) => p,
        None => {
            eprintln!("error: no readings in \"{readings_path}\" and no --month given");
            process::exit(1);
        }
    };

    info!(
        readings = history.len(),
        priced_months = pricing.len(),
        snapshots = tanks.len(),
        "inputs loaded"
    );

    Inputs {
        period,
        history,
        pricing,
        tanks,
    }
}

fn main() {
    let cli = parse_args();
    init_tracing();

    // Load config: --config file, otherwise the default preset
    let config = if let Some(ref path) = cli.config_path {
        match TariffConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        TariffConfig::default()
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let inputs = if cli.demo {
        demo_inputs(&cli)
    } else {
        file_inputs(&cli)
    };

    let engine = ForecastEngine::new(config, inputs.pricing);
    let month = MonthReadings::from_history(inputs.period, &inputs.history);
    let report = match engine.forecast_month(&month) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    // Latest snapshot of the month wins
    let gas_inventory = inputs
        .tanks
        .iter()
        .rev()
        .find(|s| s.period() == Some(inputs.period))
        .and_then(|s| match engine.gas_inventory(s, &report.days) {
            Ok(inv) => Some(inv),
            Err(e) => {
                warn!(error = %e, "gas inventory skipped");
                None
            }
        });

    if cli.json {
        let out = JsonReport {
            report: &report,
            gas_inventory,
        };
        match serde_json::to_string_pretty(&out) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to serialise report: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("{}", report.forecast);

        println!("\n--- Daily Ledger ---");
        for c in &report.ledger {
            println!("{c}");
        }

        println!("\n{}", report.kpis);

        if let Some(ref inv) = gas_inventory {
            println!("\n{inv}");
        }
    }

    if let Some(ref path) = cli.daily_out {
        if let Err(e) = export_daily_ledger(&report.ledger, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Daily ledger written to {path}");
    }
}
