use std::path::PathBuf;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hotel-forecast"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("hotel-forecast process should run")
}

fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn parse_metric(stdout: &str, label: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"));
    let number = raw.split_whitespace().next().unwrap_or("");
    number
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("non-numeric value `{raw}` for `{label}`"))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("hotel-forecast-{}-{name}", std::process::id()))
}

#[test]
fn demo_prints_full_report() {
    let stdout = run_ok(&["--demo"]);
    assert!(stdout.contains("--- Monthly Forecast 2024-06 ---"));
    assert!(stdout.contains("--- Daily Ledger ---"));
    assert!(stdout.contains("--- Occupancy KPIs ---"));
    assert!(stdout.contains("--- Gas Inventory ---"));
    assert!(!stdout.contains("projected"));
    assert!(parse_metric(&stdout, "Total monthly cost:") > 0.0);
    // one ledger line per June day
    assert_eq!(stdout.lines().filter(|l| l.starts_with("2024-06-")).count(), 30);
}

#[test]
fn demo_is_deterministic_per_seed() {
    let a = run_ok(&["--demo", "--seed", "7"]);
    let b = run_ok(&["--demo", "--seed", "7"]);
    let c = run_ok(&["--demo", "--seed", "8"]);
    assert_eq!(a, b);
    assert_ne!(
        parse_metric(&a, "Total monthly cost:"),
        parse_metric(&c, "Total monthly cost:")
    );
}

#[test]
fn default_tariff_file_matches_builtin_defaults() {
    let builtin = run_ok(&["--demo"]);
    let from_file = run_ok(&["--demo", "--config", "tariffs/default.toml"]);
    assert_eq!(builtin, from_file);
}

#[test]
fn strict_power_factor_schedule_costs_more() {
    let default = run_ok(&["--demo"]);
    let strict = run_ok(&["--demo", "--config", "tariffs/strict_power_factor.toml"]);
    assert!(default.contains("bonus"), "demo month should earn a bonus: {default}");
    assert!(strict.contains("penalty"), "strict schedule should penalise: {strict}");
    assert!(
        parse_metric(&strict, "Total monthly cost:") > parse_metric(&default, "Total monthly cost:")
    );
}

#[test]
fn partial_demo_month_is_projected() {
    let stdout = run_ok(&["--demo", "--days", "10"]);
    assert!(stdout.contains("Days with data:        10/30 (projected x"));
}

#[test]
fn json_output_parses() {
    let stdout = run_ok(&["--demo", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(value["forecast"]["days_in_month"], 30);
    assert_eq!(value["ledger"].as_array().map(Vec::len), Some(30));
    assert!(value["forecast"]["total_monthly_cost"].as_f64().is_some());
    assert!(value["gas_inventory"]["total_liters"].as_f64().is_some());
    assert!(value["forecast"]["adjustment"]["kind"].is_string());
}

#[test]
fn daily_ledger_is_exported() {
    let path = temp_path("ledger.csv");
    let path_str = path.to_string_lossy().to_string();
    run_ok(&["--demo", "--daily-out", &path_str]);
    let written = std::fs::read_to_string(&path).expect("ledger file written");
    std::fs::remove_file(&path).ok();
    let mut lines = written.lines();
    assert!(lines.next().unwrap_or("").starts_with("date,energy_cost_base"));
    assert_eq!(lines.count(), 30);
}

#[test]
fn forecasts_from_csv_files() {
    let readings = temp_path("readings.csv");
    let pricing = temp_path("pricing.csv");
    let tanks = temp_path("tanks.csv");

    let mut csv = String::from(
        "date,electricity_base,electricity_intermediate,electricity_peak,water_municipal,\
         water_witness_meter,water_desalinated,reactive_power,demand_base,demand_intermediate,\
         demand_peak,gas_consumption,occupancy_guests,occupied_rooms,exchange_rate\n",
    );
    for d in 1..=5 {
        let n = f64::from(d);
        csv.push_str(&format!(
            "2024-01-{d:02},{},{},{},{},,{},{},0.3,0.35,0.4,200,150,80,\n",
            1000.0 + 2.0 * n,
            500.0 + n,
            200.0 + 0.5 * n,
            10_000.0 + 30.0 * n,
            4_000.0 + 10.0 * n,
            300.0 + n
        ));
    }
    std::fs::write(&readings, csv).unwrap();
    std::fs::write(
        &pricing,
        "year,month,fixed_cost,energy_price_base,energy_price_intermediate,energy_price_peak,\
         distribution_price,capacity_price,gas_price,water_price\n\
         2024,1,1000,1,1,1,100,200,2,5\n",
    )
    .unwrap();
    std::fs::write(
        &tanks,
        "year,month,tank_01,tank_02,tank_03,tank_04,tank_05,tank_06,tank_07,tank_08,\
         tank_09,tank_10,tank_11,tank_12,tank_13,tank_14\n\
         2024,1,50,50,50,50,50,50,50,50,50,50,50,50,50,50\n",
    )
    .unwrap();

    let output = run(&[
        "--readings",
        &readings.to_string_lossy(),
        "--pricing",
        &pricing.to_string_lossy(),
        "--tanks",
        &tanks.to_string_lossy(),
    ]);
    for p in [&readings, &pricing, &tanks] {
        std::fs::remove_file(p).ok();
    }

    assert!(output.status.success(), "stderr={}", String::from_utf8_lossy(&output.stderr));
    // binary-target info events show with the default filter
    assert!(String::from_utf8_lossy(&output.stderr).contains("inputs loaded"));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("--- Monthly Forecast 2024-01 ---"));
    // 5 records, 4 metered days -> projected to 31 days
    assert!(stdout.contains("Days with data:        5/31 (projected x7.750)"));
    assert!(stdout.contains("Stored:                35000 L (50.0% of capacity)"));
}

#[test]
fn unavailable_forecast_exits_with_two() {
    // a single reading has nothing to difference against
    let output = run(&["--demo", "--days", "1"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("forecast unavailable"));
}

#[test]
fn bad_arguments_exit_with_one() {
    assert_eq!(run(&["--bogus"]).status.code(), Some(1));
    assert_eq!(run(&["--month", "2024-13", "--demo"]).status.code(), Some(1));
    assert_eq!(run(&["--readings", "only.csv"]).status.code(), Some(1));
    assert_eq!(
        run(&["--demo", "--config", "does/not/exist.toml"]).status.code(),
        Some(1)
    );
}
