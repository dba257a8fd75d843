//! solarflow entry point — CLI wiring and config-driven simulation.

use std::path::Path;
use std::process;

use solarflow::config::ScenarioConfig;
use solarflow::cost::{CostReport, cost_breakdown, cumulative_costs};
use solarflow::dispatch::{DispatchInput, Dispatcher};
use solarflow::forecast::{ClearSkyModel, ForecastInputs, SolarForecast};
use solarflow::io::export::export_csv;
use solarflow::sim::{Engine, SimParams, SiteParams, Weather};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    hours_override: Option<u32>,
    battery_level_override: Option<f32>,
    once: bool,
    csv_out: Option<String>,
}

fn print_help() {
    eprintln!("solarflow — Solar microgrid dispatch and cost simulation");
    eprintln!();
    eprintln!("Usage: solarflow [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (sunny, cloudy, stormy)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --hours <u32>            Override simulation horizon");
    eprintln!("  --battery-level <kwh>    Override initial battery level");
    eprintln!("  --once                   Single dispatch at the start hour, no simulation");
    eprintln!("  --csv-out <path>         Export cost-annotated results to CSV");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the sunny preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        hours_override: None,
        battery_level_override: None,
        once: false,
        csv_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--hours" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --hours requires a u32 argument");
                    process::exit(1);
                }
                if let Ok(h) = args[i].parse::<u32>() {
                    cli.hours_override = Some(h);
                } else {
                    eprintln!("error: --hours value \"{}\" is not a valid u32", args[i]);
                    process::exit(1);
                }
            }
            "--battery-level" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --battery-level requires a kWh argument");
                    process::exit(1);
                }
                if let Ok(level) = args[i].parse::<f32>() {
                    cli.battery_level_override = Some(level);
                } else {
                    eprintln!(
                        "error: --battery-level value \"{}\" is not a valid number",
                        args[i]
                    );
                    process::exit(1);
                }
            }
            "--once" => {
                cli.once = true;
            }
            "--csv-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --csv-out requires a path argument");
                    process::exit(1);
                }
                cli.csv_out = Some(args[i].clone());
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

/// Single dispatch at the start hour with unperturbed base weather.
///
/// Prints the predicted output, the allocation, its cost breakdown, the
/// post-step battery level, and a grid status line.
fn run_once(cfg: &ScenarioConfig) {
    let model = ClearSkyModel::new(cfg.site.panel_kw_peak);
    let solar_kw = model.predict_kw(&ForecastInputs {
        hour: cfg.simulation.start_hour,
        day_of_year: cfg.simulation.day_of_year,
        irradiance_wm2: cfg.weather.irradiance_wm2,
        cloud_cover_pct: cfg.weather.cloud_cover_pct,
        temperature_c: cfg.weather.temperature_c,
    });

    let dispatcher = Dispatcher::new(cfg.strategy().unwrap_or_else(|| {
        eprintln!("error: invalid dispatch strategy");
        process::exit(1);
    }));
    let input = DispatchInput {
        solar_kw,
        demand_kw: cfg.site.demand_kw,
        capacity_kwh: cfg.battery.capacity_kwh,
        level_kwh: cfg.battery.initial_level_kwh,
    };
    let allocation = match dispatcher.dispatch(&input) {
        Ok(allocation) => allocation,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let new_level = (cfg.battery.initial_level_kwh + allocation.battery_change_kwh)
        .clamp(0.0, cfg.battery.capacity_kwh);
    let breakdown = cost_breakdown(&allocation, cfg.site.demand_kw, cfg.simulation.price_per_kwh);

    println!("Predicted solar output: {solar_kw:.2} kW");
    println!("Allocation: {allocation}");
    println!("New battery level: {new_level:.2} kWh");
    println!("Cost: {breakdown}");

    let shortfall = allocation.shortfall_kw(cfg.site.demand_kw);
    if shortfall > 0.0 {
        println!("Grid status: risk of imbalance (shortfall: {shortfall:.2} kW)");
    } else {
        println!("Grid status: stable");
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then sunny default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::sunny()
    };

    // Apply overrides
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(hours) = cli.hours_override {
        scenario.simulation.horizon_hours = hours;
    }
    if let Some(level) = cli.battery_level_override {
        scenario.battery.initial_level_kwh = level;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    if cli.once {
        run_once(&scenario);
        return;
    }

    // Build and run
    let strategy = scenario.strategy().unwrap_or_else(|| {
        eprintln!("error: invalid dispatch strategy");
        process::exit(1);
    });
    let params = SimParams::new(
        scenario.simulation.horizon_hours,
        scenario.simulation.start_hour,
        scenario.simulation.day_of_year,
        scenario.simulation.seed,
    );
    let site = SiteParams::new(
        scenario.site.demand_kw,
        scenario.battery.capacity_kwh,
        scenario.battery.initial_level_kwh,
    );
    let base_weather = Weather {
        irradiance_wm2: scenario.weather.irradiance_wm2,
        cloud_cover_pct: scenario.weather.cloud_cover_pct,
        temperature_c: scenario.weather.temperature_c,
    };
    let mut engine = Engine::new(
        params,
        site,
        base_weather,
        ClearSkyModel::new(scenario.site.panel_kw_peak),
        Dispatcher::new(strategy),
    );

    let records = match engine.run() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Per-step rows
    for record in &records {
        println!("{record}");
    }

    // Cost projection and summary
    let costs = cumulative_costs(&records, scenario.simulation.price_per_kwh);
    let report = CostReport::from_records(&records, &costs, scenario.site.demand_kw);
    println!("\n{report}");

    // Final level, for the caller to feed back via --battery-level
    println!("\nFinal battery level: {:.2} kWh", engine.battery_level_kwh());

    // Export CSV if requested
    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&records, &costs, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Results written to {path}");
    }
}
