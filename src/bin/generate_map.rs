//! Map generator binary: fills a tile grid and prints it.
//!
//! Usage: cargo run --release --bin generate_map -- [OPTIONS]
//!
//! Options:
//!   --method <NAME>   bsp | cellular | noise (default: bsp)
//!   --width <N>       Grid width in cells (default: 64)
//!   --height <N>      Grid height in cells (default: 40)
//!   --seed <SEED>     Random seed (default: random, printed)
//!   --config <PATH>   JSON generation config (overrides --method)
//!   --json <PATH>     Also write the grid as JSON
//!   --async           Drive generation on a tokio runtime

use std::path::PathBuf;

use serde_json::json;

use tilegen::core::{Error, Result};
use tilegen::generation::{CellularConfig, NoiseConfig, SpacePartitionConfig};
use tilegen::{CancellationSignal, GenerationConfig, GenerationMethod, Outcome, TileGrid, TileKind};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let width = parse_i32_arg(&args, "--width").unwrap_or(64);
    let height = parse_i32_arg(&args, "--height").unwrap_or(40);
    let seed = parse_u64_arg(&args, "--seed");
    let json_path = parse_str_arg(&args, "--json").map(PathBuf::from);
    let use_async = args.iter().any(|a| a == "--async");

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => GenerationConfig::load(path)?,
        None => {
            let method = parse_str_arg(&args, "--method").unwrap_or_else(|| "bsp".to_string());
            GenerationConfig::with_method(method_from_name(&method)?)
        }
    };
    if seed.is_some() {
        config.seed = seed;
    }
    if !use_async {
        // Nothing to wait for without a host loop
        config.step_delay_ms = 0;
    }

    println!("=== Tilegen Map Generator ===");
    println!("Method: {}", config.method.name());
    println!("Grid:   {} x {}", width, height);
    println!();

    let mut grid = TileGrid::new(width, height);
    let cancel = CancellationSignal::new();

    let outcome = if use_async {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(tilegen::generate_async(&config, &mut grid, &cancel))?
    } else {
        tilegen::generate(&config, &mut grid, &cancel)?
    };

    print!("{}", grid.to_ascii());
    println!();
    print_summary(&grid, &outcome);

    if let Some(path) = json_path {
        let document = json!({
            "method": config.method.name(),
            "config": config,
            "width": width,
            "height": height,
            "grid": grid,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        println!("JSON:   {}", path.display());
    }

    Ok(())
}

fn method_from_name(name: &str) -> Result<GenerationMethod> {
    match name {
        "bsp" => Ok(GenerationMethod::SpacePartition(SpacePartitionConfig::default())),
        "cellular" => Ok(GenerationMethod::CellularAutomaton(CellularConfig::default())),
        "noise" => Ok(GenerationMethod::NoiseField(NoiseConfig::default())),
        other => Err(Error::Config(format!("unknown method '{}'", other))),
    }
}

fn print_summary(grid: &TileGrid, outcome: &Outcome) {
    let report = outcome.report();
    println!("=== Generation {} ===", if outcome.is_completed() { "Complete" } else { "Cancelled" });
    println!("Units:  {} ({} checkpoints)", report.units, report.checkpoints);
    println!("Tiles:  {} committed in {:.1}ms", report.tiles_committed, report.elapsed.as_secs_f64() * 1000.0);
    for kind in TileKind::ALL {
        let count = grid.count(kind);
        if count > 0 {
            println!("  {} {:<9} {}", kind.glyph(), kind.name(), count);
        }
    }
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
