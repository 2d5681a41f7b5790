use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, trace, warn};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

// Define modules used by main
mod cell;
mod simulation;

use contagion_common::{SimulationConfig, Tally};
use simulation::Model;

/// Command-line arguments for the engine
#[derive(Parser, Debug)]
#[command(author, version, about = "Determine number and types of initial cells", long_about = None)]
#[command(allow_negative_numbers = true)]
struct Args {
    /// Total number of cells present.
    cells: i64,

    /// Initial number of infected cells present.
    infected: i64,

    /// Initial number of immune cells present.
    immune: i64,

    /// Optional path to a config.toml with arena, cell and output settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for initial placement (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks even if cells are still infected
    #[arg(long)]
    max_ticks: Option<u32>,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    let args = Args::parse();
    println!(
        "{} cells total, {} infected initially, {} immune initially",
        args.cells, args.infected, args.immune
    );

    info!("Starting Contagion Engine...");

    // --- Load Configuration ---
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    config.initial_conditions.cell_count = args.cells;
    config.initial_conditions.first_infected = args.infected;
    config.initial_conditions.first_immune = args.immune;
    if args.seed.is_some() {
        config.initial_conditions.placement_seed = args.seed;
    }
    if args.max_ticks.is_some() {
        config.timing.max_ticks = args.max_ticks;
    }

    // --- Initialize Simulation ---
    let mut model = Model::from_config(&config)?;
    info!("Population initialized with {} cells.", model.population.len());
    debug!("Simulation Parameters: {:#?}", model.params());

    // --- Simulation Loop ---
    let max_ticks = config.timing.max_ticks;
    let start_time = Instant::now();
    let mut previous_print_time = start_time;
    let print_interval_secs = 5.0;

    while !model.is_complete() {
        if max_ticks.is_some_and(|cap| model.time >= cap) {
            warn!(
                "Tick cap ({}) reached with {} cells still infected. Stopping early.",
                model.time,
                model.tally().infected
            );
            break;
        }

        let tick_start_time = Instant::now();
        model.tick();
        let tally = model.record_tally();
        let tick_duration = tick_start_time.elapsed();

        let current_time = Instant::now();
        if current_time.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs {
            info!(
                "Tick [{}] | Infected: {} | Immune: {} | Tick Time: {:6.2} ms | Elapsed: {:.2} s",
                tally.tick,
                tally.infected,
                tally.immune,
                tick_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = current_time;
        } else {
            trace!("Tick [{}] completed in {:.2} ms", tally.tick, tick_duration.as_secs_f64() * 1000.0);
        }
    }

    let total_duration = start_time.elapsed();
    let summary = model.summary();
    info!(
        "Simulation finished after {} ticks in {:.3} seconds.",
        summary.ticks,
        total_duration.as_secs_f64()
    );
    info!(
        "Peak of {} infected at tick {}; {} immune and {} never infected at the end.",
        summary.peak_infected, summary.peak_tick, summary.final_immune, summary.final_vulnerable
    );

    // --- Save Recorded Data ---
    let output = &config.output;
    if output.save_stats {
        let tallies = model.get_recorded_tallies();
        save_tallies(tallies, &output.base_filename, output.format.as_deref().unwrap_or("json"))?;
        save_tallies_csv(tallies, &output.base_filename)?;
    } else {
        info!("Skipping saving tallies as per config (save_stats is false).");
    }

    if output.save_positions {
        save_positions(&model.get_results(), &output.base_filename)?;
    } else {
        debug!("Skipping saving final positions as per config.");
    }

    if summary.completed {
        println!("done");
    }
    Ok(())
}

/// Writes the tallies in the configured serialization format.
fn save_tallies(tallies: &[Tally], base_filename: &str, format: &str) -> Result<()> {
    match format {
        "bincode" => {
            let filename = format!("{}_tallies.bin", base_filename);
            let file = File::create(&filename)
                .with_context(|| format!("Error creating tally file '{}'", filename))?;
            bincode::serialize_into(file, tallies).context("Error serializing tallies to bincode")?;
            info!("Tallies saved to {} (binary format)", filename);
        }
        "messagepack" => {
            let filename = format!("{}_tallies.msgpack", base_filename);
            let mut file = File::create(&filename)
                .with_context(|| format!("Error creating tally file '{}'", filename))?;
            rmp_serde::encode::write(&mut file, tallies).context("Error serializing tallies to MessagePack")?;
            info!("Tallies saved to {} (MessagePack format)", filename);
        }
        "json" => write_json(tallies, base_filename)?,
        other => {
            error!("Unknown output format: {}. Using JSON instead.", other);
            write_json(tallies, base_filename)?;
        }
    }
    Ok(())
}

fn write_json(tallies: &[Tally], base_filename: &str) -> Result<()> {
    let filename = format!("{}_tallies.json", base_filename);
    let json_string = serde_json::to_string(tallies).context("Error serializing tallies to JSON")?;
    let mut file = File::create(&filename)
        .with_context(|| format!("Error creating tally file '{}'", filename))?;
    file.write_all(json_string.as_bytes())
        .with_context(|| format!("Error writing tally JSON to file '{}'", filename))?;
    info!("Tallies saved to {}", filename);
    Ok(())
}

/// Writes the three chart series (plus the vulnerable count) as CSV.
fn save_tallies_csv(tallies: &[Tally], base_filename: &str) -> Result<()> {
    let filename = format!("{}_tallies.csv", base_filename);
    let mut writer = csv::Writer::from_path(&filename)
        .with_context(|| format!("Error creating tally CSV '{}'", filename))?;
    // Header row comes from the Tally field names.
    for t in tallies {
        writer.serialize(t)?;
    }
    writer.flush()?;
    info!("Tally CSV saved to {}", filename);
    Ok(())
}

/// Writes each cell's final position, display colour and sickness code as CSV.
fn save_positions(results: &[(f32, f32, &str, i64)], base_filename: &str) -> Result<()> {
    let filename = format!("{}_final_positions.csv", base_filename);
    let mut writer = csv::Writer::from_path(&filename)
        .with_context(|| format!("Error creating positions file '{}'", filename))?;
    writer.write_record(["x", "y", "state", "sickness"])?;
    for (x, y, color, sickness) in results {
        writer.write_record(&[format!("{:.4}", x), format!("{:.4}", y), color.to_string(), sickness.to_string()])?;
    }
    writer.flush()?;
    info!("Final positions saved to {}", filename);
    Ok(())
}
