use anyhow::{Context, Result};
use clap::Parser;
use contagion_common::{series, Tally};
use env_logger::Builder;
use log::{debug, info, LevelFilter};
use plotters::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Command-line arguments for the chart renderer
#[derive(Parser, Debug)]
#[command(author, version, about = "Chart infected and immune cells over time", long_about = None)]
struct Args {
    /// Tally file written by the engine (.json or .bin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output chart path (.svg)
    #[arg(short, long, default_value = "contagion_chart.svg")]
    output: PathBuf,

    /// Width of the chart in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Height of the chart in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    Builder::from_default_env()
        .filter(None, LevelFilter::Info)
        .init();

    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    info!("Input file: {}", args.input.display());
    info!("Output chart: {}", args.output.display());

    let tallies = load_tallies(&args.input)?;
    if tallies.is_empty() {
        anyhow::bail!("No tallies recorded in '{}'; nothing to chart.", args.input.display());
    }
    info!("Loaded {} tallies.", tallies.len());

    chart_data(&tallies, &args.output, (args.width, args.height))?;
    info!("Chart saved to: {}", args.output.display());
    Ok(())
}

/// Reads tallies, picking the decoder from the file extension.
fn load_tallies(path: &Path) -> Result<Vec<Tally>> {
    let file = File::open(path).with_context(|| format!("Failed to open tally file '{}'", path.display()))?;
    let reader = BufReader::new(file);
    let tallies = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse JSON tallies from '{}'", path.display()))?,
        Some("bin") => bincode::deserialize_from(reader)
            .with_context(|| format!("Failed to decode bincode tallies from '{}'", path.display()))?,
        _ => anyhow::bail!("Unsupported tally file '{}': expected .json or .bin", path.display()),
    };
    Ok(tallies)
}

/// Plots infected and immune counts against the tick number.
fn chart_data(tallies: &[Tally], output: &Path, size: (u32, u32)) -> Result<()> {
    let (time, infected_cells, immune_cells) = series(tallies);
    let last_tick = time.iter().copied().max().unwrap_or(0).max(1);
    let y_max = infected_cells
        .iter()
        .chain(immune_cells.iter())
        .copied()
        .max()
        .unwrap_or(0)
        + 1;
    debug!("Chart extent: ticks 0..{}, cells 0..{}", last_tick, y_max);

    let root = SVGBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Infected and Immune Cells Over Time", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0u32..last_tick, 0u32..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time Ticks in the Simulation")
        .y_desc("Number of Cells")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            time.iter().copied().zip(infected_cells.iter().copied()),
            RED.stroke_width(2),
        ))?
        .label("infected cells")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .draw_series(LineSeries::new(
            time.iter().copied().zip(immune_cells.iter().copied()),
            BLUE.stroke_width(2),
        ))?
        .label("immune cells")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
