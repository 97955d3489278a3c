//! hexcover - cover GeoJSON geometries with a hexagonal grid.
//!
//! Usage:
//!   hexcover [options] <input.json> <output.json>
//!
//! Reads a GeoJSON document, tiles its bounding area with flat-topped
//! hexagons at the given radius in kilometers, and writes the grid as
//! JSON. All the work happens in the `hexcover` library; this binary only
//! parses arguments, moves bytes and prints diagnostics.

use std::env;
use std::fs;
use std::process;

use geojson::GeoJson;

use hexcover::{GridError, ParsedArgs, parse_args, run};

fn print_usage() {
    println!("hexcover - cover GeoJSON geometries with a hexagonal grid");
    println!();
    println!("Usage:");
    println!("  hexcover [options] <input.json> <output.json>");
    println!();
    println!("Options:");
    println!("  -r, --radius <km>    Hexagon radius in kilometers, dot decimal separator (default: 1)");
    println!("  -i, --intersects     Keep whole hexagons touching the input instead of clipping them to it");
    println!("  -b, --bb-box         Tile the raw bounding box, no clipping or filtering");
    println!("  -m, --merge          Combine the input collection into one multigeometry first");
    println!("  -p, --only-polygon   Only process polygonal geometries, skip lines");
    println!("  -h, --help           Show this help");
    println!();
    println!("Example:");
    println!("  hexcover -r 0.5 -i in.json out.json");
}

fn run_cli(args: &[String]) -> Result<(), GridError> {
    let (parsed, warnings) = parse_args(args)?;
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let cli = match parsed {
        ParsedArgs::Help => {
            print_usage();
            return Ok(());
        }
        ParsedArgs::Run(cli) => cli,
    };

    let input_path = cli.input.display().to_string();
    if !cli.input.exists() {
        return Err(GridError::InputNotFound(input_path));
    }

    let contents = fs::read_to_string(&cli.input).map_err(|source| GridError::ReadFailed {
        path: input_path.clone(),
        source,
    })?;

    let document: GeoJson = contents.parse().map_err(|source| GridError::ParseFailed {
        path: input_path.clone(),
        source,
    })?;

    let report = run(document, &cli.config)?;
    for skip in &report.skipped {
        eprintln!("warning: feature {}: {}, skipping", skip.index, skip.reason);
    }

    let output_path = cli.output.display().to_string();
    let json = report.output.to_json().map_err(|source| GridError::WriteFailed {
        path: output_path.clone(),
        source: std::io::Error::other(source),
    })?;
    fs::write(&cli.output, json).map_err(|source| GridError::WriteFailed {
        path: output_path.clone(),
        source,
    })?;

    println!(
        "Wrote {} grid collection(s) to {output_path}",
        report.output.len()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(error) = run_cli(&args) {
        eprintln!("error: {error}");
        process::exit(error.exit_code());
    }
}
