//! # hexcover
//!
//! Covers GeoJSON geometries with a flat-topped hexagonal grid.
//!
//! The library does the whole job apart from terminal I/O: parse-time
//! configuration, geometry normalization (lines become closed polygons),
//! hex tiling of the bounding region, per-tile clipping or filtering, and
//! assembly of the output document. The CLI crate only shuttles bytes and
//! prints diagnostics.

pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod process;

// Re-export common types at crate root for convenience.
pub use config::{Cli, Config, ParsedArgs, parse_args};
pub use driver::{GridOutput, RunReport, SkippedFeature, run};
pub use error::GridError;
pub use geometry::{SkipReason, combine, normalize};
pub use grid::hex_grid;
pub use process::process_geometry;
