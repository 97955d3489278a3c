//! Run configuration and the command-line token loop.
//!
//! The parser consumes the raw argument list and produces an immutable
//! [`Config`] plus the two positional paths. It never touches the
//! filesystem; unknown tokens and excess positionals come back as warning
//! strings for the caller to print.

use std::path::PathBuf;

use crate::error::GridError;

/// Immutable run parameters, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Hexagon circumradius in kilometers. Finite and positive.
    pub radius: f64,
    /// Clip each tile to the input geometry (default). The
    /// `-i/--intersects` flag turns this off and keeps whole tiles that
    /// merely intersect the input.
    pub clip_to_input: bool,
    /// Emit the raw bounding-box tiling with no clipping or filtering.
    pub bbox_only: bool,
    /// Combine the whole input collection into one multigeometry first.
    pub merge: bool,
    /// Reject line geometries instead of closing them into polygons.
    pub polygon_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            radius: 1.0,
            clip_to_input: true,
            bbox_only: false,
            merge: false,
            polygon_only: false,
        }
    }
}

/// A parsed invocation: configuration plus the two positional paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub config: Config,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Outcome of argument parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedArgs {
    /// Normal run.
    Run(Cli),
    /// `--help` was given; print usage and exit 0 before any file I/O.
    Help,
}

/// Parse the argument list (without the program name).
///
/// Returns the parsed invocation and any non-fatal warnings, or a
/// [`GridError`] for a bad radius or a missing positional.
pub fn parse_args(args: &[String]) -> Result<(ParsedArgs, Vec<String>), GridError> {
    let mut config = Config::default();
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut warnings = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                return Ok((ParsedArgs::Help, warnings));
            }
            "-r" | "--radius" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err(GridError::InvalidRadius("<missing>".to_string()));
                };
                let radius: f64 = value
                    .parse()
                    .map_err(|_| GridError::InvalidRadius(value.clone()))?;
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(GridError::InvalidRadius(value.clone()));
                }
                config.radius = radius;
            }
            "-i" | "--intersects" => {
                config.clip_to_input = false;
            }
            "-b" | "--bb-box" => {
                config.bbox_only = true;
            }
            "-m" | "--merge" => {
                config.merge = true;
            }
            "-p" | "--only-polygon" => {
                config.polygon_only = true;
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                warnings.push(format!("unrecognized flag {flag}, ignoring"));
            }
            path => {
                if input.is_none() {
                    input = Some(PathBuf::from(path));
                } else if output.is_none() {
                    output = Some(PathBuf::from(path));
                } else {
                    warnings.push(format!("unrecognized parameter {path}, ignoring"));
                }
            }
        }
        i += 1;
    }

    let input = input.ok_or(GridError::MissingInput)?;
    let output = output.ok_or(GridError::MissingOutput)?;

    Ok((
        ParsedArgs::Run(Cli {
            config,
            input,
            output,
        }),
        warnings,
    ))
}
