//! Collection driver: dispatch over the parsed GeoJSON document, drive the
//! grid processor per feature, and assemble the output document.
//!
//! Input shape is decided by matching the `GeoJson` enum, never by probing
//! properties: a FeatureCollection yields a list of grids (one per
//! surviving feature), a bare Feature or Geometry yields a single grid.
//! Inside a collection every failure is contained to its feature; on a
//! bare input the same failure is fatal.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use geojson::{FeatureCollection, GeoJson, Value};

use crate::config::Config;
use crate::error::GridError;
use crate::geometry::{SkipReason, combine, normalize};
use crate::process::process_geometry;

/// Final output document.
#[derive(Debug, Clone, PartialEq)]
pub enum GridOutput {
    /// Bare Feature/Geometry input: one grid collection.
    Single(FeatureCollection),
    /// FeatureCollection input: one grid collection per surviving feature.
    PerFeature(Vec<FeatureCollection>),
}

impl GridOutput {
    /// Serialize as the output JSON document (object or array).
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            GridOutput::Single(grid) => serde_json::to_string(grid),
            GridOutput::PerFeature(grids) => serde_json::to_string(grids),
        }
    }

    /// Number of grid collections produced.
    pub fn len(&self) -> usize {
        match self {
            GridOutput::Single(_) => 1,
            GridOutput::PerFeature(grids) => grids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A feature that was skipped, with its position in the input collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of a run: the output document plus skip records for the caller
/// to report.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub output: GridOutput,
    pub skipped: Vec<SkippedFeature>,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic in geometry operation".to_string()
    }
}

/// Run a geometry operation, turning a panic into an operation failure.
/// The geometry library's boolean ops can panic on degenerate rings; the
/// caller decides whether that skips a feature or ends the run.
fn contain_panics<F>(op: F) -> Result<FeatureCollection, SkipReason>
where
    F: FnOnce() -> Result<FeatureCollection, SkipReason>,
{
    catch_unwind(AssertUnwindSafe(op)).unwrap_or_else(|payload| {
        Err(SkipReason::OperationFailed(panic_message(payload)))
    })
}

/// Normalize and tile one geometry value.
fn process_value(
    value: &Value,
    config: &Config,
) -> Result<FeatureCollection, SkipReason> {
    let geom = normalize(value, config)?;
    contain_panics(|| process_geometry(&geom, config))
}

fn run_single(value: &Value, config: &Config) -> Result<RunReport, GridError> {
    match process_value(value, config) {
        Ok(grid) => Ok(RunReport {
            output: GridOutput::Single(grid),
            skipped: Vec::new(),
        }),
        // No batch to fall back to: a bad bare input ends the run.
        Err(SkipReason::OperationFailed(msg)) => Err(GridError::OperationFailed(msg)),
        Err(reason) => Err(GridError::InvalidGeometry(reason.to_string())),
    }
}

/// Run the grid workflow over a parsed GeoJSON document.
pub fn run(input: GeoJson, config: &Config) -> Result<RunReport, GridError> {
    // Merge mode folds the collection into combined multigeometries before
    // anything else; bare inputs have nothing to merge.
    let input = if config.merge {
        match input {
            GeoJson::FeatureCollection(fc) => {
                GeoJson::FeatureCollection(combine(&fc))
            }
            other => other,
        }
    } else {
        input
    };

    match input {
        GeoJson::FeatureCollection(fc) => {
            let mut grids = Vec::new();
            let mut skipped = Vec::new();
            for (index, feature) in fc.features.iter().enumerate() {
                let Some(geometry) = &feature.geometry else {
                    skipped.push(SkippedFeature {
                        index,
                        reason: SkipReason::EmptyGeometry,
                    });
                    continue;
                };
                match process_value(&geometry.value, config) {
                    Ok(grid) => grids.push(grid),
                    Err(reason) => skipped.push(SkippedFeature { index, reason }),
                }
            }
            Ok(RunReport {
                output: GridOutput::PerFeature(grids),
                skipped,
            })
        }
        GeoJson::Feature(feature) => match &feature.geometry {
            Some(geometry) => run_single(&geometry.value, config),
            None => Err(GridError::InvalidGeometry(
                "feature without geometry".to_string(),
            )),
        },
        GeoJson::Geometry(geometry) => run_single(&geometry.value, config),
    }
}
