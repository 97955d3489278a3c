//! Per-geometry grid processing: bounding region, tiling, clip/filter.

use geo::{BooleanOps, BoundingRect, Coord, Intersects, MultiPolygon, Rect};
use geojson::{Feature, FeatureCollection, Value};

use crate::config::Config;
use crate::geometry::{SkipReason, feature_of};
use crate::grid::{hex_grid, radius_degrees};

/// The rect the tiling has to cover. Padded outward by the cell radius so
/// edge cells reach past the input, except in bbox-only mode which tiles
/// the raw bounding rect.
fn bounding_region(
    geom: &MultiPolygon<f64>,
    config: &Config,
) -> Result<Rect<f64>, SkipReason> {
    let rect = geom.bounding_rect().ok_or(SkipReason::EmptyGeometry)?;
    if config.bbox_only {
        return Ok(rect);
    }
    let center_lat = (rect.min().y + rect.max().y) / 2.0;
    let (pad_x, pad_y) = radius_degrees(config.radius, center_lat).ok_or_else(|| {
        SkipReason::OperationFailed("no metric scale at this latitude".to_string())
    })?;
    Ok(Rect::new(
        Coord {
            x: rect.min().x - pad_x,
            y: rect.min().y - pad_y,
        },
        Coord {
            x: rect.max().x + pad_x,
            y: rect.max().y + pad_y,
        },
    ))
}

/// Tile the geometry's bounding region and reduce the tiles per the
/// configuration.
///
/// - bbox-only: the raw tiling, untouched;
/// - clip mode (default): each tile becomes `tile ∩ geom`; empty
///   intersections are dropped, single-polygon results are emitted as
///   `Polygon` and multi-part results as `MultiPolygon`;
/// - intersects mode: whole tiles, kept only when they touch the input.
///
/// Features come out in the tiling's emission order with null properties.
pub fn process_geometry(
    geom: &MultiPolygon<f64>,
    config: &Config,
) -> Result<FeatureCollection, SkipReason> {
    let bbox = bounding_region(geom, config)?;
    let tiles = hex_grid(&bbox, config.radius);

    let mut features: Vec<Feature> = Vec::new();
    for tile in tiles {
        if config.bbox_only {
            features.push(feature_of(Value::from(&tile)));
        } else if config.clip_to_input {
            let clipped = geom.intersection(&MultiPolygon(vec![tile]));
            if clipped.0.is_empty() {
                continue;
            }
            let value = if clipped.0.len() == 1 {
                Value::from(&clipped.0[0])
            } else {
                Value::from(&clipped)
            };
            features.push(feature_of(value));
        } else if geom.intersects(&tile) {
            features.push(feature_of(Value::from(&tile)));
        }
    }

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}
