//! Flat-topped hexagonal tiling of a bounding rectangle.
//!
//! Radii arrive in kilometers and are converted to degrees per axis at the
//! rectangle's center latitude, so cells keep their metric size at the
//! input's location. The lattice math matches the classic flat-topped
//! layout: columns every 1.5 radii, rows every `sqrt(3)` radii, odd
//! columns shifted by half a row.

use std::f64::consts::PI;

use geo::{Coord, LineString, Polygon, Rect};

/// Mean earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometers to degrees of latitude.
pub(crate) fn km_to_degrees(km: f64) -> f64 {
    km / EARTH_RADIUS_KM * 180.0 / PI
}

/// Per-axis cell circumradius in degrees `(rx, ry)` for a radius in
/// kilometers at the given latitude. Longitude degrees shrink with the
/// cosine of the latitude; at the poles the scale collapses and there is
/// no usable tiling.
pub(crate) fn radius_degrees(radius_km: f64, center_lat: f64) -> Option<(f64, f64)> {
    let ry = km_to_degrees(radius_km);
    let cos_lat = center_lat.to_radians().cos();
    if cos_lat <= 1e-9 {
        return None;
    }
    Some((ry / cos_lat, ry))
}

/// One flat-topped hexagon: vertices every 60 degrees starting on the
/// positive x axis, ring explicitly closed.
fn hexagon(cx: f64, cy: f64, rx: f64, ry: f64) -> Polygon<f64> {
    let mut ring: Vec<Coord<f64>> = (0..6)
        .map(|i| {
            let angle = PI / 3.0 * i as f64;
            Coord {
                x: cx + rx * angle.cos(),
                y: cy + ry * angle.sin(),
            }
        })
        .collect();
    let first = ring[0];
    ring.push(first);
    Polygon::new(LineString::new(ring), vec![])
}

/// Generate a flat-topped hexagonal tiling covering `bbox` with cells of
/// circumradius `radius_km` kilometers.
///
/// Columns are emitted west to east and each column south to north, so the
/// order is deterministic for a given bbox and radius. The lattice starts
/// one cell outside the rect on every side; edge tiles that only overlap
/// the rect are kept, which guarantees full coverage.
pub fn hex_grid(bbox: &Rect<f64>, radius_km: f64) -> Vec<Polygon<f64>> {
    let center_lat = (bbox.min().y + bbox.max().y) / 2.0;
    let Some((rx, ry)) = radius_degrees(radius_km, center_lat) else {
        return Vec::new();
    };

    let hex_height = 3.0_f64.sqrt() * ry;
    let x_interval = 1.5 * rx;
    let y_interval = hex_height;

    let mut tiles = Vec::new();
    let mut column: u32 = 0;
    let mut cx = bbox.min().x - x_interval;
    while cx <= bbox.max().x + x_interval {
        let y_offset = if column % 2 == 1 {
            -hex_height / 2.0
        } else {
            0.0
        };
        let mut cy = bbox.min().y - y_interval + y_offset;
        while cy <= bbox.max().y + y_interval {
            tiles.push(hexagon(cx, cy, rx, ry));
            cy += y_interval;
        }
        cx += x_interval;
        column += 1;
    }
    tiles
}
