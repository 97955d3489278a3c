//! Geometry normalization and merge-mode combination.
//!
//! The grid only knows how to tile polygons, so every input geometry is
//! funneled into a `MultiPolygon` here or rejected with a [`SkipReason`].
//! Rejection is a value, never an error: the driver decides whether a
//! rejected geometry skips a feature or ends the run.

use std::fmt;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, LineStringType, PointType, PolygonType, Value};

use crate::config::Config;

/// Why a geometry was not processed. Non-fatal inside a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Coordinate payload is absent or empty.
    EmptyGeometry,
    /// Coordinates are present but unusable (too few positions, malformed
    /// positions).
    Degenerate(String),
    /// Geometry kind cannot be tiled (or lines with `--only-polygon`).
    UnsupportedType(String),
    /// The geometry library gave up on this feature (degenerate rings).
    OperationFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyGeometry => write!(f, "empty geometry"),
            SkipReason::Degenerate(what) => {
                write!(f, "degenerate geometry: {what}")
            }
            SkipReason::UnsupportedType(kind) => {
                write!(f, "invalid geometry type {kind}")
            }
            SkipReason::OperationFailed(msg) => {
                write!(f, "geometry operation failed: {msg}")
            }
        }
    }
}

/// Wrap a geometry value in a bare feature with null properties.
pub(crate) fn feature_of(value: Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

fn coord_of(position: &[f64]) -> Option<Coord<f64>> {
    Some(Coord {
        x: *position.first()?,
        y: *position.get(1)?,
    })
}

/// Convert one GeoJSON ring to a `LineString`, rejecting malformed
/// positions. `Polygon::new` closes open rings itself.
fn ring_of(positions: &[Vec<f64>]) -> Result<LineString<f64>, SkipReason> {
    let coords: Option<Vec<Coord<f64>>> =
        positions.iter().map(|p| coord_of(p)).collect();
    coords.map(LineString::new).ok_or_else(|| {
        SkipReason::Degenerate("position with fewer than 2 coordinates".to_string())
    })
}

fn polygon_of(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, SkipReason> {
    let mut rings = rings.iter();
    let exterior = ring_of(rings.next().ok_or(SkipReason::EmptyGeometry)?)?;
    let interiors: Result<Vec<LineString<f64>>, SkipReason> =
        rings.map(|r| ring_of(r)).collect();
    Ok(Polygon::new(exterior, interiors?))
}

/// Axis-aligned bounding-box area of a ring, used to order the rings of a
/// combined multi-line so the largest becomes the exterior.
fn ring_bbox_area(positions: &[Vec<f64>]) -> f64 {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in positions {
        let (Some(&x), Some(&y)) = (p.first(), p.get(1)) else {
            continue;
        };
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if min_x > max_x || min_y > max_y {
        return 0.0;
    }
    (max_x - min_x) * (max_y - min_y)
}

/// Close one or more line strings into a single polygon. The first line
/// becomes the exterior and the rest interior rings; with `order_rings`
/// (merge mode) the lines are first sorted largest-first so combined
/// multigeometries keep a deterministic exterior.
fn lines_to_polygon(
    lines: &[Vec<Vec<f64>>],
    order_rings: bool,
) -> Result<MultiPolygon<f64>, SkipReason> {
    let mut usable: Vec<&Vec<Vec<f64>>> =
        lines.iter().filter(|l| l.len() >= 3).collect();
    if usable.is_empty() {
        return Err(SkipReason::Degenerate(
            "line with fewer than 3 positions".to_string(),
        ));
    }
    if order_rings {
        usable.sort_by(|a, b| {
            ring_bbox_area(b)
                .partial_cmp(&ring_bbox_area(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let (first, rest) = usable.split_first().ok_or_else(|| {
        SkipReason::Degenerate("line with fewer than 3 positions".to_string())
    })?;
    let exterior = ring_of(first.as_slice())?;
    let interiors: Result<Vec<LineString<f64>>, SkipReason> =
        rest.iter().map(|r| ring_of(r.as_slice())).collect();
    Ok(MultiPolygon(vec![Polygon::new(exterior, interiors?)]))
}

/// Normalize one GeoJSON geometry value into a tileable multipolygon.
///
/// - lines are closed into polygons unless `--only-polygon` is set;
/// - polygons pass through;
/// - points, geometry collections and empty payloads are rejected.
pub fn normalize(
    value: &Value,
    config: &Config,
) -> Result<MultiPolygon<f64>, SkipReason> {
    match value {
        Value::LineString(line) => {
            if line.is_empty() {
                return Err(SkipReason::EmptyGeometry);
            }
            if config.polygon_only {
                return Err(SkipReason::UnsupportedType("LineString".to_string()));
            }
            lines_to_polygon(std::slice::from_ref(line), config.merge)
        }
        Value::MultiLineString(lines) => {
            if lines.iter().all(|l| l.is_empty()) {
                return Err(SkipReason::EmptyGeometry);
            }
            if config.polygon_only {
                return Err(SkipReason::UnsupportedType(
                    "MultiLineString".to_string(),
                ));
            }
            lines_to_polygon(lines, config.merge)
        }
        Value::Polygon(rings) => {
            if rings.iter().all(|r| r.is_empty()) {
                return Err(SkipReason::EmptyGeometry);
            }
            Ok(MultiPolygon(vec![polygon_of(rings)?]))
        }
        Value::MultiPolygon(polygons) => {
            if polygons.iter().flatten().all(|r| r.is_empty()) {
                return Err(SkipReason::EmptyGeometry);
            }
            let polys: Result<Vec<Polygon<f64>>, SkipReason> =
                polygons.iter().map(|p| polygon_of(p)).collect();
            Ok(MultiPolygon(polys?))
        }
        Value::Point(_) => Err(SkipReason::UnsupportedType("Point".to_string())),
        Value::MultiPoint(_) => {
            Err(SkipReason::UnsupportedType("MultiPoint".to_string()))
        }
        Value::GeometryCollection(_) => Err(SkipReason::UnsupportedType(
            "GeometryCollection".to_string(),
        )),
    }
}

/// Merge-mode combination: group every feature geometry into at most three
/// combined features (MultiPoint, MultiLineString, MultiPolygon, in that
/// order). Properties do not survive combination.
pub fn combine(collection: &FeatureCollection) -> FeatureCollection {
    let mut points: Vec<PointType> = Vec::new();
    let mut lines: Vec<LineStringType> = Vec::new();
    let mut polygons: Vec<PolygonType> = Vec::new();

    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        match &geometry.value {
            Value::Point(p) => points.push(p.clone()),
            Value::MultiPoint(ps) => points.extend(ps.iter().cloned()),
            Value::LineString(l) => lines.push(l.clone()),
            Value::MultiLineString(ls) => lines.extend(ls.iter().cloned()),
            Value::Polygon(p) => polygons.push(p.clone()),
            Value::MultiPolygon(ps) => polygons.extend(ps.iter().cloned()),
            // Nested collections are not combinable; the normalizer will
            // reject them feature-by-feature instead.
            Value::GeometryCollection(_) => {}
        }
    }

    let mut features = Vec::new();
    if !points.is_empty() {
        features.push(feature_of(Value::MultiPoint(points)));
    }
    if !lines.is_empty() {
        features.push(feature_of(Value::MultiLineString(lines)));
    }
    if !polygons.is_empty() {
        features.push(feature_of(Value::MultiPolygon(polygons)));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_rings() -> PolygonType {
        vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ]]
    }

    #[test]
    fn polygon_passes_through() {
        let config = Config::default();
        let mp = normalize(&Value::Polygon(square_rings()), &config).unwrap();
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn line_string_closes_into_polygon() {
        let config = Config::default();
        let open_line = vec![
            vec![0.0, 0.0],
            vec![2.0, 0.0],
            vec![2.0, 2.0],
            vec![0.0, 2.0],
        ];
        let mp = normalize(&Value::LineString(open_line), &config).unwrap();
        assert_eq!(mp.0.len(), 1);
        let exterior = mp.0[0].exterior();
        assert!(exterior.is_closed(), "ring must be auto-completed");
        assert_eq!(exterior.0.first(), exterior.0.last());
    }

    #[test]
    fn polygon_only_rejects_lines() {
        let config = Config {
            polygon_only: true,
            ..Config::default()
        };
        let line = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let err = normalize(&Value::LineString(line), &config).unwrap_err();
        assert!(matches!(err, SkipReason::UnsupportedType(t) if t == "LineString"));
    }

    #[test]
    fn points_are_unsupported() {
        let config = Config::default();
        let err = normalize(&Value::Point(vec![1.0, 2.0]), &config).unwrap_err();
        assert!(matches!(err, SkipReason::UnsupportedType(t) if t == "Point"));
    }

    #[test]
    fn empty_payloads_are_rejected() {
        let config = Config::default();
        for value in [
            Value::LineString(vec![]),
            Value::Polygon(vec![]),
            Value::MultiLineString(vec![vec![]]),
            Value::MultiPolygon(vec![]),
        ] {
            let err = normalize(&value, &config).unwrap_err();
            assert_eq!(err, SkipReason::EmptyGeometry, "value: {value:?}");
        }
    }

    #[test]
    fn two_point_line_is_degenerate_not_empty() {
        let config = Config::default();
        let stub = vec![vec![30.0, 50.0], vec![30.05, 50.0]];
        let err = normalize(&Value::LineString(stub), &config).unwrap_err();
        assert!(
            matches!(&err, SkipReason::Degenerate(_)),
            "got {err:?}"
        );
        assert!(err.to_string().contains("degenerate"));
        assert!(!err.to_string().contains("empty"));
    }

    #[test]
    fn malformed_position_is_degenerate() {
        let config = Config::default();
        // Third position has a single coordinate.
        let bad = vec![vec![30.0, 50.0], vec![30.05, 50.0], vec![30.02]];
        let err = normalize(&Value::LineString(bad), &config).unwrap_err();
        assert!(matches!(&err, SkipReason::Degenerate(_)), "got {err:?}");
    }

    #[test]
    fn merge_orders_rings_largest_first() {
        let config = Config {
            merge: true,
            ..Config::default()
        };
        // Small ring listed before the big one; merge mode must still make
        // the big ring the exterior.
        let small = vec![
            vec![4.0, 4.0],
            vec![5.0, 4.0],
            vec![5.0, 5.0],
            vec![4.0, 5.0],
        ];
        let big = vec![
            vec![0.0, 0.0],
            vec![10.0, 0.0],
            vec![10.0, 10.0],
            vec![0.0, 10.0],
        ];
        let mp = normalize(
            &Value::MultiLineString(vec![small, big]),
            &config,
        )
        .unwrap();
        let poly = &mp.0[0];
        assert_eq!(poly.interiors().len(), 1);
        assert!(
            poly.exterior().0.iter().any(|c| c.x == 10.0),
            "largest ring should be the exterior"
        );
    }

    #[test]
    fn without_merge_first_ring_is_exterior() {
        let config = Config::default();
        let small = vec![
            vec![4.0, 4.0],
            vec![5.0, 4.0],
            vec![5.0, 5.0],
            vec![4.0, 5.0],
        ];
        let big = vec![
            vec![0.0, 0.0],
            vec![10.0, 0.0],
            vec![10.0, 10.0],
            vec![0.0, 10.0],
        ];
        let mp = normalize(
            &Value::MultiLineString(vec![small, big]),
            &config,
        )
        .unwrap();
        assert!(
            mp.0[0].exterior().0.iter().all(|c| c.x <= 5.0),
            "document order keeps the first ring as exterior"
        );
    }

    #[test]
    fn combine_groups_by_kind() {
        let fc = FeatureCollection {
            bbox: None,
            features: vec![
                feature_of(Value::Polygon(square_rings())),
                feature_of(Value::Point(vec![0.5, 0.5])),
                feature_of(Value::Polygon(square_rings())),
            ],
            foreign_members: None,
        };
        let combined = combine(&fc);
        assert_eq!(combined.features.len(), 2);

        let kinds: Vec<&str> = combined
            .features
            .iter()
            .map(|f| match &f.geometry.as_ref().unwrap().value {
                Value::MultiPoint(_) => "MultiPoint",
                Value::MultiPolygon(ps) => {
                    assert_eq!(ps.len(), 2, "both polygons combined");
                    "MultiPolygon"
                }
                other => panic!("unexpected combined kind: {other:?}"),
            })
            .collect();
        assert_eq!(kinds, vec!["MultiPoint", "MultiPolygon"]);
    }
}
