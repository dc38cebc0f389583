//! Geographic boundaries, projection and pan/zoom.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::point::Point;

/// `[longitude, latitude]` in degrees.
pub type LonLat = [f64; 2];

/// One country outline: a list of polygons, each a list of rings.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub polygons: Vec<Vec<Vec<LonLat>>>,
}

/// Parse a GeoJSON `FeatureCollection` of `Polygon`/`MultiPolygon` features.
///
/// Features with other geometry types are skipped, as are features whose
/// coordinates do not decode; only a document that is not a feature
/// collection is an error.
pub fn parse_boundaries(text: &str) -> Result<Vec<Country>, DomainError> {
    let value: Value = serde_json::from_str(text).map_err(|e| DomainError::InvalidBoundary {
        message: format!("invalid JSON: {e}"),
    })?;

    if value.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(DomainError::InvalidBoundary {
            message: "expected a FeatureCollection".into(),
        });
    }
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| DomainError::InvalidBoundary {
            message: "missing features".into(),
        })?;

    let mut countries = Vec::with_capacity(features.len());
    for feature in features {
        let name = feature
            .pointer("/properties/name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        let Some(geometry) = feature.get("geometry") else {
            continue;
        };
        let coordinates = geometry.get("coordinates").cloned().unwrap_or(Value::Null);
        let polygons = match geometry.get("type").and_then(Value::as_str) {
            Some("Polygon") => parse_polygon(coordinates).map(|p| vec![p]),
            Some("MultiPolygon") => parse_multi_polygon(coordinates),
            _ => continue,
        };
        match polygons {
            Ok(polygons) => countries.push(Country { name, polygons }),
            Err(e) => warn!(country = %name, error = %e, "undecodable feature skipped"),
        }
    }
    debug!(countries = countries.len(), features = features.len(), "boundaries parsed");
    Ok(countries)
}

/// Longitude and latitude of a position; further values such as altitude are dropped.
fn to_lonlat(position: &[f64]) -> Result<LonLat, String> {
    match position {
        [lon, lat, ..] => Ok([*lon, *lat]),
        _ => Err(format!("position with {} values", position.len())),
    }
}

fn to_ring(ring: &[Vec<f64>]) -> Result<Vec<LonLat>, String> {
    ring.iter().map(|p| to_lonlat(p)).collect()
}

fn parse_polygon(coordinates: Value) -> Result<Vec<Vec<LonLat>>, String> {
    let rings: Vec<Vec<Vec<f64>>> =
        serde_json::from_value(coordinates).map_err(|e| e.to_string())?;
    rings.iter().map(|ring| to_ring(ring)).collect()
}

fn parse_multi_polygon(coordinates: Value) -> Result<Vec<Vec<Vec<LonLat>>>, String> {
    let polygons: Vec<Vec<Vec<Vec<f64>>>> =
        serde_json::from_value(coordinates).map_err(|e| e.to_string())?;
    polygons
        .iter()
        .map(|rings| {
            rings
                .iter()
                .map(|ring| to_ring(ring))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

/// Natural Earth pseudo-cylindrical projection scaled and centered on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaturalEarth {
    pub scale: f64,
    pub translate: Point,
}

impl NaturalEarth {
    pub fn new(scale: f64, translate: Point) -> Self {
        Self { scale, translate }
    }

    /// Scale so the whole globe fits a `width` x `height` viewport.
    pub fn fitted(width: f64, height: f64) -> Self {
        Self::new(width.min(height) / 2.1, Point::new(width / 2.0, height / 2.0))
    }

    pub fn project(&self, lonlat: LonLat) -> Point {
        let lambda = lonlat[0].to_radians();
        let phi = lonlat[1].to_radians();
        let phi2 = phi * phi;
        let phi4 = phi2 * phi2;
        let x = lambda
            * (0.8707 - 0.131979 * phi2
                + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
        let y = phi
            * (1.007226
                + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));
        Point::new(
            self.translate.x + x * self.scale,
            self.translate.y - y * self.scale,
        )
    }

    /// SVG path data for a country outline.
    pub fn path(&self, country: &Country) -> String {
        let mut d = String::new();
        for ring in country.polygons.iter().flatten() {
            for (i, &coord) in ring.iter().enumerate() {
                let p = self.project(coord);
                d.push(if i == 0 { 'M' } else { 'L' });
                d.push_str(&format!("{:.2},{:.2}", p.x, p.y));
            }
            if !ring.is_empty() {
                d.push('Z');
            }
        }
        d
    }
}

/// Pan/zoom transform: screen = translate + k * point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.x + self.k * p.x, self.y + self.k * p.y)
    }

    pub fn to_svg(&self) -> String {
        format!("translate({:.2},{:.2}) scale({})", self.x, self.y, self.k)
    }
}

/// Zoom limits; every transform passes through [`ZoomBehavior::constrain`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBehavior {
    pub min_k: f64,
    pub max_k: f64,
}

impl ZoomBehavior {
    pub fn new(min_k: f64, max_k: f64) -> Self {
        Self { min_k, max_k }
    }

    pub fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
        ZoomTransform {
            k: t.k.clamp(self.min_k, self.max_k),
            ..t
        }
    }

    /// Zoom by `factor` keeping the screen point `center` fixed.
    pub fn zoom_by(&self, t: ZoomTransform, factor: f64, center: Point) -> ZoomTransform {
        let k = (t.k * factor).clamp(self.min_k, self.max_k);
        // the point under `center` before and after must match
        let local = Point::new((center.x - t.x) / t.k, (center.y - t.y) / t.k);
        ZoomTransform {
            k,
            x: center.x - local.x * k,
            y: center.y - local.y * k,
        }
    }

    pub fn pan(&self, t: ZoomTransform, dx: f64, dy: f64) -> ZoomTransform {
        ZoomTransform {
            x: t.x + dx,
            y: t.y + dy,
            ..t
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_maps_origin_to_center() {
        let p = NaturalEarth::new(180.0, Point::new(500.0, 300.0));
        assert_eq!(p.project([0.0, 0.0]), Point::new(500.0, 300.0));
    }

    #[test]
    fn test_projection_puts_north_above_south() {
        let p = NaturalEarth::new(180.0, Point::new(500.0, 300.0));
        let london = p.project([-0.1276, 51.5072]);
        let sydney = p.project([151.2, -33.9]);
        assert!(london.y < 300.0);
        assert!(sydney.y > 300.0);
        assert!(sydney.x > london.x);
    }

    #[test]
    fn test_zoom_by_keeps_center_fixed_and_clamps() {
        let zoom = ZoomBehavior::new(1.0, 10.0);
        let center = Point::new(200.0, 100.0);
        let t = zoom.zoom_by(ZoomTransform::IDENTITY, 4.0, center);
        assert_eq!(t.k, 4.0);
        assert_eq!(t.apply(center), center);

        let t = zoom.zoom_by(t, 10.0, center);
        assert_eq!(t.k, 10.0);
    }

    const SQUARE: &str = r#"{"type": "Feature", "properties": {"name": "Square"},
        "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}"#;

    fn collection(features: &[&str]) -> String {
        format!(
            r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
            features.join(",")
        )
    }

    #[test]
    fn test_parse_boundaries_polygon_and_multipolygon() {
        let islands = r#"{"type": "Feature", "properties": {"name": "Islands"},
            "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[0,0],[1,1],[0,1],[0,0]]],
                [[[5,5],[6,6],[5,6],[5,5]]]
            ]}}"#;
        let spot = r#"{"type": "Feature", "properties": {"name": "Spot"},
            "geometry": {"type": "Point", "coordinates": [0,0]}}"#;

        let countries = parse_boundaries(&collection(&[SQUARE, islands, spot])).unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name, "Square");
        assert_eq!(countries[1].polygons.len(), 2);
    }

    #[test]
    fn test_parse_boundaries_drops_altitude() {
        let highland = r#"{"type": "Feature", "properties": {"name": "Highland"},
            "geometry": {"type": "Polygon",
                         "coordinates": [[[10,10,850.5],[11,10,900],[11,11,0],[10,10,850.5]]]}}"#;

        let countries = parse_boundaries(&collection(&[SQUARE, highland])).unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[1].polygons[0][0][1], [11.0, 10.0]);
    }

    #[test]
    fn test_parse_boundaries_skips_undecodable_feature() {
        let short = r#"{"type": "Feature", "properties": {"name": "Short"},
            "geometry": {"type": "Polygon", "coordinates": [[[10],[11,10],[11,11],[10,10]]]}}"#;
        let garbled = r#"{"type": "Feature", "properties": {"name": "Garbled"},
            "geometry": {"type": "MultiPolygon", "coordinates": "oops"}}"#;

        let countries = parse_boundaries(&collection(&[short, SQUARE, garbled])).unwrap();

        let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Square"]);
    }

    #[test]
    fn test_parse_boundaries_rejects_other_documents() {
        assert!(parse_boundaries(r#"{"type": "Feature"}"#).is_err());
        assert!(parse_boundaries("not json").is_err());
    }
}
