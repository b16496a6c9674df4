//! Land and coastline geometry for the basemap
//!
//! Coastlines are read from GeoJSON (Natural Earth style land polygons or
//! coastline line strings) and clipped to the map limits before drawing.

use crate::argo::error::Result;
use crate::argo::GeoBounds;
use geojson::{GeoJson, Geometry, Value};
use std::path::Path;

/// Longitude offsets tried when clipping, so [-180, 180] data also covers
/// maps drawn in the [0, 360] convention
const WRAP_OFFSETS: [f64; 3] = [-360.0, 0.0, 360.0];

/// Land polygons (exterior rings) and coastline line strings in (lon, lat)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coastline {
    pub polygons: Vec<Vec<(f64, f64)>>,
    pub lines: Vec<Vec<(f64, f64)>>,
}

impl Coastline {
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let geojson = text.parse::<GeoJson>()?;
        let mut coastline = Coastline::default();

        match geojson {
            GeoJson::FeatureCollection(collection) => {
                for feature in collection.features {
                    if let Some(geometry) = feature.geometry {
                        coastline.add_geometry(&geometry);
                    }
                }
            }
            GeoJson::Feature(feature) => {
                if let Some(geometry) = feature.geometry {
                    coastline.add_geometry(&geometry);
                }
            }
            GeoJson::Geometry(geometry) => coastline.add_geometry(&geometry),
        }

        tracing::debug!(
            "Coastline: {} polygons, {} lines",
            coastline.polygons.len(),
            coastline.lines.len()
        );
        Ok(coastline)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&text)
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty()
    }

    fn add_geometry(&mut self, geometry: &Geometry) {
        match &geometry.value {
            Value::Polygon(rings) => self.add_polygon(rings),
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    self.add_polygon(rings);
                }
            }
            Value::LineString(positions) => self.lines.push(to_points(positions)),
            Value::MultiLineString(lines) => {
                self.lines.extend(lines.iter().map(|l| to_points(l)));
            }
            Value::GeometryCollection(geometries) => {
                for g in geometries {
                    self.add_geometry(g);
                }
            }
            // Points carry no land outline
            _ => {}
        }
    }

    /// Keep the exterior ring; holes (lakes) are not filled
    fn add_polygon(&mut self, rings: &[Vec<Vec<f64>>]) {
        if let Some(exterior) = rings.first() {
            let ring = to_points(exterior);
            if ring.len() >= 3 {
                self.polygons.push(ring);
            }
        }
    }

    /// Land polygons clipped to the map limits
    pub fn clipped_polygons(&self, bounds: &GeoBounds) -> Vec<Vec<(f64, f64)>> {
        let mut clipped = Vec::new();
        for ring in &self.polygons {
            for offset in WRAP_OFFSETS {
                let shifted: Vec<(f64, f64)> =
                    ring.iter().map(|(lon, lat)| (lon + offset, *lat)).collect();
                if !overlaps(&shifted, bounds) {
                    continue;
                }
                let polygon = clip_polygon(&shifted, bounds);
                if polygon.len() >= 3 {
                    clipped.push(polygon);
                }
            }
        }
        clipped
    }

    /// Outlines (polygon rings and line strings) clipped to the map limits
    pub fn clipped_lines(&self, bounds: &GeoBounds) -> Vec<Vec<(f64, f64)>> {
        let mut clipped = Vec::new();
        let closed_rings = self.polygons.iter().map(|ring| {
            let mut closed = ring.clone();
            if closed.first() != closed.last() {
                closed.push(ring[0]);
            }
            closed
        });

        for line in self.lines.iter().cloned().chain(closed_rings) {
            for offset in WRAP_OFFSETS {
                let shifted: Vec<(f64, f64)> =
                    line.iter().map(|(lon, lat)| (lon + offset, *lat)).collect();
                if overlaps(&shifted, bounds) {
                    clipped.extend(clip_polyline(&shifted, bounds));
                }
            }
        }
        clipped
    }
}

fn to_points(positions: &[Vec<f64>]) -> Vec<(f64, f64)> {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}

/// Bounding-box overlap test
fn overlaps(points: &[(f64, f64)], bounds: &GeoBounds) -> bool {
    let (mut lon_min, mut lon_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut lat_min, mut lat_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (lon, lat) in points {
        lon_min = lon_min.min(*lon);
        lon_max = lon_max.max(*lon);
        lat_min = lat_min.min(*lat);
        lat_max = lat_max.max(*lat);
    }
    lon_max >= bounds.lon_min
        && lon_min <= bounds.lon_max
        && lat_max >= bounds.lat_min
        && lat_min <= bounds.lat_max
}

#[derive(Clone, Copy)]
enum Edge {
    West(f64),
    East(f64),
    South(f64),
    North(f64),
}

impl Edge {
    fn inside(self, (lon, lat): (f64, f64)) -> bool {
        match self {
            Edge::West(v) => lon >= v,
            Edge::East(v) => lon <= v,
            Edge::South(v) => lat >= v,
            Edge::North(v) => lat <= v,
        }
    }

    fn intersect(self, (x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> (f64, f64) {
        match self {
            Edge::West(v) | Edge::East(v) => {
                let t = (v - x1) / (x2 - x1);
                (v, y1 + t * (y2 - y1))
            }
            Edge::South(v) | Edge::North(v) => {
                let t = (v - y1) / (y2 - y1);
                (x1 + t * (x2 - x1), v)
            }
        }
    }
}

/// Sutherland-Hodgman clipping against the map rectangle
fn clip_polygon(ring: &[(f64, f64)], bounds: &GeoBounds) -> Vec<(f64, f64)> {
    let edges = [
        Edge::West(bounds.lon_min),
        Edge::East(bounds.lon_max),
        Edge::South(bounds.lat_min),
        Edge::North(bounds.lat_max),
    ];

    let mut output = ring.to_vec();
    for edge in edges {
        let input = std::mem::take(&mut output);
        let Some(&last) = input.last() else { break };
        let mut prev = last;
        for &current in &input {
            match (edge.inside(current), edge.inside(prev)) {
                (true, true) => output.push(current),
                (true, false) => {
                    output.push(edge.intersect(prev, current));
                    output.push(current);
                }
                (false, true) => output.push(edge.intersect(prev, current)),
                (false, false) => {}
            }
            prev = current;
        }
    }
    output
}

/// Liang-Barsky clipping of each segment, joined into runs
fn clip_polyline(line: &[(f64, f64)], bounds: &GeoBounds) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for pair in line.windows(2) {
        match clip_segment(pair[0], pair[1], bounds) {
            Some((a, b)) => {
                if current.last() != Some(&a) {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(a);
                }
                current.push(b);
            }
            None => {
                if current.len() > 1 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        runs.push(current);
    }
    runs
}

fn clip_segment(
    (x1, y1): (f64, f64),
    (x2, y2): (f64, f64),
    bounds: &GeoBounds,
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (x2 - x1, y2 - y1);
    let checks = [
        (-dx, x1 - bounds.lon_min),
        (dx, bounds.lon_max - x1),
        (-dy, y1 - bounds.lat_min),
        (dy, bounds.lat_max - y1),
    ];

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    if t0 > t1 {
        return None;
    }

    let at = |t: f64| {
        if t == 0.0 {
            (x1, y1)
        } else if t == 1.0 {
            (x2, y2)
        } else {
            (x1 + t * dx, y1 + t * dy)
        }
    };
    Some((at(t0), at(t1)))
}
