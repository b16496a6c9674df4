//! Map projections for the projection-toolbox backend
//!
//! Wide latitude ranges use Miller cylindrical, regional maps use a Lambert
//! conformal conic with standard parallels at the map's latitude limits.
//! Projected coordinates are in radians on the unit sphere.

use crate::argo::GeoBounds;
use std::f64::consts::FRAC_PI_4;

/// Latitude span above which the wide-area projection is used
pub const WIDE_AREA_LAT_SPAN: f64 = 60.0;

/// Latitude limit for conic and Mercator projections
const MAX_CONIC_LAT: f64 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Miller cylindrical, centered on `lon0`
    Miller { lon0: f64 },
    /// Lambert conformal conic
    Lambert {
        lon0: f64,
        /// Cone constant
        n: f64,
        /// Scaled F constant (F / n in Snyder's notation, already divided)
        f: f64,
        /// Radius at the reference latitude
        rho0: f64,
    },
    /// Mercator; the limit of the conic when the standard parallels are symmetric about the equator
    Mercator { lon0: f64 },
}

impl Projection {
    /// Choose the projection for the map limits
    pub fn for_bounds(bounds: &GeoBounds) -> Self {
        let lon0 = bounds.lon_center();
        if bounds.lat_span() > WIDE_AREA_LAT_SPAN {
            Projection::Miller { lon0 }
        } else {
            Projection::lambert(lon0, bounds.lat_min, bounds.lat_max)
        }
    }

    /// Lambert conformal conic with standard parallels `lat1` and `lat2`
    ///
    /// The reference latitude is the middle of the two parallels.
    pub fn lambert(lon0: f64, lat1: f64, lat2: f64) -> Self {
        let phi1 = clamp_lat(lat1).to_radians();
        let phi2 = clamp_lat(lat2).to_radians();
        let phi0 = (phi1 + phi2) / 2.0;

        let n = if (phi1 - phi2).abs() < 1e-10 {
            phi1.sin()
        } else {
            (phi1.cos() / phi2.cos()).ln() / (half_tan(phi2) / half_tan(phi1)).ln()
        };

        if n.abs() < 1e-9 || !n.is_finite() {
            return Projection::Mercator { lon0 };
        }

        let f = phi1.cos() * half_tan(phi1).powf(n) / n;
        let rho0 = f / half_tan(phi0).powf(n);

        Projection::Lambert { lon0, n, f, rho0 }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Projection::Miller { .. } => "Miller cylindrical",
            Projection::Lambert { .. } => "Lambert conformal conic",
            Projection::Mercator { .. } => "Mercator",
        }
    }

    /// Project a (lon, lat) pair in degrees
    pub fn project(&self, (lon, lat): (f64, f64)) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }

        let (x, y) = match *self {
            Projection::Miller { lon0 } => {
                let lambda = wrap_degrees(lon - lon0).to_radians();
                let phi = lat.clamp(-90.0, 90.0).to_radians();
                (lambda, 1.25 * (FRAC_PI_4 + 0.4 * phi).tan().ln())
            }
            Projection::Mercator { lon0 } => {
                let lambda = wrap_degrees(lon - lon0).to_radians();
                let phi = clamp_lat(lat).to_radians();
                (lambda, half_tan(phi).ln())
            }
            Projection::Lambert { lon0, n, f, rho0 } => {
                let lambda = wrap_degrees(lon - lon0).to_radians();
                let phi = clamp_lat(lat).to_radians();
                let rho = f / half_tan(phi).powf(n);
                let theta = n * lambda;
                (rho * theta.sin(), rho0 - rho * theta.cos())
            }
        };

        if x.is_finite() && y.is_finite() {
            Some((x, y))
        } else {
            None
        }
    }

    /// Projected extent of the map limits
    ///
    /// Samples the boundary of the lat/lon box, since conic projections map
    /// it to a curved outline. Returns ((x_min, x_max), (y_min, y_max)).
    pub fn extent(&self, bounds: &GeoBounds) -> ((f64, f64), (f64, f64)) {
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);

        for (px, py) in boundary(bounds, 64)
            .into_iter()
            .filter_map(|p| self.project(p))
        {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }

        (x, y)
    }
}

/// Closed outline of the lat/lon box with `per_edge` samples per edge
pub fn boundary(bounds: &GeoBounds, per_edge: usize) -> Vec<(f64, f64)> {
    let per_edge = per_edge.max(1);
    let lerp = |a: f64, b: f64, i: usize| a + (b - a) * i as f64 / per_edge as f64;
    let mut points = Vec::with_capacity(4 * per_edge + 1);

    for i in 0..per_edge {
        points.push((lerp(bounds.lon_min, bounds.lon_max, i), bounds.lat_min));
    }
    for i in 0..per_edge {
        points.push((bounds.lon_max, lerp(bounds.lat_min, bounds.lat_max, i)));
    }
    for i in 0..per_edge {
        points.push((lerp(bounds.lon_max, bounds.lon_min, i), bounds.lat_max));
    }
    for i in 0..per_edge {
        points.push((bounds.lon_min, lerp(bounds.lat_max, bounds.lat_min, i)));
    }
    points.push((bounds.lon_min, bounds.lat_min));
    points
}

fn half_tan(phi: f64) -> f64 {
    (FRAC_PI_4 + phi / 2.0).tan()
}

fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(-MAX_CONIC_LAT, MAX_CONIC_LAT)
}

/// Wrap a longitude difference into [-180, 180]
fn wrap_degrees(d: f64) -> f64 {
    let wrapped = (d + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && d > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argo::LonConvention;

    fn bounds(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> GeoBounds {
        GeoBounds {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            convention: LonConvention::Signed,
        }
    }

    #[test]
    fn test_projection_choice_by_lat_span() {
        let wide = bounds(-70.0, 10.0, -60.0, 20.0);
        assert!(matches!(Projection::for_bounds(&wide), Projection::Miller { .. }));

        let regional = bounds(20.0, 50.0, -60.0, -20.0);
        assert!(matches!(
            Projection::for_bounds(&regional),
            Projection::Lambert { .. }
        ));

        // Exactly at the threshold stays regional
        let edge = bounds(0.0, 60.0, 0.0, 10.0);
        assert!(matches!(Projection::for_bounds(&edge), Projection::Lambert { .. }));
    }

    #[test]
    fn test_symmetric_parallels_degenerate_to_mercator() {
        let p = Projection::lambert(0.0, -20.0, 20.0);
        assert!(matches!(p, Projection::Mercator { .. }));
        assert_eq!(p.name(), "Mercator");
    }

    #[test]
    fn test_miller_known_values() {
        let p = Projection::Miller { lon0: 0.0 };
        let (x, y) = p.project((0.0, 0.0)).unwrap();
        assert!(x.abs() < 1e-12 && y.abs() < 1e-12);

        // 1.25 * ln(tan(63 deg))
        let (_, y) = p.project((0.0, 45.0)).unwrap();
        assert!((y - 0.842841).abs() < 1e-5);

        // Poles are finite
        assert!(p.project((0.0, 90.0)).is_some());
    }

    #[test]
    fn test_lambert_center_meridian_is_vertical() {
        let p = Projection::lambert(-40.0, 20.0, 50.0);
        let (x_low, y_low) = p.project((-40.0, 25.0)).unwrap();
        let (x_high, y_high) = p.project((-40.0, 45.0)).unwrap();
        assert!(x_low.abs() < 1e-12 && x_high.abs() < 1e-12);
        assert!(y_high > y_low);

        // Reference latitude maps to y = 0
        let (_, y_ref) = p.project((-40.0, 35.0)).unwrap();
        assert!(y_ref.abs() < 1e-9);
    }

    #[test]
    fn test_lambert_southern_hemisphere_orientation() {
        let p = Projection::lambert(150.0, -50.0, -20.0);
        let (_, y_south) = p.project((150.0, -45.0)).unwrap();
        let (_, y_north) = p.project((150.0, -25.0)).unwrap();
        assert!(y_north > y_south);

        let (x_east, _) = p.project((160.0, -35.0)).unwrap();
        assert!(x_east > 0.0);
    }

    #[test]
    fn test_dateline_longitudes_are_continuous() {
        let p = Projection::Miller { lon0: 180.0 };
        let (x1, _) = p.project((179.0, 0.0)).unwrap();
        let (x2, _) = p.project((181.0, 0.0)).unwrap();
        assert!((x2 - x1 - 2f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), -180.0);
    }

    #[test]
    fn test_extent_covers_box() {
        let b = bounds(10.0, 40.0, -30.0, 0.0);
        let p = Projection::for_bounds(&b);
        let ((x_min, x_max), (y_min, y_max)) = p.extent(&b);
        assert!(x_min < 0.0 && x_max > 0.0);
        assert!(y_min < y_max);

        let (cx, cy) = p.project((-15.0, 25.0)).unwrap();
        assert!(cx > x_min && cx < x_max && cy > y_min && cy < y_max);
    }

    #[test]
    fn test_boundary_is_closed() {
        let b = bounds(0.0, 10.0, 0.0, 10.0);
        let outline = boundary(&b, 4);
        assert_eq!(outline.len(), 17);
        assert_eq!(outline.first(), outline.last());
    }
}
