//! Map limits derived from trajectory extrema

use super::data::{FloatId, TrajectoryTable};
use super::error::{PlotError, Result};

/// Padding added around the trajectory extent, in degrees
pub const BOUNDS_PADDING_DEG: f64 = 5.0;

/// Longitude convention used for a plot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LonConvention {
    /// Longitudes in [-180, 180]
    Signed,
    /// Longitudes in [0, 360], avoids a split at the dateline
    Positive,
}

impl LonConvention {
    /// Valid longitude range for the convention
    pub fn range(self) -> (f64, f64) {
        match self {
            LonConvention::Signed => (-180.0, 180.0),
            LonConvention::Positive => (0.0, 360.0),
        }
    }

    pub fn uses_alt_lon(self) -> bool {
        self == LonConvention::Positive
    }
}

/// Padded and clamped latitude/longitude limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub convention: LonConvention,
}

impl GeoBounds {
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn lon_center(&self) -> f64 {
        (self.lon_min + self.lon_max) / 2.0
    }
}

/// Derive map limits for the given floats
///
/// The convention is 0-360 when the first float carries an alternate
/// longitude series, otherwise -180-180. Floats without the alternate series
/// are converted to the chosen convention. Extrema ignore missing fixes.
pub fn derive_bounds(table: &TrajectoryTable, float_ids: &[FloatId]) -> Result<GeoBounds> {
    let first = float_ids.first().ok_or(PlotError::NoPositions)?;
    let convention = match table.get(*first) {
        Some(track) if track.alt_longitude.is_some() => LonConvention::Positive,
        Some(_) => LonConvention::Signed,
        None => return Err(PlotError::UnknownFloat(*first)),
    };

    let mut lat_min = f64::INFINITY;
    let mut lat_max = f64::NEG_INFINITY;
    let mut lon_min = f64::INFINITY;
    let mut lon_max = f64::NEG_INFINITY;

    for id in float_ids {
        let track = table.get(*id).ok_or(PlotError::UnknownFloat(*id))?;
        for (lon, lat) in track.points(convention.uses_alt_lon()) {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            lat_min = lat_min.min(lat);
            lat_max = lat_max.max(lat);
            lon_min = lon_min.min(lon);
            lon_max = lon_max.max(lon);
        }
    }

    if !lat_min.is_finite() {
        return Err(PlotError::NoPositions);
    }

    let (lon_floor, lon_ceil) = convention.range();

    Ok(GeoBounds {
        lat_min: (lat_min - BOUNDS_PADDING_DEG).max(-90.0),
        lat_max: (lat_max + BOUNDS_PADDING_DEG).min(90.0),
        lon_min: (lon_min - BOUNDS_PADDING_DEG).max(lon_floor),
        lon_max: (lon_max + BOUNDS_PADDING_DEG).min(lon_ceil),
        convention,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argo::data::FloatTrack;

    fn table_with(tracks: Vec<(u32, FloatTrack)>) -> TrajectoryTable {
        let mut table = TrajectoryTable::new();
        for (id, track) in tracks {
            table.insert(FloatId(id), track);
        }
        table
    }

    #[test]
    fn test_single_float_padding() {
        let table = table_with(vec![(1, FloatTrack::from_fixes(&[(10.0, -30.0)]))]);
        let bounds = derive_bounds(&table, &[FloatId(1)]).unwrap();
        assert_eq!(bounds.lat_min, 5.0);
        assert_eq!(bounds.lat_max, 15.0);
        assert_eq!(bounds.lon_min, -35.0);
        assert_eq!(bounds.lon_max, -25.0);
        assert_eq!(bounds.convention, LonConvention::Signed);
    }

    #[test]
    fn test_latitude_clamped_near_poles() {
        let table = table_with(vec![(1, FloatTrack::from_fixes(&[(-88.0, 0.0), (87.0, 1.0)]))]);
        let bounds = derive_bounds(&table, &[FloatId(1)]).unwrap();
        assert_eq!(bounds.lat_min, -90.0);
        assert_eq!(bounds.lat_max, 90.0);
    }

    #[test]
    fn test_signed_longitude_clamped() {
        let table = table_with(vec![(1, FloatTrack::from_fixes(&[(0.0, -178.0), (0.0, 177.0)]))]);
        let bounds = derive_bounds(&table, &[FloatId(1)]).unwrap();
        assert_eq!(bounds.lon_min, -180.0);
        assert_eq!(bounds.lon_max, 180.0);
    }

    #[test]
    fn test_dateline_uses_positive_convention() {
        let table = table_with(vec![
            (1, FloatTrack::from_fixes(&[(0.0, 175.0), (1.0, -178.0)]).with_alt_longitude()),
            (2, FloatTrack::from_fixes(&[(2.0, -170.0)]).with_alt_longitude()),
        ]);
        let bounds = derive_bounds(&table, &[FloatId(1), FloatId(2)]).unwrap();
        assert_eq!(bounds.convention, LonConvention::Positive);
        assert_eq!(bounds.lon_min, 170.0);
        assert_eq!(bounds.lon_max, 195.0);
    }

    #[test]
    fn test_later_float_without_alt_series_follows_convention() {
        let table = table_with(vec![
            (1, FloatTrack::from_fixes(&[(0.0, 175.0)]).with_alt_longitude()),
            (2, FloatTrack::from_fixes(&[(1.0, -175.0)])),
        ]);
        let bounds = derive_bounds(&table, &[FloatId(1), FloatId(2)]).unwrap();
        assert_eq!(bounds.convention, LonConvention::Positive);
        assert_eq!(bounds.lon_min, 170.0);
        assert_eq!(bounds.lon_max, 190.0);
    }

    #[test]
    fn test_missing_fixes_ignored() {
        let table = table_with(vec![(
            1,
            FloatTrack::from_fixes(&[(f64::NAN, f64::NAN), (20.0, 40.0)]),
        )]);
        let bounds = derive_bounds(&table, &[FloatId(1)]).unwrap();
        assert_eq!(bounds.lat_min, 15.0);
        assert_eq!(bounds.lon_max, 45.0);
    }

    #[test]
    fn test_only_selected_floats_count() {
        let table = table_with(vec![
            (1, FloatTrack::from_fixes(&[(0.0, 0.0)])),
            (2, FloatTrack::from_fixes(&[(60.0, 100.0)])),
        ]);
        let bounds = derive_bounds(&table, &[FloatId(1)]).unwrap();
        assert_eq!(bounds.lat_max, 5.0);
    }

    #[test]
    fn test_errors() {
        let table = table_with(vec![(1, FloatTrack::from_fixes(&[(f64::NAN, 0.0)]))]);
        assert!(matches!(
            derive_bounds(&table, &[FloatId(1)]),
            Err(PlotError::NoPositions)
        ));
        assert!(matches!(
            derive_bounds(&table, &[FloatId(9)]),
            Err(PlotError::UnknownFloat(FloatId(9)))
        ));
        assert!(matches!(derive_bounds(&table, &[]), Err(PlotError::NoPositions)));
    }
}
