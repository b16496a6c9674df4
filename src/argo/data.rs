//! Per-float coordinate records and trajectory table loading
//!
//! A trajectory table maps float identifiers (WMO numbers) to ordered position
//! fixes. Missing fixes are stored as NaN and skipped downstream.
//!
//! CSV layout (one row per fix, rows of a float in time order):
//! - `FLOAT_ID` (or `WMO`): float identifier
//! - `LATITUDE`, `LONGITUDE`: position in degrees, longitude in [-180, 180]
//! - `ALT_LON` (optional): longitude in [0, 360]
//! - `DAC` (optional): data assembly center, used for agency coloring

use super::agency::AgencyIndex;
use super::error::{PlotError, Result};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Float identifier (WMO number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FloatId(pub u32);

impl fmt::Display for FloatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FloatId {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u32>()
            .map(FloatId)
            .map_err(|_| PlotError::Settings(format!("Invalid float id '{}'", s)))
    }
}

/// Position fixes of a single float
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatTrack {
    pub latitude: Vec<f64>,
    /// Longitude in [-180, 180]
    pub longitude: Vec<f64>,
    /// Longitude in [0, 360], present when the data uses the alternate convention
    pub alt_longitude: Option<Vec<f64>>,
}

impl FloatTrack {
    /// Build a track from (latitude, longitude) pairs
    pub fn from_fixes(fixes: &[(f64, f64)]) -> Self {
        Self {
            latitude: fixes.iter().map(|(lat, _)| *lat).collect(),
            longitude: fixes.iter().map(|(_, lon)| *lon).collect(),
            alt_longitude: None,
        }
    }

    /// Attach the 0-360 longitude series derived from the signed longitudes
    pub fn with_alt_longitude(mut self) -> Self {
        self.alt_longitude = Some(self.longitude.iter().map(|lon| to_positive_lon(*lon)).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.latitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_empty()
    }

    /// (lon, lat) pairs in the requested convention, NaN fixes included
    ///
    /// When 0-360 longitudes are requested and the track has no alternate
    /// series, they are derived from the signed longitudes.
    pub fn points(&self, use_alt: bool) -> Vec<(f64, f64)> {
        let signed = |i: usize| self.longitude.get(i).copied().unwrap_or(f64::NAN);
        let lon_at = |i: usize| match (&self.alt_longitude, use_alt) {
            (Some(alt), true) => alt.get(i).copied().unwrap_or(f64::NAN),
            (None, true) => to_positive_lon(signed(i)),
            _ => signed(i),
        };
        self.latitude
            .iter()
            .enumerate()
            .map(|(i, lat)| (lon_at(i), *lat))
            .collect()
    }
}

/// Map a signed longitude to [0, 360)
pub fn to_positive_lon(lon: f64) -> f64 {
    lon.rem_euclid(360.0)
}

/// Coordinate table keyed by float identifier
#[derive(Debug, Clone, Default)]
pub struct TrajectoryTable {
    tracks: BTreeMap<FloatId, FloatTrack>,
}

impl TrajectoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: FloatId, track: FloatTrack) {
        self.tracks.insert(id, track);
    }

    pub fn get(&self, id: FloatId) -> Option<&FloatTrack> {
        self.tracks.get(&id)
    }

    /// Float identifiers in ascending order
    pub fn float_ids(&self) -> Vec<FloatId> {
        self.tracks.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Add an ALT_LON series to every float if the data straddles the dateline
    ///
    /// The data straddles the dateline when some longitude is west of -90 and
    /// another is east of 90. Returns true if the alternate series was added.
    pub fn derive_alt_lon_if_crossing(&mut self) -> bool {
        let all_lons = || {
            self.tracks
                .values()
                .flat_map(|t| t.longitude.iter().copied())
                .filter(|lon| lon.is_finite())
        };
        let crosses = all_lons().any(|lon| lon < -90.0) && all_lons().any(|lon| lon > 90.0);
        if !crosses {
            return false;
        }

        for track in self.tracks.values_mut() {
            if track.alt_longitude.is_none() {
                track.alt_longitude = Some(track.longitude.iter().map(|l| to_positive_lon(*l)).collect());
            }
        }
        true
    }
}

/// Load a trajectory CSV file
///
/// Returns the table and, if the file has a `DAC` column, the agency index
/// built from it.
pub fn load_trajectories(path: &Path) -> Result<(TrajectoryTable, Option<AgencyIndex>)> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    tracing::debug!(
        "Loaded trajectory file {}: {} rows, {} columns",
        path.display(),
        df.height(),
        df.width()
    );

    trajectories_from_dataframe(&df)
}

/// Convert a trajectory DataFrame into a table
pub fn trajectories_from_dataframe(
    df: &DataFrame,
) -> Result<(TrajectoryTable, Option<AgencyIndex>)> {
    let names = df.get_column_names_str();
    let id_col = if names.contains(&"FLOAT_ID") {
        "FLOAT_ID"
    } else {
        "WMO"
    };

    let ids = float_id_column(df, id_col)?;
    let lat = f64_column(df, "LATITUDE")?;
    let lon = f64_column(df, "LONGITUDE")?;
    let alt_lon = if names.contains(&"ALT_LON") {
        Some(f64_column(df, "ALT_LON")?)
    } else {
        None
    };

    let mut table = TrajectoryTable::new();
    for (row, id) in ids.iter().enumerate() {
        let track = table.tracks.entry(*id).or_insert_with(|| FloatTrack {
            alt_longitude: alt_lon.as_ref().map(|_| Vec::new()),
            ..Default::default()
        });
        track.latitude.push(lat[row]);
        track.longitude.push(lon[row]);
        if let (Some(alt), Some(values)) = (track.alt_longitude.as_mut(), alt_lon.as_ref()) {
            alt.push(values[row]);
        }
    }

    if alt_lon.is_none() && table.derive_alt_lon_if_crossing() {
        tracing::info!("Trajectories cross the dateline, using 0-360 longitudes");
    }

    let agencies = if names.contains(&"DAC") {
        let dac = df.column("DAC")?.cast(&DataType::String)?;
        let dac = dac.as_materialized_series().str()?;
        let pairs = ids
            .iter()
            .zip(dac.into_iter())
            .filter_map(|(id, name)| name.map(|n| (*id, n.trim().to_string())));
        Some(AgencyIndex::from_pairs(pairs))
    } else {
        None
    };

    Ok((table, agencies))
}

fn float_id_column(df: &DataFrame, name: &str) -> Result<Vec<FloatId>> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    let values = column.as_materialized_series().i64()?;

    values
        .into_iter()
        .map(|v| {
            v.and_then(|id| u32::try_from(id).ok())
                .map(FloatId)
                .ok_or_else(|| PlotError::Settings(format!("Invalid value in column '{}'", name)))
        })
        .collect()
}

/// Read a numeric column as f64, nulls become NaN
fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let values = column.as_materialized_series().f64()?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}
