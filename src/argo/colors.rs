//! Color modes and per-float color assignment
//!
//! Three modes are supported:
//! - a fixed color for every float
//! - `multiple`: one color per float, sampled evenly across the palette
//! - `dac`: one color per agency, sampled evenly across the palette

use super::agency::AgencyLookup;
use super::data::FloatId;
use super::error::{PlotError, Result};
use super::palettes::{parse_hex_color, PaletteDefinition};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Color used in `multiple` mode when a single float is plotted
pub const SINGLE_FLOAT_FALLBACK_COLOR: [u8; 3] = [0, 0, 255];

/// How floats are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Every float in the same color
    Fixed([u8; 3]),
    /// One distinct color per float
    Multiple,
    /// One color per owning agency
    ByAgency,
}

impl FromStr for ColorMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "multiple" => Ok(ColorMode::Multiple),
            "dac" | "agency" | "by-agency" => Ok(ColorMode::ByAgency),
            other => parse_color_spec(other)
                .map(ColorMode::Fixed)
                .ok_or_else(|| PlotError::UnknownColor(s.to_string())),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Fixed([r, g, b]) => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            ColorMode::Multiple => write!(f, "multiple"),
            ColorMode::ByAgency => write!(f, "dac"),
        }
    }
}

/// Parse a color name, short color code or hex string
///
/// Short codes follow the usual plotting conventions: r g b c m y k w.
pub fn parse_color_spec(spec: &str) -> Option<[u8; 3]> {
    let spec = spec.trim();
    let named = match spec.to_lowercase().as_str() {
        "r" | "red" => Some([255, 0, 0]),
        "g" | "green" => Some([0, 255, 0]),
        "b" | "blue" => Some([0, 0, 255]),
        "c" | "cyan" => Some([0, 255, 255]),
        "m" | "magenta" => Some([255, 0, 255]),
        "y" | "yellow" => Some([255, 255, 0]),
        "k" | "black" => Some([0, 0, 0]),
        "w" | "white" => Some([255, 255, 255]),
        _ => None,
    };
    named.or_else(|| {
        if spec.starts_with('#') {
            parse_hex_color(spec)
        } else {
            None
        }
    })
}

/// Color of one float
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStyle {
    pub float: FloatId,
    pub color: [u8; 3],
    /// Owning agency (agency mode only)
    pub agency: Option<String>,
}

/// One legend line
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: [u8; 3],
}

/// Colors for every plotted float plus how the legend is grouped
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAssignment {
    pub mode: ColorMode,
    pub styles: Vec<TrackStyle>,
    /// Agencies in legend order with their colors (agency mode only)
    pub agencies: Vec<LegendEntry>,
}

impl ColorAssignment {
    /// Legend entries: one per agency in agency mode, one per float otherwise
    pub fn legend_entries(&self) -> Vec<LegendEntry> {
        match self.mode {
            ColorMode::ByAgency => self.agencies.clone(),
            _ => self
                .styles
                .iter()
                .map(|s| LegendEntry {
                    label: s.float.to_string(),
                    color: s.color,
                })
                .collect(),
        }
    }
}

/// Assign a color to each float
///
/// `agencies` is only consulted in agency mode.
pub fn assign_colors(
    mode: ColorMode,
    float_ids: &[FloatId],
    palette: &PaletteDefinition,
    single_float_color: [u8; 3],
    agencies: Option<&dyn AgencyLookup>,
) -> Result<ColorAssignment> {
    let plain = |colors: Vec<[u8; 3]>| ColorAssignment {
        mode,
        styles: float_ids
            .iter()
            .zip(colors)
            .map(|(id, color)| TrackStyle {
                float: *id,
                color,
                agency: None,
            })
            .collect(),
        agencies: Vec::new(),
    };

    match mode {
        ColorMode::Fixed(color) => Ok(plain(vec![color; float_ids.len()])),
        ColorMode::Multiple if float_ids.len() == 1 => Ok(plain(vec![single_float_color])),
        ColorMode::Multiple => Ok(plain(palette.sample_evenly(float_ids.len()))),
        ColorMode::ByAgency => {
            let lookup = agencies.ok_or_else(|| {
                float_ids
                    .first()
                    .map(|id| PlotError::UnknownAgency(*id))
                    .unwrap_or(PlotError::NoPositions)
            })?;

            let float_agencies = float_ids
                .iter()
                .map(|id| {
                    lookup
                        .agency_of(*id)
                        .map(|a| (*id, a.to_string()))
                        .ok_or(PlotError::UnknownAgency(*id))
                })
                .collect::<Result<Vec<_>>>()?;

            let names: Vec<String> = float_agencies
                .iter()
                .map(|(_, a)| a.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let colors = palette.sample_evenly(names.len());
            let agency_entries: Vec<LegendEntry> = names
                .into_iter()
                .zip(colors)
                .map(|(label, color)| LegendEntry { label, color })
                .collect();

            let styles = float_agencies
                .into_iter()
                .map(|(float, agency)| {
                    let color = agency_entries
                        .iter()
                        .find(|e| e.label == agency)
                        .map(|e| e.color)
                        .unwrap_or(single_float_color);
                    TrackStyle {
                        float,
                        color,
                        agency: Some(agency),
                    }
                })
                .collect();

            Ok(ColorAssignment {
                mode,
                styles,
                agencies: agency_entries,
            })
        }
    }
}
