//! Map rendering
//!
//! Three mutually exclusive backends draw the same `Scene`:
//! - `geo_axes`: native geographic axes with a basemap and legend
//! - `projected`: projection-toolbox style map (Miller or Lambert) with
//!   coastlines and a graticule, no legend
//! - `plain`: ordinary longitude/latitude scatter plot with a per-float legend
//!
//! The backend is chosen once per call through `MapBackend::renderer()`.

pub mod basemap;
pub mod figure;
pub mod geo_axes;
pub mod plain;
pub mod projected;
pub mod projection;

use crate::argo::colors::{ColorAssignment, ColorMode, LegendEntry};
use crate::argo::error::Result;
use crate::argo::{FloatId, GeoBounds};
use crate::config::{LegendPosition, PlotConfig};
use basemap::Coastline;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt;
use std::sync::OnceLock;

pub use figure::{render_figure, Figure};

/// Drawing area every renderer draws into
pub type MapArea<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Chart with f64 x/y axes (lon/lat or projected coordinates)
pub type MapChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapBackend {
    /// Geographic axes with basemap
    #[default]
    Native,
    /// Projection toolbox map
    Toolbox,
    /// Plain 2-D axes
    Plain,
}

impl MapBackend {
    /// Parse from string value
    ///
    /// Validation happens in SettingsReader.get_enum()
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "toolbox" => Self::Toolbox,
            "plain" => Self::Plain,
            _ => Self::Native,
        }
    }

    /// Renderer implementing this backend
    pub fn renderer(self) -> &'static dyn MapRenderer {
        match self {
            MapBackend::Native => &geo_axes::GeoAxesRenderer,
            MapBackend::Toolbox => &projected::ProjectedMapRenderer,
            MapBackend::Plain => &plain::PlainAxesRenderer,
        }
    }
}

impl fmt::Display for MapBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapBackend::Native => write!(f, "native"),
            MapBackend::Toolbox => write!(f, "toolbox"),
            MapBackend::Plain => write!(f, "plain"),
        }
    }
}

/// Common capability of all rendering backends
pub trait MapRenderer {
    /// Draw the scene into `area` and return the legend entries that were drawn
    fn draw(&self, area: &MapArea<'_>, scene: &Scene<'_>) -> Result<Vec<LegendEntry>>;
}

/// One float's fixes with its plot color
#[derive(Debug, Clone)]
pub struct StyledTrack {
    pub float: FloatId,
    pub color: [u8; 3],
    pub agency: Option<String>,
    /// (lon, lat) pairs in the bounds' longitude convention, NaN = missing fix
    pub points: Vec<(f64, f64)>,
}

impl StyledTrack {
    pub fn first_valid(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .copied()
            .find(|(lon, lat)| lon.is_finite() && lat.is_finite())
    }

    /// Runs of consecutive valid fixes
    ///
    /// A run ends at a missing fix or where the longitude jumps by more
    /// than 180 degrees.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();

        for &(lon, lat) in &self.points {
            if !lon.is_finite() || !lat.is_finite() {
                if current.len() > 1 {
                    segments.push(std::mem::take(&mut current));
                }
                current.clear();
                continue;
            }
            if let Some(&(prev_lon, _)) = current.last() {
                if (lon - prev_lon).abs() > 180.0 {
                    if current.len() > 1 {
                        segments.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
            }
            current.push((lon, lat));
        }
        if current.len() > 1 {
            segments.push(current);
        }
        segments
    }
}

/// Everything a renderer needs for one figure
pub struct Scene<'a> {
    pub bounds: GeoBounds,
    pub tracks: Vec<StyledTrack>,
    pub colors: &'a ColorAssignment,
    pub config: &'a PlotConfig,
    pub coastline: Option<&'a Coastline>,
    /// Whether fonts are available for titles, labels and legends
    pub text: bool,
}

/// Which legend a renderer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendKind {
    None,
    PerFloat,
    /// One point per agency drawn before the floats
    PerAgency,
}

impl Scene<'_> {
    /// Legend grouping implied by the color mode
    pub fn color_legend(&self) -> LegendKind {
        match self.colors.mode {
            ColorMode::ByAgency => LegendKind::PerAgency,
            _ => LegendKind::PerFloat,
        }
    }

    fn marker_size(&self) -> u32 {
        self.config.point_size.round().max(1.0) as u32
    }

    fn line_width(&self) -> Option<u32> {
        if self.config.line_width > 0.0 {
            Some(self.config.line_width.round().max(1.0) as u32)
        } else {
            None
        }
    }
}

pub fn rgb(color: [u8; 3]) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Sans-serif text style used for all text
pub fn label_font(size: f64) -> TextStyle<'static> {
    TextStyle::from(FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal))
}

/// Check once whether text can be rendered
///
/// Bitmap text needs a system font. Without one, figures are drawn without
/// titles, tick labels or legend labels.
pub fn fonts_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        let available = FontDesc::new(FontFamily::SansSerif, 12.0, FontStyle::Normal)
            .box_size("Ag")
            .is_ok();
        if !available {
            tracing::warn!("No usable font found, figures will be rendered without text");
        }
        available
    })
}

/// Draw every track, plus legend anchors for agency legends
///
/// `project` maps a (lon, lat) fix to chart coordinates; fixes it rejects are
/// skipped. Returns the legend entries that were registered on the chart.
pub(crate) fn draw_tracks(
    chart: &mut MapChart<'_, '_>,
    scene: &Scene<'_>,
    project: &dyn Fn((f64, f64)) -> Option<(f64, f64)>,
    legend: LegendKind,
) -> Result<Vec<LegendEntry>> {
    let size = scene.marker_size();
    let mut drawn = Vec::new();

    if legend == LegendKind::PerAgency {
        for entry in &scene.colors.agencies {
            let anchor = scene
                .tracks
                .iter()
                .filter(|t| t.agency.as_deref() == Some(entry.label.as_str()))
                .find_map(StyledTrack::first_valid)
                .and_then(project);
            let Some(anchor) = anchor else { continue };

            let color = rgb(entry.color);
            let series =
                chart.draw_series(std::iter::once(Circle::new(anchor, size, color.filled())))?;
            if scene.text {
                series
                    .label(entry.label.clone())
                    .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
            }
            drawn.push(entry.clone());
        }
    }

    for track in &scene.tracks {
        let color = rgb(track.color);

        if let Some(width) = scene.line_width() {
            for segment in track.segments() {
                let projected: Vec<(f64, f64)> = segment.into_iter().filter_map(project).collect();
                if projected.len() > 1 {
                    chart.draw_series(LineSeries::new(projected, color.stroke_width(width)))?;
                }
            }
        }

        let points: Vec<(f64, f64)> = track
            .points
            .iter()
            .copied()
            .filter(|(lon, lat)| lon.is_finite() && lat.is_finite())
            .filter_map(project)
            .collect();
        let series = chart.draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, size, color.filled())),
        )?;

        if legend == LegendKind::PerFloat {
            if scene.text {
                series
                    .label(track.float.to_string())
                    .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
            }
            drawn.push(LegendEntry {
                label: track.float.to_string(),
                color: track.color,
            });
        }
    }

    Ok(drawn)
}

/// Draw the legend box if anything was labelled
pub(crate) fn draw_legend<'a>(
    chart: &mut MapChart<'a, 'a>,
    scene: &Scene<'_>,
    entries: &[LegendEntry],
) -> Result<()> {
    let position = match scene.config.legend_position {
        LegendPosition::None => return Ok(()),
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
        LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
    };
    if !scene.text || entries.is_empty() {
        return Ok(());
    }

    chart
        .configure_series_labels()
        .position(position)
        .label_font(label_font(13.0))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

/// Graticule spacing in degrees giving at most six lines over `span`
pub fn graticule_step(span: f64) -> f64 {
    const STEPS: [f64; 10] = [1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 30.0, 45.0, 60.0, 90.0];
    STEPS
        .iter()
        .copied()
        .find(|step| span / step <= 6.0)
        .unwrap_or(90.0)
}

/// Multiples of `step` inside [min, max]
pub fn graticule_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Format a longitude tick as degrees east/west
pub fn format_lon(lon: f64) -> String {
    let lon = if lon > 180.0 { lon - 360.0 } else { lon };
    let value = lon.abs();
    if value < 1e-9 || (value - 180.0).abs() < 1e-9 {
        format!("{}°", trim_number(value))
    } else if lon > 0.0 {
        format!("{}°E", trim_number(value))
    } else {
        format!("{}°W", trim_number(value))
    }
}

/// Format a latitude tick as degrees north/south
pub fn format_lat(lat: f64) -> String {
    let value = lat.abs();
    if value < 1e-9 {
        "0°".to_string()
    } else if lat > 0.0 {
        format!("{}°N", trim_number(value))
    } else {
        format!("{}°S", trim_number(value))
    }
}

fn trim_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}
