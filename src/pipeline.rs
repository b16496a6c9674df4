//! Trajectory plot pipeline
//!
//! This module contains the plot operation shared by the library API and the
//! `plot_trajectories` binary.
//!
//! The pipeline:
//! 1. Checks that every required argument was supplied
//! 2. Derives the map limits from the selected floats
//! 3. Assigns colors and builds the scene
//! 4. Renders with the configured backend and optionally saves a PNG

use crate::argo::agency::AgencyLookup;
use crate::argo::colors::{assign_colors, ColorMode};
use crate::argo::error::{PlotError, Result};
use crate::argo::{derive_bounds, FloatId, TrajectoryTable};
use crate::config::PlotConfig;
use crate::render::basemap::Coastline;
use crate::render::{fonts_available, render_figure, Figure, Scene, StyledTrack};
use std::path::{Path, PathBuf};

/// Usage message logged when required arguments are missing
pub const USAGE: &str = "usage: plot_trajectories(data, color, title, output, float_ids) where \
color is 'multiple', 'dac' or a color name, output is a PNG path (empty for no file) and \
float_ids lists the floats to draw";

/// Arguments of one plot call
///
/// Every field is required. A missing field makes the call log the usage
/// message and return `PlotOutcome::Skipped`.
#[derive(Debug, Clone, Default)]
pub struct PlotRequest<'a> {
    pub data: Option<&'a TrajectoryTable>,
    pub color: Option<ColorMode>,
    pub title: Option<String>,
    /// PNG destination; an empty path renders without saving
    pub output: Option<PathBuf>,
    pub float_ids: Option<Vec<FloatId>>,
}

impl<'a> PlotRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, data: &'a TrajectoryTable) -> Self {
        self.data = Some(data);
        self
    }

    pub fn color(mut self, color: ColorMode) -> Self {
        self.color = Some(color);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn floats(mut self, float_ids: Vec<FloatId>) -> Self {
        self.float_ids = Some(float_ids);
        self
    }

    /// Names of required arguments that were not supplied
    pub fn missing_arguments(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.data.is_none() {
            missing.push("data");
        }
        if self.color.is_none() {
            missing.push("color");
        }
        if self.title.is_none() {
            missing.push("title");
        }
        if self.output.is_none() {
            missing.push("output");
        }
        if self.float_ids.is_none() {
            missing.push("float_ids");
        }
        missing
    }
}

/// Result of a plot call
#[derive(Debug)]
pub enum PlotOutcome {
    /// The figure was rendered (and saved if an output path was given)
    Rendered(Figure),
    /// Required arguments were missing; nothing was drawn
    Skipped { missing: Vec<&'static str> },
}

impl PlotOutcome {
    pub fn figure(&self) -> Option<&Figure> {
        match self {
            PlotOutcome::Rendered(figure) => Some(figure),
            PlotOutcome::Skipped { .. } => None,
        }
    }
}

/// Plot the trajectories of the requested floats
///
/// `agencies` is needed only when coloring by agency.
pub fn plot_trajectories(
    request: &PlotRequest<'_>,
    config: &PlotConfig,
    agencies: Option<&dyn AgencyLookup>,
) -> Result<PlotOutcome> {
    let (Some(table), Some(color), Some(title), Some(output), Some(float_ids)) = (
        request.data,
        request.color,
        request.title.as_deref(),
        request.output.as_deref(),
        request.float_ids.as_deref(),
    ) else {
        let missing = request.missing_arguments();
        tracing::warn!("Missing arguments: {}. {}", missing.join(", "), USAGE);
        return Ok(PlotOutcome::Skipped { missing });
    };

    tracing::info!(
        "Plotting {} floats, color mode {}, {} backend",
        float_ids.len(),
        color,
        config.backend
    );

    let bounds = derive_bounds(table, float_ids)?;
    tracing::info!(
        "Map limits: lat [{:.2}, {:.2}], lon [{:.2}, {:.2}] ({:?})",
        bounds.lat_min,
        bounds.lat_max,
        bounds.lon_min,
        bounds.lon_max,
        bounds.convention
    );

    let palette = config
        .palette()
        .ok_or_else(|| PlotError::Settings(format!("Unknown palette '{}'", config.palette)))?;
    let colors = assign_colors(
        color,
        float_ids,
        palette,
        config.single_float_color,
        agencies,
    )?;

    let tracks = colors
        .styles
        .iter()
        .map(|style| {
            let track = table
                .get(style.float)
                .ok_or(PlotError::UnknownFloat(style.float))?;
            Ok(StyledTrack {
                float: style.float,
                color: style.color,
                agency: style.agency.clone(),
                points: track.points(bounds.convention.uses_alt_lon()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let coastline = config
        .coastline_file
        .as_deref()
        .map(Coastline::from_file)
        .transpose()?;

    let (width, height) = config.resolve_dimensions(&bounds);
    let scene = Scene {
        bounds,
        tracks,
        colors: &colors,
        config,
        coastline: coastline.as_ref(),
        text: fonts_available(),
    };

    let figure = render_figure(&scene, Some(title), config.backend, width, height)?;
    tracing::info!(
        "Rendered {}x{} figure, {} legend entries",
        figure.width,
        figure.height,
        figure.legend.len()
    );

    save_if_requested(&figure, output)?;

    Ok(PlotOutcome::Rendered(figure))
}

fn save_if_requested(figure: &Figure, output: &Path) -> Result<()> {
    if output.as_os_str().is_empty() {
        tracing::debug!("No output path, figure kept in memory");
        return Ok(());
    }
    figure.save_png(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argo::colors::SINGLE_FLOAT_FALLBACK_COLOR;
    use crate::argo::{FloatTrack, LonConvention};
    use crate::config::{BasemapStyle, LegendPosition};
    use crate::render::MapBackend;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory log sink for capturing tracing output
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn count_pixels(figure: &Figure, color: [u8; 3]) -> usize {
        figure
            .pixels()
            .chunks_exact(3)
            .filter(|px| *px == color.as_slice())
            .count()
    }

    fn small_config() -> PlotConfig {
        let mut config = PlotConfig::default();
        config.plot_width = crate::argo::properties::PlotDimension::Pixels(320);
        config.plot_height = crate::argo::properties::PlotDimension::Pixels(240);
        config
    }

    fn atlantic_table() -> TrajectoryTable {
        let mut table = TrajectoryTable::new();
        table.insert(
            FloatId(6901001),
            FloatTrack::from_fixes(&[(10.0, -30.0), (10.5, -29.5), (11.0, -29.0)]),
        );
        table.insert(
            FloatId(6901002),
            FloatTrack::from_fixes(&[(20.0, -40.0), (f64::NAN, f64::NAN), (21.0, -41.0)]),
        );
        table.insert(FloatId(3901003), FloatTrack::from_fixes(&[(-5.0, -10.0)]));
        table
    }

    fn agencies() -> HashMap<FloatId, String> {
        let mut map = HashMap::new();
        map.insert(FloatId(6901001), "coriolis".to_string());
        map.insert(FloatId(6901002), "coriolis".to_string());
        map.insert(FloatId(3901003), "bodc".to_string());
        map
    }

    fn rendered(outcome: PlotOutcome) -> Figure {
        match outcome {
            PlotOutcome::Rendered(figure) => figure,
            PlotOutcome::Skipped { missing } => panic!("plot skipped, missing {:?}", missing),
        }
    }

    #[test]
    fn test_single_float_latitude_limits() {
        let table = atlantic_table();
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::Multiple)
            .title("One float")
            .output("")
            .floats(vec![FloatId(6901001)]);

        let figure = rendered(plot_trajectories(&request, &small_config(), None).unwrap());
        assert_eq!(figure.bounds.lat_min, 5.0);
        assert_eq!(figure.bounds.lat_max, 16.0);
        assert_eq!(figure.bounds.convention, LonConvention::Signed);
    }

    #[test]
    fn test_single_float_multiple_mode_uses_fallback_color() {
        let table = atlantic_table();
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::Multiple)
            .title("One float")
            .output("")
            .floats(vec![FloatId(3901003)]);

        let figure = rendered(plot_trajectories(&request, &small_config(), None).unwrap());
        assert_eq!(figure.legend.len(), 1);
        assert_eq!(figure.legend[0].color, SINGLE_FLOAT_FALLBACK_COLOR);
        assert_eq!(figure.legend[0].label, "3901003");
    }

    #[test]
    fn test_dateline_floats_use_positive_longitudes() {
        let mut table = TrajectoryTable::new();
        table.insert(
            FloatId(1),
            FloatTrack::from_fixes(&[(-40.0, 178.0), (-40.5, -179.0)]).with_alt_longitude(),
        );
        table.insert(
            FloatId(2),
            FloatTrack::from_fixes(&[(-42.0, -176.0)]).with_alt_longitude(),
        );
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::Multiple)
            .title("Dateline")
            .output("")
            .floats(vec![FloatId(1), FloatId(2)]);

        let figure = rendered(plot_trajectories(&request, &small_config(), None).unwrap());
        assert_eq!(figure.bounds.convention, LonConvention::Positive);
        assert_eq!(figure.bounds.lon_min, 173.0);
        assert_eq!(figure.bounds.lon_max, 189.0);
    }

    #[test]
    fn test_agency_mode_legend_has_one_entry_per_agency() {
        let table = atlantic_table();
        let agencies = agencies();
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::ByAgency)
            .title("By agency")
            .output("")
            .floats(table.float_ids());

        let figure = rendered(
            plot_trajectories(&request, &small_config(), Some(&agencies as &dyn AgencyLookup))
                .unwrap(),
        );
        assert_eq!(figure.legend.len(), 2);
        let labels: Vec<&str> = figure.legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["bodc", "coriolis"]);
    }

    #[test]
    fn test_missing_arguments_skip_plot() {
        let table = atlantic_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.png");

        let request = PlotRequest::new()
            .data(&table)
            .title("Incomplete")
            .output(&path);

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let outcome = tracing::subscriber::with_default(subscriber, || {
            plot_trajectories(&request, &small_config(), None)
        })
        .unwrap();

        match outcome {
            PlotOutcome::Skipped { missing } => assert_eq!(missing, vec!["color", "float_ids"]),
            PlotOutcome::Rendered(_) => panic!("expected the plot to be skipped"),
        }
        assert!(!path.exists());

        let logs = logs.contents();
        let warning = logs
            .lines()
            .find(|line| line.contains("WARN") && line.contains(USAGE))
            .unwrap_or_else(|| panic!("no usage warning in log output: {:?}", logs));
        assert!(warning.contains("color, float_ids"));
    }

    #[test]
    fn test_output_path_writes_png() {
        let table = atlantic_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maps").join("tracks.png");

        let request = PlotRequest::new()
            .data(&table)
            .color("r".parse().unwrap())
            .title("Saved")
            .output(&path)
            .floats(table.float_ids());
        let outcome = plot_trajectories(&request, &small_config(), None).unwrap();

        assert!(outcome.figure().is_some());
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_toolbox_backend_has_no_legend() {
        let table = atlantic_table();
        let config = small_config().with_backend(MapBackend::Toolbox);
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::Multiple)
            .title("Toolbox")
            .output("")
            .floats(table.float_ids());

        let figure = rendered(plot_trajectories(&request, &config, None).unwrap());
        assert_eq!(figure.backend, MapBackend::Toolbox);
        assert!(figure.legend.is_empty());
    }

    #[test]
    fn test_plain_backend_legend_is_per_float() {
        let table = atlantic_table();
        let agencies = agencies();
        let config = small_config().with_backend(MapBackend::Plain);
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::ByAgency)
            .title("Plain")
            .output("")
            .floats(table.float_ids());

        let figure = rendered(
            plot_trajectories(&request, &config, Some(&agencies as &dyn AgencyLookup)).unwrap(),
        );
        assert_eq!(figure.legend.len(), 3);
    }

    #[test]
    fn test_unknown_float_is_an_error() {
        let table = atlantic_table();
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::Multiple)
            .title("Unknown")
            .output("")
            .floats(vec![FloatId(42)]);

        let result = plot_trajectories(&request, &small_config(), None);
        assert!(matches!(result, Err(PlotError::UnknownFloat(FloatId(42)))));
    }

    #[test]
    fn test_coastline_file_is_drawn() {
        let table = atlantic_table();
        let dir = tempfile::tempdir().unwrap();
        let coast = dir.path().join("land.geojson");
        std::fs::write(
            &coast,
            r#"{"type": "Polygon", "coordinates": [[[-35, 0], [-20, 0], [-20, 15], [-35, 15], [-35, 0]]]}"#,
        )
        .unwrap();

        let mut config = small_config();
        config.coastline_file = Some(coast);
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::Multiple)
            .title("Coast")
            .output("")
            .floats(table.float_ids());

        let figure = rendered(plot_trajectories(&request, &config, None).unwrap());
        assert!(figure.to_data_uri().unwrap().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_fixed_color_track_is_drawn_on_every_backend() {
        let mut table = TrajectoryTable::new();
        table.insert(
            FloatId(5904859),
            FloatTrack::from_fixes(&[(-30.0, 20.0), (-31.0, 22.0), (-32.0, 25.0)]),
        );

        for backend in [MapBackend::Native, MapBackend::Plain, MapBackend::Toolbox] {
            let mut config = small_config().with_backend(backend);
            config.plot_width = crate::argo::properties::PlotDimension::Pixels(400);
            config.plot_height = crate::argo::properties::PlotDimension::Pixels(400);
            config.line_width = 0.0;

            let request = PlotRequest::new()
                .data(&table)
                .color("r".parse().unwrap())
                .title("Red float")
                .output("")
                .floats(table.float_ids());

            let figure = rendered(plot_trajectories(&request, &config, None).unwrap());
            assert_eq!(figure.pixels().len(), 400 * 400 * 3);
            assert_eq!(figure.pixel(0, 0), Some([255, 255, 255]), "{} background", backend);
            assert_eq!(figure.pixel(400, 0), None);
            assert!(
                count_pixels(&figure, [255, 0, 0]) > 0,
                "{} backend drew no track markers",
                backend
            );
        }
    }

    #[test]
    fn test_basemap_styles_and_hidden_legend() {
        let table = atlantic_table();
        let ocean = [214, 234, 248];
        let request = PlotRequest::new()
            .data(&table)
            .color(ColorMode::Multiple)
            .title("Basemaps")
            .output("")
            .floats(table.float_ids());

        let figure = rendered(plot_trajectories(&request, &small_config(), None).unwrap());
        assert!(count_pixels(&figure, ocean) > 0);

        for basemap in [BasemapStyle::GrayLand, BasemapStyle::None] {
            let mut config = small_config();
            config.basemap = basemap;
            config.legend_position = LegendPosition::None;

            let figure = rendered(plot_trajectories(&request, &config, None).unwrap());
            assert_eq!(count_pixels(&figure, ocean), 0, "{:?} has no ocean fill", basemap);
            // Entries are still reported when the legend box is hidden
            assert_eq!(figure.legend.len(), 3);
        }
    }
}
