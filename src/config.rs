//! Display configuration
//!
//! Configuration is loaded from display settings (defined in plot_settings.json).
//! Defaults come from plot_settings.json via the `SettingsReader`; user values
//! come from an optional JSON settings file.

use crate::argo::colors::{parse_color_spec, SINGLE_FLOAT_FALLBACK_COLOR};
use crate::argo::error::Result;
use crate::argo::palettes::{PaletteDefinition, PALETTE_REGISTRY};
use crate::argo::plot_properties::SettingsReader;
use crate::argo::properties::{resolve_dimensions, PlotDimension};
use crate::argo::GeoBounds;
use crate::render::MapBackend;
use std::path::{Path, PathBuf};

/// Basemap drawn under native geographic axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasemapStyle {
    /// Light blue ocean, gray land
    #[default]
    Ocean,
    /// White ocean, gray land
    GrayLand,
    /// No fill, land outlines only
    None,
}

impl BasemapStyle {
    /// Parse from string value
    ///
    /// Validation happens in SettingsReader.get_enum()
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "grayland" => Self::GrayLand,
            "none" => Self::None,
            _ => Self::Ocean,
        }
    }
}

/// Legend placement inside the plotting area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
    None,
}

impl LegendPosition {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "upper-left" => Self::UpperLeft,
            "lower-left" => Self::LowerLeft,
            "lower-right" => Self::LowerRight,
            "none" => Self::None,
            _ => Self::UpperRight,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Rendering backend: native geographic axes, projection toolbox, or plain axes
    pub backend: MapBackend,

    /// Palette sampled for per-float and per-agency colors
    pub palette: String,

    /// Basemap style for native geographic axes
    pub basemap: BasemapStyle,

    /// GeoJSON land/coastline file (None = no land drawn)
    pub coastline_file: Option<PathBuf>,

    /// Figure width (pixels or Auto)
    pub plot_width: PlotDimension,

    /// Figure height (pixels or Auto)
    pub plot_height: PlotDimension,

    /// Marker radius in pixels
    pub point_size: f64,

    /// Width of the line joining consecutive fixes (0 = markers only)
    pub line_width: f64,

    pub legend_position: LegendPosition,

    /// Color used in `multiple` mode when only one float is plotted
    pub single_float_color: [u8; 3],
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self::from_settings(&SettingsReader::default())
    }
}

impl PlotConfig {
    /// Create config from display settings
    ///
    /// Invalid user values fall back to the defaults in plot_settings.json.
    pub fn from_settings(props: &SettingsReader) -> Self {
        let backend = MapBackend::parse(&props.get_enum("mapping"));

        let palette = props.get_string("colormap");

        let basemap = BasemapStyle::parse(&props.get_enum("basemap"));

        let coastline_file = props.get_optional_string("coastline.file").map(PathBuf::from);

        let plot_width = PlotDimension::parse(&props.get_string("plot.width"), PlotDimension::Auto);
        let plot_height =
            PlotDimension::parse(&props.get_string("plot.height"), PlotDimension::Auto);

        let point_size = props.get_f64_in_range("point.size", 0.5, 20.0);
        let line_width = props.get_f64_in_range("line.width", 0.0, 10.0);

        let legend_position = LegendPosition::parse(&props.get_enum("legend.position"));

        let single_float_color = {
            let spec = props.get_string("single.float.color");
            parse_color_spec(&spec).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid color '{}' for setting 'single.float.color', using blue",
                    spec
                );
                SINGLE_FLOAT_FALLBACK_COLOR
            })
        };

        Self {
            backend,
            palette,
            basemap,
            coastline_file,
            plot_width,
            plot_height,
            point_size,
            line_width,
            legend_position,
            single_float_color,
        }
    }

    /// Load config from a JSON settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = SettingsReader::from_file(path)?;
        Ok(Self::from_settings(&reader))
    }

    /// Builder-style backend override
    pub fn with_backend(mut self, backend: MapBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Active palette, falling back to the default palette for unknown names
    pub fn palette(&self) -> Option<&'static PaletteDefinition> {
        PALETTE_REGISTRY.get_or_default(&self.palette)
    }

    /// Resolve figure size in pixels for the given map limits
    pub fn resolve_dimensions(&self, bounds: &GeoBounds) -> (u32, u32) {
        resolve_dimensions(
            self.plot_width,
            self.plot_height,
            bounds.lon_span(),
            bounds.lat_span(),
        )
    }
}
