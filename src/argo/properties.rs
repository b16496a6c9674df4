//! Figure dimension parsing

/// Figure dimension - either explicit pixels or "auto" (derived from the map extent)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlotDimension {
    #[default]
    Auto,
    Pixels(u32),
}

/// Height used for auto-sized figures
pub const AUTO_HEIGHT: u32 = 700;
const AUTO_MIN_WIDTH: u32 = 600;
const AUTO_MAX_WIDTH: u32 = 1600;

impl PlotDimension {
    /// Parse from string setting value
    ///
    /// Valid formats:
    /// - "auto" or "" (empty) → Auto
    /// - "1500" → Pixels(1500) if in valid range [100, 10000]
    pub fn parse(value: &str, default: PlotDimension) -> Self {
        let trimmed = value.trim();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return PlotDimension::Auto;
        }

        match trimmed.parse::<u32>() {
            Ok(px) if (100..=10000).contains(&px) => PlotDimension::Pixels(px),
            Ok(px) => {
                tracing::warn!(
                    "Plot dimension {} out of valid range [100-10000], using default: {:?}",
                    px,
                    default
                );
                default
            }
            Err(_) => {
                tracing::warn!(
                    "Invalid plot dimension '{}', using default: {:?}",
                    trimmed,
                    default
                );
                default
            }
        }
    }
}

/// Resolve figure width and height in pixels
///
/// Auto height is 700px. Auto width follows the aspect ratio of the map
/// extent (`lon_span / lat_span`), clamped to [600, 1600].
pub fn resolve_dimensions(
    width: PlotDimension,
    height: PlotDimension,
    lon_span: f64,
    lat_span: f64,
) -> (u32, u32) {
    let height = match height {
        PlotDimension::Pixels(px) => px,
        PlotDimension::Auto => AUTO_HEIGHT,
    };

    let width = match width {
        PlotDimension::Pixels(px) => px,
        PlotDimension::Auto => {
            let aspect = if lat_span > 0.0 && lon_span > 0.0 {
                lon_span / lat_span
            } else {
                1.0
            };
            let computed = (height as f64 * aspect).round();
            (computed as u32).clamp(AUTO_MIN_WIDTH, AUTO_MAX_WIDTH)
        }
    };

    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_dimension_auto() {
        assert_eq!(PlotDimension::parse("auto", PlotDimension::Auto), PlotDimension::Auto);
        assert_eq!(PlotDimension::parse("", PlotDimension::Auto), PlotDimension::Auto);
    }

    #[test]
    fn test_plot_dimension_pixels() {
        assert_eq!(
            PlotDimension::parse("1500", PlotDimension::Auto),
            PlotDimension::Pixels(1500)
        );
        assert_eq!(
            PlotDimension::parse("100", PlotDimension::Auto),
            PlotDimension::Pixels(100)
        );
    }

    #[test]
    fn test_plot_dimension_invalid() {
        assert_eq!(PlotDimension::parse("abc", PlotDimension::Auto), PlotDimension::Auto);
        assert_eq!(PlotDimension::parse("50", PlotDimension::Auto), PlotDimension::Auto);
        assert_eq!(PlotDimension::parse("20000", PlotDimension::Auto), PlotDimension::Auto);
    }

    #[test]
    fn test_resolve_dimensions() {
        // Square extent
        assert_eq!(
            resolve_dimensions(PlotDimension::Auto, PlotDimension::Auto, 20.0, 20.0),
            (700, 700)
        );
        // Wide extent is capped
        assert_eq!(
            resolve_dimensions(PlotDimension::Auto, PlotDimension::Auto, 360.0, 20.0),
            (1600, 700)
        );
        // Tall extent is floored
        assert_eq!(
            resolve_dimensions(PlotDimension::Auto, PlotDimension::Auto, 5.0, 50.0),
            (600, 700)
        );
        // Explicit pixels win
        assert_eq!(
            resolve_dimensions(PlotDimension::Pixels(300), PlotDimension::Pixels(200), 5.0, 50.0),
            (300, 200)
        );
    }
}
