use thiserror::Error;

use super::data::FloatId;

/// Errors that can occur while loading trajectories or rendering a map
#[derive(Debug, Error)]
pub enum PlotError {
    /// Trajectory or index table could not be read
    #[error("Data error: {0}")]
    Data(#[from] polars::error::PolarsError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding error
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// Coastline file could not be parsed
    #[error("Coastline error: {0}")]
    Coastline(#[from] geojson::Error),

    /// Drawing backend error (plotters errors are generic over the backend)
    #[error("Render error: {0}")]
    Render(String),

    /// Float requested for plotting but absent from the coordinate table
    #[error("Float {0} not found in trajectory data")]
    UnknownFloat(FloatId),

    /// No agency is known for the float
    #[error("No agency known for float {0}")]
    UnknownAgency(FloatId),

    /// Color mode or color name could not be parsed
    #[error("Unknown color specification '{0}'")]
    UnknownColor(String),

    /// None of the included floats has a valid position fix
    #[error("No valid positions for the selected floats")]
    NoPositions,

    /// Invalid settings file or property value
    #[error("Settings error: {0}")]
    Settings(String),
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for PlotError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PlotError::Render(err.to_string())
    }
}

/// Type alias for Results using PlotError
pub type Result<T> = std::result::Result<T, PlotError>;
