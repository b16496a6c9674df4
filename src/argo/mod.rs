//! Float trajectory data module
//!
//! Structure:
//! - `data.rs`: Float identifiers, coordinate records and CSV loading
//! - `agency.rs`: Float to agency lookup (profile index, DAC column)
//! - `bounds.rs`: Map limits derived from coordinate extrema
//! - `colors.rs`: Color modes and per-float color assignment
//! - `palettes.rs`: Embedded palette registry
//! - `plot_properties.rs`: Display setting definitions and typed reader
//! - `properties.rs`: Figure dimension parsing
//! - `error.rs`: Error types

pub mod agency;
pub mod bounds;
pub mod colors;
pub mod data;
pub mod error;
pub mod palettes;
pub mod plot_properties;
pub mod properties;

// Re-exports for convenience
pub use agency::{AgencyIndex, AgencyLookup};
pub use bounds::{derive_bounds, GeoBounds, LonConvention};
pub use colors::{assign_colors, ColorAssignment, ColorMode, LegendEntry, TrackStyle};
pub use data::{load_trajectories, FloatId, FloatTrack, TrajectoryTable};
pub use error::{PlotError, Result};
pub use palettes::{PaletteDefinition, PALETTE_REGISTRY};
