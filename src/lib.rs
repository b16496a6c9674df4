//! Argo float trajectory plotting
//!
//! Draws the tracks of oceanographic floats on a map and optionally writes
//! the figure as a PNG.
//!
//! Module organization:
//! - `argo`: trajectory data, agencies, map limits, colors and settings
//! - `config`: display configuration
//! - `render`: map backends and figure output
//! - `pipeline`: the `plot_trajectories` operation

pub mod argo;
pub mod config;
pub mod pipeline;
pub mod render;

pub use pipeline::{plot_trajectories, PlotOutcome, PlotRequest};
