//! Plain longitude/latitude scatter plot

use super::{draw_legend, draw_tracks, label_font, LegendKind, MapArea, MapRenderer, Scene};
use crate::argo::colors::LegendEntry;
use crate::argo::error::Result;
use plotters::prelude::*;

pub struct PlainAxesRenderer;

impl MapRenderer for PlainAxesRenderer {
    fn draw(&self, area: &MapArea<'_>, scene: &Scene<'_>) -> Result<Vec<LegendEntry>> {
        let b = scene.bounds;

        let mut builder = ChartBuilder::on(area);
        builder.margin(12);
        if scene.text {
            builder.x_label_area_size(40).y_label_area_size(56);
        }
        let mut chart = builder.build_cartesian_2d(b.lon_min..b.lon_max, b.lat_min..b.lat_max)?;

        let mut mesh = chart.configure_mesh();
        if scene.text {
            mesh.x_desc("Longitude")
                .y_desc("Latitude")
                .axis_desc_style(label_font(14.0))
                .label_style(label_font(12.0));
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;

        let entries = draw_tracks(&mut chart, scene, &|p| Some(p), LegendKind::PerFloat)?;
        draw_legend(&mut chart, scene, &entries)?;

        Ok(entries)
    }
}
