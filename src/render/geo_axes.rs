//! Native geographic axes: equirectangular lon/lat chart with a basemap

use super::{
    draw_legend, draw_tracks, format_lat, format_lon, graticule_step, graticule_values,
    label_font, MapArea, MapChart, MapRenderer, Scene,
};
use crate::argo::colors::LegendEntry;
use crate::argo::error::Result;
use crate::config::BasemapStyle;
use plotters::prelude::*;

const OCEAN: RGBColor = RGBColor(214, 234, 248);
const LAND: RGBColor = RGBColor(200, 200, 200);
const COAST: RGBColor = RGBColor(110, 110, 110);
const GRID: RGBColor = RGBColor(160, 160, 160);

pub struct GeoAxesRenderer;

impl MapRenderer for GeoAxesRenderer {
    fn draw(&self, area: &MapArea<'_>, scene: &Scene<'_>) -> Result<Vec<LegendEntry>> {
        let b = scene.bounds;

        let mut builder = ChartBuilder::on(area);
        builder.margin(12);
        if scene.text {
            builder.x_label_area_size(28).y_label_area_size(48);
        }
        let mut chart = builder.build_cartesian_2d(b.lon_min..b.lon_max, b.lat_min..b.lat_max)?;

        draw_basemap(&mut chart, scene)?;
        draw_graticule(&mut chart, scene)?;

        let entries = draw_tracks(&mut chart, scene, &|p| Some(p), scene.color_legend())?;
        draw_legend(&mut chart, scene, &entries)?;

        Ok(entries)
    }
}

fn draw_basemap(chart: &mut MapChart<'_, '_>, scene: &Scene<'_>) -> Result<()> {
    let b = scene.bounds;

    if scene.config.basemap == BasemapStyle::Ocean {
        chart.draw_series(std::iter::once(Rectangle::new(
            [(b.lon_min, b.lat_min), (b.lon_max, b.lat_max)],
            OCEAN.filled(),
        )))?;
    }

    let Some(coastline) = scene.coastline else {
        return Ok(());
    };

    if scene.config.basemap != BasemapStyle::None {
        chart.draw_series(
            coastline
                .clipped_polygons(&b)
                .into_iter()
                .map(|ring| Polygon::new(ring, LAND.filled())),
        )?;
    }
    chart.draw_series(
        coastline
            .clipped_lines(&b)
            .into_iter()
            .map(|line| PathElement::new(line, COAST.stroke_width(1))),
    )?;
    Ok(())
}

/// Parallels and meridians, tick labels, and the map frame
fn draw_graticule(chart: &mut MapChart<'_, '_>, scene: &Scene<'_>) -> Result<()> {
    let b = scene.bounds;
    let lon_step = graticule_step(b.lon_span());
    let lat_step = graticule_step(b.lat_span());
    let grid = GRID.mix(0.6);

    chart.draw_series(
        graticule_values(b.lon_min, b.lon_max, lon_step)
            .into_iter()
            .map(|lon| PathElement::new(vec![(lon, b.lat_min), (lon, b.lat_max)], grid)),
    )?;
    chart.draw_series(
        graticule_values(b.lat_min, b.lat_max, lat_step)
            .into_iter()
            .map(|lat| PathElement::new(vec![(b.lon_min, lat), (b.lon_max, lat)], grid)),
    )?;

    if scene.text {
        let lon_labels = graticule_values(b.lon_min, b.lon_max, lon_step).len().max(2);
        let lat_labels = graticule_values(b.lat_min, b.lat_max, lat_step).len().max(2);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(lon_labels)
            .y_labels(lat_labels)
            .x_label_formatter(&|lon| format_lon(*lon))
            .y_label_formatter(&|lat| format_lat(*lat))
            .label_style(label_font(12.0))
            .draw()?;
    }

    chart.draw_series(std::iter::once(Rectangle::new(
        [(b.lon_min, b.lat_min), (b.lon_max, b.lat_max)],
        BLACK.stroke_width(1),
    )))?;
    Ok(())
}
