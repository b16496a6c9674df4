//! Projection toolbox map
//!
//! Draws in projected coordinates: Miller cylindrical for wide latitude
//! ranges, Lambert conformal conic for regional maps. This backend has no
//! legend support; the returned legend is always empty.

use super::projection::{boundary, Projection};
use super::{
    draw_tracks, format_lat, format_lon, graticule_step, graticule_values, label_font, LegendKind,
    MapArea, MapChart, MapRenderer, Scene,
};
use crate::argo::colors::LegendEntry;
use crate::argo::error::Result;
use crate::argo::GeoBounds;
use plotters::prelude::*;

const LAND: RGBColor = RGBColor(179, 179, 179);
const COAST: RGBColor = RGBColor(90, 90, 90);
const GRID: RGBColor = RGBColor(150, 150, 150);

/// Samples per graticule line
const LINE_SAMPLES: usize = 48;

pub struct ProjectedMapRenderer;

impl MapRenderer for ProjectedMapRenderer {
    fn draw(&self, area: &MapArea<'_>, scene: &Scene<'_>) -> Result<Vec<LegendEntry>> {
        let b = scene.bounds;
        let projection = Projection::for_bounds(&b);
        tracing::debug!(
            "Projection {} for latitude span {:.1}",
            projection.name(),
            b.lat_span()
        );

        let (x_range, y_range) = fit_aspect(projection.extent(&b), area.dim_in_pixel());
        let mut chart = ChartBuilder::on(area)
            .margin(16)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

        let project = |p: (f64, f64)| projection.project(p);

        draw_coast(&mut chart, scene, &project)?;
        draw_grid(&mut chart, scene, &project)?;

        draw_tracks(&mut chart, scene, &project, LegendKind::None)?;

        Ok(Vec::new())
    }
}

/// Expand the projected extent so one unit spans the same number of pixels
/// on both axes, with a small margin
fn fit_aspect(
    ((x_min, x_max), (y_min, y_max)): ((f64, f64), (f64, f64)),
    (width, height): (u32, u32),
) -> ((f64, f64), (f64, f64)) {
    let pad = 0.03 * (x_max - x_min).max(y_max - y_min);
    let (mut x0, mut x1) = (x_min - pad, x_max + pad);
    let (mut y0, mut y1) = (y_min - pad, y_max + pad);

    let area_aspect = width.max(1) as f64 / height.max(1) as f64;
    let data_aspect = (x1 - x0) / (y1 - y0);

    if data_aspect < area_aspect {
        let extra = ((y1 - y0) * area_aspect - (x1 - x0)) / 2.0;
        x0 -= extra;
        x1 += extra;
    } else {
        let extra = ((x1 - x0) / area_aspect - (y1 - y0)) / 2.0;
        y0 -= extra;
        y1 += extra;
    }
    ((x0, x1), (y0, y1))
}

fn project_line(
    points: impl IntoIterator<Item = (f64, f64)>,
    project: &dyn Fn((f64, f64)) -> Option<(f64, f64)>,
) -> Vec<(f64, f64)> {
    points.into_iter().filter_map(project).collect()
}

fn draw_coast(
    chart: &mut MapChart<'_, '_>,
    scene: &Scene<'_>,
    project: &dyn Fn((f64, f64)) -> Option<(f64, f64)>,
) -> Result<()> {
    let Some(coastline) = scene.coastline else {
        return Ok(());
    };

    chart.draw_series(
        coastline
            .clipped_polygons(&scene.bounds)
            .into_iter()
            .map(|ring| project_line(ring, project))
            .filter(|ring| ring.len() >= 3)
            .map(|ring| Polygon::new(ring, LAND.filled())),
    )?;
    chart.draw_series(
        coastline
            .clipped_lines(&scene.bounds)
            .into_iter()
            .map(|line| project_line(line, project))
            .filter(|line| line.len() >= 2)
            .map(|line| PathElement::new(line, COAST.stroke_width(1))),
    )?;
    Ok(())
}

/// Projected meridians and parallels, edge labels, and a framed outline
fn draw_grid(
    chart: &mut MapChart<'_, '_>,
    scene: &Scene<'_>,
    project: &dyn Fn((f64, f64)) -> Option<(f64, f64)>,
) -> Result<()> {
    let b = scene.bounds;
    let meridians = graticule_values(b.lon_min, b.lon_max, graticule_step(b.lon_span()));
    let parallels = graticule_values(b.lat_min, b.lat_max, graticule_step(b.lat_span()));
    let grid = GRID.mix(0.7);

    chart.draw_series(meridians.iter().map(|&lon| {
        let line = (0..=LINE_SAMPLES).map(|i| (lon, lerp(b.lat_min, b.lat_max, i)));
        PathElement::new(project_line(line, project), grid)
    }))?;
    chart.draw_series(parallels.iter().map(|&lat| {
        let line = (0..=LINE_SAMPLES).map(|i| (lerp(b.lon_min, b.lon_max, i), lat));
        PathElement::new(project_line(line, project), grid)
    }))?;

    // Frame: thick dark outline with a thin light inner line
    let outline = project_line(boundary(&b, LINE_SAMPLES), project);
    chart.draw_series(std::iter::once(PathElement::new(
        outline.clone(),
        BLACK.stroke_width(4),
    )))?;
    chart.draw_series(std::iter::once(PathElement::new(
        outline,
        WHITE.stroke_width(1),
    )))?;

    if scene.text {
        draw_grid_labels(chart, &b, &meridians, &parallels, project)?;
    }
    Ok(())
}

fn draw_grid_labels(
    chart: &mut MapChart<'_, '_>,
    b: &GeoBounds,
    meridians: &[f64],
    parallels: &[f64],
    project: &dyn Fn((f64, f64)) -> Option<(f64, f64)>,
) -> Result<()> {
    let style = label_font(11.0);

    chart.draw_series(meridians.iter().filter_map(|&lon| {
        project((lon, b.lat_min)).map(|p| {
            EmptyElement::at(p) + Text::new(format_lon(lon), (2, -16), style.clone())
        })
    }))?;
    chart.draw_series(parallels.iter().filter_map(|&lat| {
        project((b.lon_min, lat)).map(|p| {
            EmptyElement::at(p) + Text::new(format_lat(lat), (6, -6), style.clone())
        })
    }))?;
    Ok(())
}

fn lerp(a: f64, b: f64, i: usize) -> f64 {
    a + (b - a) * i as f64 / LINE_SAMPLES as f64
}
