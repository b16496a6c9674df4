//! Rendered figure and PNG output

use super::{label_font, MapBackend, Scene};
use crate::argo::colors::LegendEntry;
use crate::argo::error::Result;
use crate::argo::GeoBounds;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use plotters::prelude::*;
use std::path::Path;

/// A rendered map held in memory as an RGB buffer
#[derive(Debug, Clone)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
    pub title: Option<String>,
    pub backend: MapBackend,
    pub bounds: GeoBounds,
    /// Legend entries drawn on the figure (empty for the projection toolbox backend)
    pub legend: Vec<LegendEntry>,
}

impl Figure {
    /// Raw RGB8 pixels, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB value of one pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        let encoder = PngEncoder::new(&mut png);
        encoder.write_image(
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(png)
    }

    /// Write the figure as a PNG file, creating parent directories as needed
    pub fn save_png(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let png = self.encode_png()?;
        std::fs::write(path, &png)?;
        tracing::info!("Saved {} ({} bytes)", path.display(), png.len());
        Ok(())
    }

    /// PNG as a `data:image/png;base64,...` URI
    pub fn to_data_uri(&self) -> Result<String> {
        let png = self.encode_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        ))
    }
}

/// Render a scene with the given backend into a new figure
pub fn render_figure(
    scene: &Scene<'_>,
    title: Option<&str>,
    backend: MapBackend,
    width: u32,
    height: u32,
) -> Result<Figure> {
    let mut pixels = vec![0u8; (width * height * 3) as usize];

    let legend = {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let area = match title {
            Some(text) if scene.text && !text.is_empty() => root.titled(text, label_font(20.0))?,
            _ => root.clone(),
        };

        let legend = backend.renderer().draw(&area, scene)?;
        root.present()?;
        legend
    };

    tracing::debug!(
        "Rendered {}x{} figure with {} backend, {} legend entries",
        width,
        height,
        backend,
        legend.len()
    );

    Ok(Figure {
        width,
        height,
        pixels,
        title: title.map(str::to_string),
        backend,
        bounds: scene.bounds,
        legend,
    })
}
