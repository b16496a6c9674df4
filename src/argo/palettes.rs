//! Palette registry for loading and accessing color palettes
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! access by name. The active palette is chosen by the `colormap` setting;
//! float and agency colors are sampled evenly across it.
//!
//! Palette types:
//! - `categorical`: Discrete colors, sampled by index
//! - `sequential`: Gradient from low to high, sampled by interpolation
//! - `diverging`: Gradient with a neutral midpoint, sampled by interpolation

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: LazyLock<PaletteRegistry> = LazyLock::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        tracing::error!("Failed to load palettes.json: {}", e);
        PaletteRegistry::default()
    })
});

/// Default palette name
pub const DEFAULT_PALETTE: &str = "Parula";

/// Palette type as defined in palettes.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    Categorical,
    Sequential,
    Diverging,
}

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub palette_type: PaletteType,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by index (wraps around)
    pub fn get_color(&self, index: usize) -> [u8; 3] {
        if self.colors.is_empty() {
            return [128, 128, 128]; // Gray fallback
        }
        let idx = index % self.colors.len();
        parse_hex_color(&self.colors[idx]).unwrap_or([128, 128, 128])
    }

    /// Get the number of colors in this palette
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Interpolate a color from the palette at position t ∈ [0, 1]
    ///
    /// t=0 returns the first color, t=1 returns the last color.
    /// Values in between are linearly interpolated.
    pub fn interpolate(&self, t: f64) -> [u8; 3] {
        if self.colors.is_empty() {
            return [128, 128, 128]; // Gray fallback
        }

        let t = t.clamp(0.0, 1.0);
        let n = self.colors.len();

        if n == 1 {
            return self.get_color(0);
        }

        let pos = t * (n - 1) as f64;
        let idx_low = pos.floor() as usize;
        let idx_high = (idx_low + 1).min(n - 1);
        let frac = pos - idx_low as f64;

        let color_low = self.get_color(idx_low);
        let color_high = self.get_color(idx_high);

        [
            (color_low[0] as f64 * (1.0 - frac) + color_high[0] as f64 * frac).round() as u8,
            (color_low[1] as f64 * (1.0 - frac) + color_high[1] as f64 * frac).round() as u8,
            (color_low[2] as f64 * (1.0 - frac) + color_high[2] as f64 * frac).round() as u8,
        ]
    }

    /// Sample `n` colors evenly spaced across the palette
    ///
    /// The first sample is the first palette color and the last sample is
    /// the last one. Categorical palettes are sampled at the nearest index,
    /// gradients are interpolated.
    pub fn sample_evenly(&self, n: usize) -> Vec<[u8; 3]> {
        match n {
            0 => Vec::new(),
            1 => vec![self.get_color(0)],
            _ => (0..n)
                .map(|i| {
                    let t = i as f64 / (n - 1) as f64;
                    match self.palette_type {
                        PaletteType::Categorical if n <= self.len() => {
                            let idx = (t * (self.len() - 1) as f64).round() as usize;
                            self.get_color(idx)
                        }
                        PaletteType::Categorical => self.get_color(i),
                        _ => self.interpolate(t),
                    }
                })
                .collect(),
        }
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// All palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
    /// Palette names in file order (for listing)
    names: Vec<String>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();

        for def in definitions {
            registry.names.push(def.name.clone());
            registry.palettes.insert(def.name.to_lowercase(), def);
        }

        tracing::debug!("PaletteRegistry: Loaded {} palettes", registry.palettes.len());

        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Get a palette by name, falling back to the default palette
    pub fn get_or_default(&self, name: &str) -> Option<&PaletteDefinition> {
        self.get(name).or_else(|| {
            tracing::warn!(
                "Unknown palette '{}', using default '{}'",
                name,
                DEFAULT_PALETTE
            );
            self.get(DEFAULT_PALETTE)
        })
    }

    /// List all palette names
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Parse a hex color string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - `RRGGBB` (without #)
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');

    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some([r, g, b])
}
