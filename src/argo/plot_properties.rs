//! Display setting definitions with defaults from plot_settings.json
//!
//! plot_settings.json is embedded at compile time and is the single place
//! where setting names, kinds, valid values and defaults are defined.
//! User values come from a flat JSON object (`{"mapping": "toolbox"}`) and
//! are validated against these definitions.

use super::error::{PlotError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// plot_settings.json embedded at compile time
const PLOT_SETTINGS_JSON: &str = include_str!("../../plot_settings.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringProperty")]
    String,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
}

/// Property definition from plot_settings.json
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(rename = "defaultValue", default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    /// For EnumeratedProperty, the valid values
    #[serde(rename = "values")]
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    properties: Vec<PropertyDef>,
}

/// Registry of all display settings with their defaults
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a settings definition document
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SettingsFile = serde_json::from_str(json)
            .map_err(|e| PlotError::Settings(format!("Invalid settings definitions: {}", e)))?;

        let properties = file
            .properties
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();

        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(PLOT_SETTINGS_JSON).unwrap_or_else(|e| {
            tracing::error!("{}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed settings reader
///
/// Returns user values when set and valid, otherwise the defaults from
/// plot_settings.json.
#[derive(Debug, Clone, Default)]
pub struct SettingsReader {
    user_values: HashMap<String, String>,
}

impl SettingsReader {
    pub fn new(user_values: HashMap<String, String>) -> Self {
        let user_values = user_values
            .into_iter()
            .filter(|(_, v)| !v.is_empty()) // Empty = not set
            .collect();
        Self { user_values }
    }

    /// Parse user values from a flat JSON object
    ///
    /// Strings, numbers and booleans are accepted; other values are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| PlotError::Settings(format!("Failed to parse settings: {}", e)))?;

        let mut user_values = HashMap::new();
        for (key, value) in map {
            let value_str = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => {
                    tracing::warn!("Ignoring non-scalar value for setting '{}'", key);
                    continue;
                }
            };
            if registry().get_property(&key).is_none() {
                tracing::warn!("Unknown setting '{}'", key);
            }
            user_values.insert(key, value_str);
        }

        Ok(Self::new(user_values))
    }

    /// Read user values from a JSON settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Self::from_json(&json)
    }

    /// Get string property (user value or default)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }

        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get enumerated property with validation
    ///
    /// Returns the user-set value (lowercased) if valid, otherwise the default.
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.to_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            tracing::warn!(
                "Invalid value '{}' for setting '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_string()
    }

    /// Get optional string property (None if empty)
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        let value = self.get_string(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Get f64 property, invalid values fall back to the default
    pub fn get_f64(&self, name: &str) -> f64 {
        let value = self.get_string(name);
        let default = registry()
            .get_default(name)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        if value.is_empty() {
            return default;
        }

        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                tracing::warn!(
                    "Invalid numeric value '{}' for setting '{}'. Using default: {}",
                    value,
                    name,
                    default
                );
                default
            }
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        let default = registry()
            .get_default(name)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        if (min..=max).contains(&value) {
            value
        } else {
            tracing::warn!(
                "Value {} for setting '{}' out of range [{}, {}]. Using default: {}",
                value,
                name,
                min,
                max,
                default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("mapping").is_some());
        assert!(reg.get_property("legend.position").is_some());
        assert_eq!(
            reg.get_property("basemap").map(|p| p.kind),
            Some(PropertyKind::Enumerated)
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("mapping"), Some("native"));
        assert_eq!(reg.get_default("colormap"), Some("Parula"));
        assert_eq!(reg.get_default("single.float.color"), Some("#0000FF"));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("mapping", "toolbox"));
        assert!(reg.is_valid_enum_value("mapping", "PLAIN"));
        assert!(!reg.is_valid_enum_value("mapping", "gpu"));
        assert!(reg.is_valid_enum_value("colormap", "anything"));
    }

    #[test]
    fn test_reader_defaults() {
        let reader = SettingsReader::default();
        assert_eq!(reader.get_enum("mapping"), "native");
        assert_eq!(reader.get_f64("point.size"), 3.0);
        assert_eq!(reader.get_optional_string("coastline.file"), None);
    }

    #[test]
    fn test_reader_user_values_and_fallbacks() {
        let reader = SettingsReader::from_json(
            r#"{"mapping": "Toolbox", "legend.position": "middle", "point.size": 50, "line.width": "x"}"#,
        )
        .unwrap();
        assert_eq!(reader.get_enum("mapping"), "toolbox");
        assert_eq!(reader.get_enum("legend.position"), "upper-right");
        assert_eq!(reader.get_f64_in_range("point.size", 0.5, 20.0), 3.0);
        assert_eq!(reader.get_f64("line.width"), 1.0);
    }

    #[test]
    fn test_reader_rejects_invalid_json() {
        assert!(SettingsReader::from_json("[1, 2]").is_err());
    }
}
