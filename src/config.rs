use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

pub const EDUCATION_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/for_user_education.json";
pub const COUNTIES_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/counties.json";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    /// URL or file path of the education records.
    pub education: String,
    /// URL or file path of the county topology.
    pub counties: String,
    /// Name of the topology object holding the county geometries.
    pub topology_object: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            education: EDUCATION_URL.to_string(),
            counties: COUNTIES_URL.to_string(),
            topology_object: "counties".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    /// Decimal digits kept in SVG path coordinates.
    pub precision: u8,
    pub title: String,
    pub description: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 600,
            precision: 3,
            title: "United States Educational Attainment".to_string(),
            description: "Percentage of adults age 25 and older with a bachelor's degree or higher (2010-2014)"
                .to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LegendConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self { width: 200.0, height: 10.0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TooltipConfig {
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self { offset_x: 10, offset_y: 8 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub geojson: bool,
    pub png: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("output"), geojson: true, png: false }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise falls back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.map.width, 960);
        assert_eq!(config.map.height, 600);
        assert_eq!(config.input.topology_object, "counties");
        assert_eq!(config.input.education, EDUCATION_URL);
        assert_eq!(config.tooltip.offset_x, 10);
        assert!(config.output.geojson);
        assert!(!config.output.png);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            education = "data/education.json"

            [output]
            png = true
            "#,
        )
        .unwrap();
        assert_eq!(config.input.education, "data/education.json");
        assert_eq!(config.input.counties, COUNTIES_URL);
        assert!(config.output.png);
        assert_eq!(config.output.dir, PathBuf::from("output"));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config: AppConfig = toml::from_str(include_str!("../config.toml")).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.input.counties, defaults.input.counties);
        assert_eq!(config.map.precision, defaults.map.precision);
        assert_eq!(config.legend.width, defaults.legend.width);
        assert_eq!(config.server.port, defaults.server.port);
    }

    #[test]
    fn load_from_missing_file_fails() {
        let err = AppConfig::load_from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
