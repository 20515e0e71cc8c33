use crate::data::MapSources;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "urban-atlas.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the dataset file names below are relative to
    pub data_dir: PathBuf,
    pub world: WorldConfig,
    pub us: UsConfig,
    pub playback: PlaybackConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// TopoJSON topology, or a GeoJSON FeatureCollection
    pub boundaries: PathBuf,
    /// Topology object holding the country features
    pub object: String,
    pub stats: PathBuf,
    pub crosswalk: PathBuf,
    pub initial_year: i32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UsConfig {
    pub boundaries: PathBuf,
    pub object: String,
    pub stats: PathBuf,
    pub initial_year: i32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
    /// Default filter directive; `URBAN_ATLAS_LOG` overrides it
    pub filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            world: WorldConfig::default(),
            us: UsConfig::default(),
            playback: PlaybackConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            boundaries: PathBuf::from("countries-50m.json"),
            object: "countries".to_string(),
            stats: PathBuf::from("urban_pop_growth_annual_percentage.csv"),
            crosswalk: PathBuf::from("iso_numeric_to_alpha3.json"),
            initial_year: 1961,
        }
    }
}

impl Default for UsConfig {
    fn default() -> Self {
        Self {
            boundaries: PathBuf::from("states-10m.json"),
            object: "states".to_string(),
            stats: PathBuf::from("urban_data.csv"),
            initial_year: 1970,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("urban-atlas.log"),
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML configuration: {:?}", path))?;
        Ok(config)
    }

    /// An explicit path must load; otherwise use the default file if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn playback_interval(&self) -> Duration {
        Duration::from_millis(self.playback.interval_ms.max(1))
    }

    pub fn world_sources(&self) -> MapSources {
        MapSources::World {
            boundaries: self.data_dir.join(&self.world.boundaries),
            object: self.world.object.clone(),
            stats: self.data_dir.join(&self.world.stats),
            crosswalk: self.data_dir.join(&self.world.crosswalk),
        }
    }

    pub fn us_sources(&self) -> MapSources {
        MapSources::Us {
            boundaries: self.data_dir.join(&self.us.boundaries),
            object: self.us.object.clone(),
            stats: self.data_dir.join(&self.us.stats),
        }
    }
}
