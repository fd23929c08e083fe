//! TOML configuration for dataset locations and query options.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::{Frame, DEFAULT_QUADRANT_SEGMENTS};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub datasets: DatasetConfig,
    pub regions: RegionSourceConfig,
    pub demographics: DemographicSourceConfig,
    pub buffer: BufferConfig,
    pub area: AreaConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    pub regions: PathBuf,
    pub demographics: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            regions: PathBuf::from("data.geojson"),
            demographics: PathBuf::from("POSAS_2022_it_Comuni.csv"),
        }
    }
}

/// Feature property names in the region GeoJSON.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RegionSourceConfig {
    pub code_property: String,
    pub name_property: String,
}

impl Default for RegionSourceConfig {
    fn default() -> Self {
        Self {
            code_property: "com_istat_code_num".to_string(),
            name_property: "name".to_string(),
        }
    }
}

/// Text encoding of the demographic CSV.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// ISO-8859-1, as exported by the statistics office
    #[default]
    #[serde(alias = "iso-8859-1")]
    Latin1,
    #[serde(alias = "utf-8")]
    Utf8,
}

/// Layout of the demographic CSV.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DemographicSourceConfig {
    pub delimiter: char,
    pub encoding: TextEncoding,
    /// Lines to drop before the header row (title banners)
    pub skip_lines: usize,
    pub code_column: String,
    pub age_column: String,
    pub male_column: String,
    pub female_column: String,
}

impl Default for DemographicSourceConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            encoding: TextEncoding::Latin1,
            skip_lines: 0,
            code_column: "Codice comune".to_string(),
            age_column: "Età".to_string(),
            male_column: "Totale maschi".to_string(),
            female_column: "Totale femmine".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BufferConfig {
    pub quadrant_segments: u32,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            quadrant_segments: DEFAULT_QUADRANT_SEGMENTS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AreaConfig {
    /// Frame in which covered-area ratios are measured
    pub ratio_frame: Frame,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            ratio_frame: Frame::Geodetic,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
