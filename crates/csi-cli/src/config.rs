//! Pipeline settings loaded from an optional TOML file.
//!
//! Every section and field has a default, so a partial file (or none at
//! all) reproduces the standard residential analysis:
//!
//! ```toml
//! [filter]
//! sector = "Residential"
//! app_status = "Completed"
//! inst_status = "Installed"
//!
//! [trim]
//! quantile = 0.99
//! last_year = 2016
//!
//! [render]
//! dpi = 300
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csi_core::CsiError;
use csi_stats::FilterCriteria;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub filter: FilterCriteria,
    pub trim: TrimConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Rows above this quantile of nameplate or total cost are dropped.
    pub quantile: f64,
    /// Last installation year in the by-year chart.
    pub last_year: i64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            quantile: 0.99,
            last_year: 2016,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub dpi: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: csi_viz::theme::DEFAULT_DPI,
        }
    }
}

impl PipelineConfig {
    /// Defaults when `path` is `None`, otherwise the parsed file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(CsiError::from)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| CsiError::Config(e.to_string()))
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let q = self.trim.quantile;
        if !(q > 0.0 && q <= 1.0) {
            return Err(CsiError::Config(format!("trim.quantile must be in (0, 1], got {q}")).into());
        }
        if self.render.dpi == 0 {
            return Err(CsiError::Config("render.dpi must be positive".into()).into());
        }
        Ok(())
    }
}
