use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::stats::MAX_BINS;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "SALARY_LENS_CONFIG";

/// Upper bound on density curve evaluation points.
pub const MAX_KDE_POINTS: usize = 2000;

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fixed histogram bin count; `None` picks one from the data.
    pub histogram_bins: Option<usize>,
    /// Draw the density curve over each histogram.
    pub show_kde: bool,
    /// Evaluation points of each density curve.
    pub kde_grid_points: usize,
    /// Opacity of scatter markers (0..=1).
    pub scatter_alpha: f32,
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            histogram_bins: None,
            show_kde: true,
            kde_grid_points: 200,
            scatter_alpha: 0.7,
            window_size: [1200.0, 800.0],
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: AppConfig = serde_json::from_str(text).context("parsing config JSON")?;
        config.scatter_alpha = config.scatter_alpha.clamp(0.0, 1.0);
        config.kde_grid_points = config.kde_grid_points.clamp(2, MAX_KDE_POINTS);
        config.histogram_bins = config.histogram_bins.map(|b| b.clamp(1, MAX_BINS));
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Config from `$SALARY_LENS_CONFIG`, falling back to defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(Path::new(&path)) {
            Ok(config) => {
                log::info!("Loaded config from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = AppConfig::from_json(r#"{ "histogram_bins": 12 }"#).unwrap();
        assert_eq!(config.histogram_bins, Some(12));
        assert!(config.show_kde);
        assert_eq!(config.kde_grid_points, 200);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = AppConfig::from_json(r#"{ "scatter_alpha": 3.0, "kde_grid_points": 0 }"#).unwrap();
        assert_eq!(config.scatter_alpha, 1.0);
        assert_eq!(config.kde_grid_points, 2);

        let config =
            AppConfig::from_json(r#"{ "histogram_bins": 50000000, "kde_grid_points": 90000000 }"#).unwrap();
        assert_eq!(config.histogram_bins, Some(MAX_BINS));
        assert_eq!(config.kde_grid_points, MAX_KDE_POINTS);
        assert_eq!(AppConfig::from_json(r#"{ "histogram_bins": 0 }"#).unwrap().histogram_bins, Some(1));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
