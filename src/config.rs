//! Analyzer settings.
//!
//! The defaults reproduce the constants the analysis was tuned with: a
//! 64 px trim radius (a 128 px crop, one fifth of a 640 px preview), a
//! 5-tap Laplacian whose response is scaled by 256, and histogram
//! statistics over the whole square crop.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Default trim radius in pixels (640 / 5 / 2)
pub const DEFAULT_TRIM_RADIUS: u32 = 640 / 5 / 2;

/// Default Laplacian aperture
pub const DEFAULT_LAPLACIAN_APERTURE: u32 = 5;

/// Default JPEG quality for written images
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Which pixels of the crop feed the Lab histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramRegion {
    /// The whole square crop, corners included
    #[default]
    FullCrop,
    /// Only the disc inscribed in the crop
    Disc,
}

impl std::str::FromStr for HistogramRegion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "full_crop" | "square" => Ok(Self::FullCrop),
            "disc" | "circle" => Ok(Self::Disc),
            other => Err(AppError::InvalidConfig(format!(
                "unknown histogram region '{}'",
                other
            ))),
        }
    }
}

/// Configuration for the analyzer pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Half the side of the centered square crop, in pixels
    pub trim_radius: u32,
    /// Aperture of the Laplacian used for edge removal (1, 3, 5 or 7)
    pub laplacian_aperture: u32,
    /// Multiplier applied to the Laplacian response before saturating to 8 bits
    pub edge_scale: f32,
    /// Offset added after scaling
    pub edge_shift: f32,
    /// Pixels considered by the histogram statistics
    pub histogram_region: HistogramRegion,
    /// Quality used when an output is JPEG encoded
    pub jpeg_quality: u8,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            trim_radius: DEFAULT_TRIM_RADIUS,
            laplacian_aperture: DEFAULT_LAPLACIAN_APERTURE,
            edge_scale: 256.0,
            edge_shift: 0.0,
            histogram_region: HistogramRegion::FullCrop,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl AnalyzerConfig {
    /// Side length of the square crop, `None` if it overflows
    pub fn crop_side(&self) -> Option<u32> {
        self.trim_radius.checked_mul(2)
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from `COLORPROFILE_*` environment variables,
    /// loading a `.env` file first if one is present.
    #[cfg(feature = "env-config")]
    pub fn from_env() -> Result<Self> {
        // A missing .env file is not an error
        if let Ok(path) = dotenv::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }

        let mut config = Self::default();
        if let Some(v) = env_var("COLORPROFILE_TRIM_RADIUS") {
            config.trim_radius = parse_env("COLORPROFILE_TRIM_RADIUS", &v)?;
        }
        if let Some(v) = env_var("COLORPROFILE_LAPLACIAN_APERTURE") {
            config.laplacian_aperture = parse_env("COLORPROFILE_LAPLACIAN_APERTURE", &v)?;
        }
        if let Some(v) = env_var("COLORPROFILE_EDGE_SCALE") {
            config.edge_scale = parse_env("COLORPROFILE_EDGE_SCALE", &v)?;
        }
        if let Some(v) = env_var("COLORPROFILE_EDGE_SHIFT") {
            config.edge_shift = parse_env("COLORPROFILE_EDGE_SHIFT", &v)?;
        }
        if let Some(v) = env_var("COLORPROFILE_HISTOGRAM_REGION") {
            config.histogram_region = v.parse()?;
        }
        if let Some(v) = env_var("COLORPROFILE_JPEG_QUALITY") {
            config.jpeg_quality = parse_env("COLORPROFILE_JPEG_QUALITY", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<()> {
        if self.trim_radius == 0 {
            return Err(AppError::InvalidConfig(
                "trim_radius must be positive".to_string(),
            ));
        }
        if self.crop_side().is_none() {
            return Err(AppError::InvalidConfig(format!(
                "trim_radius {} is too large",
                self.trim_radius
            )));
        }
        if !matches!(self.laplacian_aperture, 1 | 3 | 5 | 7) {
            return Err(AppError::InvalidConfig(format!(
                "laplacian_aperture must be 1, 3, 5 or 7, got {}",
                self.laplacian_aperture
            )));
        }
        if !self.edge_scale.is_finite() || !self.edge_shift.is_finite() {
            return Err(AppError::InvalidConfig(
                "edge_scale and edge_shift must be finite".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AppError::InvalidConfig(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "env-config")]
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(feature = "env-config")]
fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::InvalidConfig(format!("{}={}: {}", key, value, e)))
}
