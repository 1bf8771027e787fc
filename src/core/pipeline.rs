//! Crop, mask and analyze in one pass.
//!
//! Both modes share loading, the centered crop and the circular mask. Every
//! output is encoded only once all computation has succeeded.

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::config::{AnalyzerConfig, HistogramRegion};
use crate::core::crop::{apply_mask, circular_mask, crop_centered};
use crate::core::edges::remove_flat_regions;
use crate::core::histogram::channel_histograms;
use crate::core::io::{commit_all, load_rgb, stage_rgb, write_rgb};
use crate::core::lab::{rgb_to_lab, LAB_CHANNELS};
use crate::error::Result;
use crate::models::report::ColorReport;
use crate::utils::{validate_distinct, validate_output_path};

/// Status returned once the edge-filtered image has been written
pub const EDGE_REMOVAL_STATUS: &str = "edge-filtered image written";

/// What to do after cropping, and where to put the results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Keep only Laplacian edges inside the disc and write the result
    EdgeRemoval {
        /// Destination of the filtered image
        output: PathBuf,
    },
    /// Convert to Lab and report histogram statistics
    LabStatistics {
        /// Destination of the square sRGB crop
        trimmed_output: PathBuf,
        /// Destination of the Lab-encoded crop
        processed_output: PathBuf,
    },
}

impl Mode {
    fn outputs(&self) -> Vec<&Path> {
        match self {
            Self::EdgeRemoval { output } => vec![output.as_path()],
            Self::LabStatistics {
                trimmed_output,
                processed_output,
            } => vec![trimmed_output.as_path(), processed_output.as_path()],
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The filtered image was written to `output`
    EdgeRemoved {
        /// Where the image went
        output: PathBuf,
    },
    /// Lab statistics of the crop
    Statistics(ColorReport),
}

impl Outcome {
    /// Text handed back to the caller: the fixed status or the formatted report
    pub fn message(&self) -> String {
        match self {
            Self::EdgeRemoved { .. } => EDGE_REMOVAL_STATUS.to_string(),
            Self::Statistics(report) => report.to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EdgeRemoved { output } => {
                write!(f, "{}: {}", EDGE_REMOVAL_STATUS, output.display())
            }
            Self::Statistics(report) => write!(f, "{}", report),
        }
    }
}

/// Crop, mask and edge-filter `image` in memory.
pub fn edge_removal_image(image: &RgbImage, config: &AnalyzerConfig) -> Result<RgbImage> {
    config.validate()?;
    let (_, crop) = crop_centered(image, config.trim_radius)?;
    let masked = apply_mask(&crop, &circular_mask(crop.width()))?;
    remove_flat_regions(
        &crop,
        &masked,
        config.laplacian_aperture,
        config.edge_scale,
        config.edge_shift,
    )
}

/// Lab analysis of `image` in memory.
///
/// Returns the square crop, its Lab encoding and the statistics report.
pub fn lab_statistics(image: &RgbImage, config: &AnalyzerConfig) -> Result<(RgbImage, RgbImage, ColorReport)> {
    config.validate()?;
    let (region, crop) = crop_centered(image, config.trim_radius)?;
    let lab = rgb_to_lab(&crop);

    let mask = match config.histogram_region {
        HistogramRegion::FullCrop => None,
        HistogramRegion::Disc => Some(circular_mask(crop.width())),
    };
    let [l, a, b] = channel_histograms(&lab, mask.as_ref())?;
    let samples = l.total();

    let channels = [
        l.stats(LAB_CHANNELS[0])?,
        a.stats(LAB_CHANNELS[1])?,
        b.stats(LAB_CHANNELS[2])?,
    ];
    log::debug!(
        "Lab means over {} px: L {:.1}, a {:.1}, b {:.1}",
        samples,
        channels[0].mean,
        channels[1].mean,
        channels[2].mean
    );

    let report = ColorReport::new(region, config.histogram_region, samples, channels);
    Ok((crop, lab, report))
}

/// Run the pipeline on the image at `input`.
pub fn run(input: &Path, mode: &Mode, config: &AnalyzerConfig) -> Result<Outcome> {
    let outputs = mode.outputs();
    for output in &outputs {
        validate_output_path(output)?;
    }
    validate_distinct(input, &outputs)?;
    config.validate()?;

    let image = load_rgb(input)?;

    match mode {
        Mode::EdgeRemoval { output } => {
            let filtered = edge_removal_image(&image, config)?;
            write_rgb(output, &filtered, config.jpeg_quality)?;
            log::info!("Wrote edge-filtered image to {}", output.display());
            Ok(Outcome::EdgeRemoved {
                output: output.clone(),
            })
        }
        Mode::LabStatistics {
            trimmed_output,
            processed_output,
        } => {
            let (crop, lab, report) = lab_statistics(&image, config)?;
            let trimmed = stage_rgb(trimmed_output, &crop, config.jpeg_quality)?;
            let processed = stage_rgb(processed_output, &lab, config.jpeg_quality)?;
            commit_all(vec![trimmed, processed])?;
            log::info!(
                "Wrote crop to {} and Lab image to {}",
                trimmed_output.display(),
                processed_output.display()
            );
            Ok(Outcome::Statistics(report))
        }
    }
}
