#![doc(html_root_url = "https://docs.rs/colorprofile/0.1.0")]
#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

//! # colorprofile
//!
//! Color profiling for photographs of disc-shaped objects such as corks.
//!
//! ## Features
//!
//! - **Circular crop**: Cut a centered square out of the photo and mask it to its inscribed disc
//! - **Edge removal**: Keep only Laplacian edges inside the disc to strip surface texture
//! - **Lab statistics**: Convert to CIE L\*a\*b\* and report mean, median, peak and
//!   standard deviation of each channel's 256-bin histogram
//! - **Typed failures**: Missing inputs, undersized images, empty histograms and
//!   unwritable outputs each surface as a distinct [`AppError`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use colorprofile::{analyze_color_profile, Result};
//!
//! fn main() -> Result<()> {
//!     let report = analyze_color_profile("cork.jpg", "trimmed.jpg", "lab.jpg")?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! The two modes share one pipeline; pick one with [`Mode`] and tune it with
//! [`AnalyzerConfig`]:
//!
//! ```rust,no_run
//! use colorprofile::{process_image, AnalyzerConfig, HistogramRegion, Mode};
//!
//! let config = AnalyzerConfig {
//!     histogram_region: HistogramRegion::Disc,
//!     ..Default::default()
//! };
//! let mode = Mode::LabStatistics {
//!     trimmed_output: "trimmed.png".into(),
//!     processed_output: "lab.png".into(),
//! };
//! let outcome = process_image("cork.jpg", &mode, &config)?;
//! println!("{}", outcome.message());
//! # Ok::<(), colorprofile::AppError>(())
//! ```

use std::path::Path;

/// Analyzer settings and their sources.
pub mod config;
pub mod core;
/// Defines the analyzer's error types and result aliases.
pub mod error;
pub mod models;
mod utils;

#[allow(unreachable_pub, dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

// Public API exports
pub use crate::{
    config::{AnalyzerConfig, HistogramRegion},
    core::{
        crop::CropRegion,
        histogram::{ChannelStats, Histogram},
        pipeline::{Mode, Outcome, EDGE_REMOVAL_STATUS},
    },
    error::{AppError, ErrorKind, Result},
    models::report::ColorReport,
};

/// Initialize logging with default settings
///
/// Honors `RUST_LOG`; defaults to `info`. Calling it more than once is harmless.
///
/// # Example
///
/// ```no_run
/// use colorprofile::init;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     init()?;
///     // Application code here
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    let env = env_logger::Env::default()
        .default_filter_or("info")
        .default_write_style_or("auto");

    let initialized = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .is_ok();

    if initialized {
        log::info!("Initializing colorprofile {}", version());
    }
    Ok(())
}

/// Library version identifier, captured at build time
pub fn version() -> &'static str {
    built_info::PKG_VERSION
}

/// Run the analyzer on the image at `input`
///
/// # Errors
///
/// Returns an error if the input cannot be loaded, the crop does not fit,
/// a histogram is empty, or an output cannot be written. No output file is
/// created when an error is returned before the writing stage.
pub fn process_image<P: AsRef<Path>>(input: P, mode: &Mode, config: &AnalyzerConfig) -> Result<Outcome> {
    let input = input.as_ref();
    log::info!("Processing image: {}", input.display());
    crate::core::pipeline::run(input, mode, config)
}

/// Crop the disc out of `input`, keep only its edges and write the result
/// to `output`.
///
/// Uses the default configuration and returns the fixed status string
/// [`EDGE_REMOVAL_STATUS`].
pub fn remove_edges<P, Q>(input: P, output: Q) -> Result<String>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mode = Mode::EdgeRemoval {
        output: output.as_ref().to_path_buf(),
    };
    Ok(process_image(input, &mode, &AnalyzerConfig::default())?.message())
}

/// Crop `input`, write the crop to `trimmed_output` and its Lab encoding to
/// `processed_output`, and return the Lab histogram statistics.
///
/// Uses the default configuration.
pub fn analyze_color_profile<P, Q, R>(input: P, trimmed_output: Q, processed_output: R) -> Result<ColorReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let mode = Mode::LabStatistics {
        trimmed_output: trimmed_output.as_ref().to_path_buf(),
        processed_output: processed_output.as_ref().to_path_buf(),
    };
    match process_image(input, &mode, &AnalyzerConfig::default())? {
        Outcome::Statistics(report) => Ok(report),
        Outcome::EdgeRemoved { .. } => Err(AppError::InvalidInput(
            "statistics mode produced no report".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_manifest() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_init_twice() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }
}
