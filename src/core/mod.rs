//! Core image processing stages

/// Centered square crop and circular masking.
pub mod crop;
/// Laplacian edge map and edge-based filtering.
pub mod edges;
/// Per-channel histograms and their statistics.
pub mod histogram;
/// Loading and writing raster images.
pub mod io;
/// sRGB to CIE Lab conversion.
pub mod lab;
/// The end-to-end analyzer pipeline.
pub mod pipeline;
