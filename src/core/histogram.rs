//! 256-bin channel histograms and their summary statistics.

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Number of bins in an 8-bit histogram
pub const BINS: usize = 256;

/// Summary statistics of one channel histogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Count-weighted mean bin value
    pub mean: f64,
    /// Smallest bin at which the cumulative count reaches half the total
    pub median: u8,
    /// Most populated bin (lowest index on ties)
    pub peak: u8,
    /// Number of samples in the peak bin
    pub peak_count: u64,
    /// Population standard deviation of the bin values
    pub std_dev: f64,
}

/// 256-bin histogram of one 8-bit channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; BINS],
    total: u64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            bins: [0; BINS],
            total: 0,
        }
    }
}

impl Histogram {
    /// Build a histogram from raw bin counts.
    pub fn from_bins(bins: [u64; BINS]) -> Self {
        let total = bins.iter().sum();
        Self { bins, total }
    }

    /// Count channel `channel` of `image`, restricted to pixels where `mask`
    /// is non-zero when a mask is given.
    pub fn from_channel(image: &RgbImage, channel: usize, mask: Option<&GrayImage>) -> Result<Self> {
        if channel > 2 {
            return Err(AppError::InvalidInput(format!("no channel {} in an RGB image", channel)));
        }
        if let Some(mask) = mask {
            if mask.dimensions() != image.dimensions() {
                return Err(AppError::InvalidInput(format!(
                    "mask is {}x{} but image is {}x{}",
                    mask.width(),
                    mask.height(),
                    image.width(),
                    image.height()
                )));
            }
        }

        let mut hist = Self::default();
        match mask {
            Some(mask) => {
                for (p, m) in image.pixels().zip(mask.pixels()) {
                    if m[0] != 0 {
                        hist.add(p[channel]);
                    }
                }
            }
            None => {
                for p in image.pixels() {
                    hist.add(p[channel]);
                }
            }
        }
        Ok(hist)
    }

    fn add(&mut self, value: u8) {
        self.bins[usize::from(value)] += 1;
        self.total += 1;
    }

    /// Bin counts
    pub fn bins(&self) -> &[u64; BINS] {
        &self.bins
    }

    /// Returns the total sample count.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Compute mean, median, peak and standard deviation.
    ///
    /// `channel` only labels the error returned for an empty histogram.
    pub fn stats(&self, channel: &'static str) -> Result<ChannelStats> {
        if self.total == 0 {
            return Err(AppError::DegenerateHistogram { channel });
        }
        let total = self.total as f64;

        let sum: f64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| i as f64 * count as f64)
            .sum();
        let mean = sum / total;

        let variance = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let diff = i as f64 - mean;
                diff * diff * count as f64
            })
            .sum::<f64>()
            / total;

        // max_by_key keeps the last maximum, so scan in reverse for the first
        let (peak, peak_count) = self
            .bins
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|&(_, &count)| count)
            .map(|(i, &count)| (i, count))
            .unwrap_or((0, 0));

        let mut cumulative = 0u64;
        let mut median = BINS - 1;
        for (i, &count) in self.bins.iter().enumerate() {
            cumulative += count;
            if 2 * cumulative >= self.total {
                median = i;
                break;
            }
        }

        Ok(ChannelStats {
            mean,
            median: median as u8,
            peak: peak as u8,
            peak_count,
            std_dev: variance.sqrt(),
        })
    }
}

/// Histograms of the three channels of an image
pub fn channel_histograms(image: &RgbImage, mask: Option<&GrayImage>) -> Result<[Histogram; 3]> {
    Ok([
        Histogram::from_channel(image, 0, mask)?,
        Histogram::from_channel(image, 1, mask)?,
        Histogram::from_channel(image, 2, mask)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_solid_channel() {
        let img = RgbImage::from_pixel(16, 16, Rgb([42, 0, 255]));
        let hist = Histogram::from_channel(&img, 0, None).unwrap();
        let stats = hist.stats("L").unwrap();

        assert_eq!(hist.total(), 256);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.peak, 42);
        assert_eq!(stats.peak_count, 256);
        assert_eq!(stats.median, 42);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_bimodal_median_is_low_mode() {
        let mut bins = [0u64; BINS];
        bins[0] = 50;
        bins[255] = 50;
        let stats = Histogram::from_bins(bins).stats("a").unwrap();

        assert_eq!(stats.median, 0);
        assert_eq!(stats.mean, 127.5);
        assert_eq!(stats.std_dev, 127.5);
        // Tie resolves to the lowest bin
        assert_eq!(stats.peak, 0);
    }

    #[test]
    fn test_median_odd_total() {
        let mut bins = [0u64; BINS];
        bins[10] = 1;
        bins[20] = 1;
        bins[30] = 1;
        let stats = Histogram::from_bins(bins).stats("b").unwrap();
        assert_eq!(stats.median, 20);
        assert_eq!(stats.mean, 20.0);
    }

    #[test]
    fn test_peak_is_bin_index() {
        let mut bins = [0u64; BINS];
        bins[3] = 5;
        bins[200] = 9;
        let stats = Histogram::from_bins(bins).stats("L").unwrap();
        assert_eq!(stats.peak, 200);
        assert_eq!(stats.peak_count, 9);
    }

    #[test]
    fn test_empty_histogram_is_degenerate() {
        let err = Histogram::default().stats("a").unwrap_err();
        assert!(matches!(err, AppError::DegenerateHistogram { channel: "a" }));
    }

    #[test]
    fn test_mask_restricts_samples() {
        let img = RgbImage::from_fn(4, 1, |x, _| Rgb([x as u8 * 10, 0, 0]));
        let mask = GrayImage::from_fn(4, 1, |x, _| Luma([if x < 2 { 255 } else { 0 }]));

        let hist = Histogram::from_channel(&img, 0, Some(&mask)).unwrap();
        assert_eq!(hist.total(), 2);
        assert_eq!(hist.bins()[0], 1);
        assert_eq!(hist.bins()[10], 1);
        assert_eq!(hist.bins()[20], 0);

        let empty = GrayImage::new(4, 1);
        let hist = Histogram::from_channel(&img, 0, Some(&empty)).unwrap();
        assert!(hist.stats("L").is_err());
    }

    #[test]
    fn test_bad_channel() {
        let img = RgbImage::new(1, 1);
        assert!(Histogram::from_channel(&img, 3, None).is_err());
    }
}
