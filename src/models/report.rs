use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::HistogramRegion;
use crate::core::crop::CropRegion;
use crate::core::histogram::ChannelStats;
use crate::core::lab::LAB_CHANNELS;

/// Lab histogram statistics for one analyzed image.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColorReport {
    /// When the analysis ran (RFC 3339 format).
    pub analyzed_at: String,
    /// The square that was cut out of the source image.
    pub crop: CropRegion,
    /// Which pixels of the crop were counted.
    pub histogram_region: HistogramRegion,
    /// Number of pixels counted per channel.
    pub samples: u64,
    /// Statistics for the L, a and b channels, in that order.
    pub channels: [ChannelStats; 3],
}

impl ColorReport {
    /// Creates a report stamped with the current time.
    pub fn new(
        crop: CropRegion,
        histogram_region: HistogramRegion,
        samples: u64,
        channels: [ChannelStats; 3],
    ) -> Self {
        Self {
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            crop,
            histogram_region,
            samples,
            channels,
        }
    }

    /// Statistics of the lightness channel.
    pub fn lightness(&self) -> &ChannelStats {
        &self.channels[0]
    }

    /// Serializes the report to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a `ColorReport` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }
}

impl fmt::Display for ColorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match self.histogram_region {
            HistogramRegion::FullCrop => "full crop",
            HistogramRegion::Disc => "disc",
        };
        writeln!(
            f,
            "Lab profile of {}x{} crop ({}, {} px)",
            self.crop.side, self.crop.side, region, self.samples
        )?;
        for (name, stats) in LAB_CHANNELS.iter().zip(&self.channels) {
            writeln!(
                f,
                "{}: mean {:.1}, median {:.1}, peak {:.1}, std-dev {:.1}",
                name,
                stats.mean,
                f64::from(stats.median),
                f64::from(stats.peak),
                stats.std_dev
            )?;
        }
        Ok(())
    }
}
