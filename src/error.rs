use std::path::PathBuf;

use serde::Serialize;

/// Main error type for the analyzer
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The input image is missing or could not be decoded
    #[error("Failed to load image {path}: {source}")]
    Load {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying decoder or I/O failure.
        #[source]
        source: image::ImageError,
    },

    /// The centered crop does not fit inside the image
    #[error("Crop of {side}x{side} px does not fit inside a {width}x{height} image")]
    CropOutOfBounds {
        /// Width of the source image.
        width: u32,
        /// Height of the source image.
        height: u32,
        /// Requested side length of the square crop.
        side: u32,
    },

    /// A histogram had no samples, so its statistics are undefined
    #[error("Histogram for channel {channel} is empty")]
    DegenerateHistogram {
        /// Name of the channel whose histogram was empty.
        channel: &'static str,
    },

    /// An output image could not be encoded or persisted
    #[error("Failed to write image {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying encoder or I/O failure.
        #[source]
        source: image::ImageError,
    },

    /// Analyzer settings are out of range
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors (config files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`AppError`], handy for matching in callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// See [`AppError::Load`].
    Load,
    /// See [`AppError::CropOutOfBounds`].
    CropOutOfBounds,
    /// See [`AppError::DegenerateHistogram`].
    DegenerateHistogram,
    /// See [`AppError::Write`].
    Write,
    /// Configuration or argument problems.
    Invalid,
    /// Anything else (I/O, JSON).
    Other,
}

/// Standard error payload for machine-readable output
#[derive(Serialize)]
#[derive(Debug)]
pub struct ErrorResponse {
    /// Error classification
    pub kind: ErrorKind,
    /// Error message
    pub message: String,
}

impl AppError {
    /// Create a load error for `path`
    pub fn load(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Load {
            path: path.into(),
            source,
        }
    }

    /// Create a write error for `path`
    pub fn write(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load { .. } => ErrorKind::Load,
            Self::CropOutOfBounds { .. } => ErrorKind::CropOutOfBounds,
            Self::DegenerateHistogram { .. } => ErrorKind::DegenerateHistogram,
            Self::Write { .. } => ErrorKind::Write,
            Self::InvalidConfig(_) | Self::InvalidInput(_) => ErrorKind::Invalid,
            Self::Io(_) | Self::Json(_) => ErrorKind::Other,
        }
    }

    /// Convert the error to a JSON-serializable payload
    pub fn to_json(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Result type alias for the analyzer
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = AppError::CropOutOfBounds {
            width: 10,
            height: 10,
            side: 128,
        };
        assert_eq!(err.kind(), ErrorKind::CropOutOfBounds);
        assert!(err.to_string().contains("128x128"));

        let err = AppError::DegenerateHistogram { channel: "L" };
        assert_eq!(err.kind(), ErrorKind::DegenerateHistogram);

        let err = AppError::InvalidConfig("bad".to_string());
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_error_response() {
        let err = AppError::DegenerateHistogram { channel: "a" };
        let json = serde_json::to_value(err.to_json()).unwrap();
        assert_eq!(json["kind"], "DegenerateHistogram");
        assert_eq!(json["message"], "Histogram for channel a is empty");
    }
}
