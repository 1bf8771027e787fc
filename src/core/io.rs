//! Reading and writing raster images.

use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, ImageOutputFormat, RgbImage};
use tempfile::NamedTempFile;

use crate::error::{AppError, Result};

/// Load an image from `path` as 8-bit RGB.
///
/// The format is sniffed from the file contents, so a JPEG saved with a
/// `.png` extension still loads.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    log::debug!("Loading image: {}", path.display());

    if path.is_dir() {
        let err = io::Error::new(io::ErrorKind::InvalidInput, "path is a directory");
        return Err(AppError::load(path, ImageError::IoError(err)));
    }

    let image = image::io::Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| AppError::load(path, ImageError::IoError(e)))?
        .decode()
        .map_err(|e| AppError::load(path, e))?;

    let rgb = image.to_rgb8();
    log::debug!("Loaded {}x{} image", rgb.width(), rgb.height());
    Ok(rgb)
}

/// Pick the encoder for `path` from its extension, defaulting to JPEG.
pub fn output_format(path: &Path, jpeg_quality: u8) -> ImageOutputFormat {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Png) => ImageOutputFormat::Png,
        Ok(ImageFormat::Bmp) => ImageOutputFormat::Bmp,
        Ok(ImageFormat::Tiff) => ImageOutputFormat::Tiff,
        Ok(ImageFormat::Gif) => ImageOutputFormat::Gif,
        Ok(ImageFormat::WebP) => ImageOutputFormat::WebP,
        Ok(ImageFormat::Jpeg) => ImageOutputFormat::Jpeg(jpeg_quality),
        _ => {
            log::warn!("No encoder matches {}, writing JPEG", path.display());
            ImageOutputFormat::Jpeg(jpeg_quality)
        }
    }
}

/// An encoded image waiting in a temporary file next to its destination.
///
/// Dropping it without calling [`StagedImage::commit`] deletes the
/// temporary file, so a failed run never leaves a truncated output behind.
#[derive(Debug)]
pub struct StagedImage {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl StagedImage {
    /// Final destination of the image
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the encoded file into place.
    pub fn commit(self) -> Result<()> {
        let path = self.path;
        self.tmp
            .persist(&path)
            .map_err(|e| AppError::write(&path, ImageError::IoError(e.error)))?;
        log::debug!("Committed {}", path.display());
        Ok(())
    }
}

/// Encode `image` for `path` without touching `path` yet.
pub fn stage_rgb<P: AsRef<Path>>(path: P, image: &RgbImage, jpeg_quality: u8) -> Result<StagedImage> {
    let path = path.as_ref();
    log::debug!("Encoding {}x{} image for {}", image.width(), image.height(), path.display());

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::write(path, ImageError::IoError(e)))?;
    image
        .write_to(&mut tmp, output_format(path, jpeg_quality))
        .map_err(|e| AppError::write(path, e))?;

    Ok(StagedImage {
        tmp,
        path: path.to_path_buf(),
    })
}

/// Commit every staged image, or none of them.
///
/// Images are moved into place in order. If one fails, the ones already
/// committed are removed again before the error is returned.
pub fn commit_all(staged: Vec<StagedImage>) -> Result<()> {
    let mut committed: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for image in staged {
        let path = image.path().to_path_buf();
        if let Err(e) = image.commit() {
            for done in &committed {
                if let Err(cleanup) = std::fs::remove_file(done) {
                    log::warn!("Could not remove {}: {}", done.display(), cleanup);
                }
            }
            return Err(e);
        }
        committed.push(path);
    }
    Ok(())
}

/// Encode `image` to `path`.
pub fn write_rgb<P: AsRef<Path>>(path: P, image: &RgbImage, jpeg_quality: u8) -> Result<()> {
    stage_rgb(path, image, jpeg_quality)?.commit()
}
