//! Centered square crop and the inscribed circular mask.

use image::{imageops, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Mask value marking foreground pixels
pub const MASK_ON: u8 = 255;

/// A square region of interest centered on an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge in source pixels
    pub x: u32,
    /// Top edge in source pixels
    pub y: u32,
    /// Side length of the square
    pub side: u32,
}

impl CropRegion {
    /// Compute the square of side `2 * trim_radius` centered on a
    /// `width` x `height` image.
    ///
    /// The top-left corner is `dim / 2 - trim_radius` on each axis. The
    /// square must lie entirely inside the image.
    pub fn centered(width: u32, height: u32, trim_radius: u32) -> Result<Self> {
        if trim_radius == 0 {
            return Err(AppError::InvalidConfig(
                "trim_radius must be positive".to_string(),
            ));
        }

        let side = trim_radius
            .checked_mul(2)
            .ok_or_else(|| AppError::InvalidConfig(format!("trim_radius {} is too large", trim_radius)))?;
        let out_of_bounds = || AppError::CropOutOfBounds { width, height, side };

        let start = |dim: u32| -> Option<u32> {
            let start = (dim / 2).checked_sub(trim_radius)?;
            (start.checked_add(side)? <= dim).then_some(start)
        };

        let x = start(width).ok_or_else(out_of_bounds)?;
        let y = start(height).ok_or_else(out_of_bounds)?;
        Ok(Self { x, y, side })
    }

    /// Center of the region in source coordinates
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.side / 2, self.y + self.side / 2)
    }
}

/// Crop the centered square of side `2 * trim_radius` out of `image`.
pub fn crop_centered(image: &RgbImage, trim_radius: u32) -> Result<(CropRegion, RgbImage)> {
    let region = CropRegion::centered(image.width(), image.height(), trim_radius)?;
    log::debug!(
        "Cropping {}x{} at ({}, {}) from {}x{}",
        region.side,
        region.side,
        region.x,
        region.y,
        image.width(),
        image.height()
    );

    let cropped = imageops::crop_imm(image, region.x, region.y, region.side, region.side).to_image();
    Ok((region, cropped))
}

/// Build a `side` x `side` mask holding a filled disc of radius `side / 2`
/// centered at `(side / 2, side / 2)`.
pub fn circular_mask(side: u32) -> GrayImage {
    let mut mask = GrayImage::new(side, side);
    let center = (side / 2) as i32;
    draw_filled_circle_mut(&mut mask, (center, center), center, Luma([MASK_ON]));
    mask
}

/// Copy the pixels of `image` where `mask` is non-zero; everything else is black.
pub fn apply_mask(image: &RgbImage, mask: &GrayImage) -> Result<RgbImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(AppError::InvalidInput(format!(
            "mask is {}x{} but image is {}x{}",
            mask.width(),
            mask.height(),
            image.width(),
            image.height()
        )));
    }

    let mut out = RgbImage::new(image.width(), image.height());
    for ((dst, src), m) in out.pixels_mut().zip(image.pixels()).zip(mask.pixels()) {
        if m[0] != 0 {
            *dst = *src;
        } else {
            *dst = Rgb([0, 0, 0]);
        }
    }
    Ok(out)
}
