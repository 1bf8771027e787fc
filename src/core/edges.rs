//! Laplacian edge map used to strip the cork texture from the disc.
//!
//! The second derivative is computed as the sum of two separable passes,
//! `d2/dx2 (smoothed in y) + d2/dy2 (smoothed in x)`, with binomial
//! smoothing sized to the aperture and reflect-101 borders
//! (`dcb|abcd|cba`).

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::map::map_colors;

use crate::core::crop::apply_mask;
use crate::error::{AppError, Result};

/// Single channel `f32` image holding signed edge responses
pub type EdgeMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Convert to 8-bit luma with ITU-R BT.601 weights.
pub fn to_gray(image: &RgbImage) -> GrayImage {
    // 0.299, 0.587 and 0.114 in 14-bit fixed point
    map_colors(image, |p: Rgb<u8>| {
        let [r, g, b] = p.0;
        let y = (u32::from(r) * 4899 + u32::from(g) * 9617 + u32::from(b) * 1868 + (1 << 13)) >> 14;
        Luma([y.min(255) as u8])
    })
}

static D2_3: [f32; 3] = [1.0, -2.0, 1.0];
static D2_5: [f32; 5] = [1.0, 0.0, -2.0, 0.0, 1.0];
static D2_7: [f32; 7] = [1.0, 2.0, -1.0, -4.0, -1.0, 2.0, 1.0];
static SMOOTH_1: [f32; 3] = [0.0, 1.0, 0.0];
static SMOOTH_3: [f32; 3] = [1.0, 2.0, 1.0];
static SMOOTH_5: [f32; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];
static SMOOTH_7: [f32; 7] = [1.0, 6.0, 15.0, 20.0, 15.0, 6.0, 1.0];

/// Second-derivative and smoothing taps for an aperture.
fn kernels(aperture: u32) -> Result<(&'static [f32], &'static [f32])> {
    match aperture {
        1 => Ok((&D2_3[..], &SMOOTH_1[..])),
        3 => Ok((&D2_3[..], &SMOOTH_3[..])),
        5 => Ok((&D2_5[..], &SMOOTH_5[..])),
        7 => Ok((&D2_7[..], &SMOOTH_7[..])),
        other => Err(AppError::InvalidConfig(format!(
            "unsupported Laplacian aperture {}",
            other
        ))),
    }
}

fn reflect101(i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    let mut i = i;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * (n - 1) - i;
        }
    }
    i as usize
}

/// Correlate every row (`horizontal`) or column with `taps`.
fn filter_axis(src: &[f32], width: usize, height: usize, taps: &[f32], horizontal: bool) -> Vec<f32> {
    let radius = (taps.len() / 2) as i64;
    let mut out = vec![0.0f32; src.len()];

    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, &t) in taps.iter().enumerate() {
                if t == 0.0 {
                    continue;
                }
                let offset = k as i64 - radius;
                let idx = if horizontal {
                    y * width + reflect101(x as i64 + offset, width as i64)
                } else {
                    reflect101(y as i64 + offset, height as i64) * width + x
                };
                acc += t * src[idx];
            }
            out[y * width + x] = acc;
        }
    }
    out
}

/// Laplacian of `gray` with the given aperture (1, 3, 5 or 7).
pub fn laplacian(gray: &GrayImage, aperture: u32) -> Result<EdgeMap> {
    let (d2, smooth) = kernels(aperture)?;
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    let src: Vec<f32> = gray.as_raw().iter().map(|&v| f32::from(v)).collect();

    let dxx = filter_axis(&filter_axis(&src, w, h, d2, true), w, h, smooth, false);
    let dyy = filter_axis(&filter_axis(&src, w, h, smooth, true), w, h, d2, false);
    let data: Vec<f32> = dxx.iter().zip(&dyy).map(|(a, b)| a + b).collect();

    ImageBuffer::from_raw(width, height, data)
        .ok_or_else(|| AppError::InvalidInput("edge map buffer size mismatch".to_string()))
}

/// Map edge responses to 8 bits as `saturate(round(v * scale + shift))`.
pub fn rescale_to_u8(edges: &EdgeMap, scale: f32, shift: f32) -> GrayImage {
    map_colors(edges, |p: Luma<f32>| {
        let v = (p[0] * scale + shift).round();
        Luma([v.clamp(0.0, 255.0) as u8])
    })
}

/// Keep the pixels of `masked` lying on a detected edge of `crop`.
///
/// The edge map is taken from the unmasked crop so the disc border does not
/// register as an edge.
pub fn remove_flat_regions(
    crop: &RgbImage,
    masked: &RgbImage,
    aperture: u32,
    scale: f32,
    shift: f32,
) -> Result<RgbImage> {
    let gray = to_gray(crop);
    let edges = laplacian(&gray, aperture)?;
    let edge_mask = rescale_to_u8(&edges, scale, shift);

    let kept = edge_mask.pixels().filter(|p| p[0] != 0).count();
    log::debug!(
        "Edge mask keeps {} of {} pixels",
        kept,
        edge_mask.width() * edge_mask.height()
    );

    apply_mask(masked, &edge_mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_weights() {
        let img = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([255, 255, 255]),
        });
        let gray = to_gray(&img);
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_laplacian_of_flat_image_is_zero() {
        let gray = GrayImage::from_pixel(9, 7, Luma([120]));
        for aperture in [1, 3, 5, 7] {
            let lap = laplacian(&gray, aperture).unwrap();
            assert!(lap.pixels().all(|p| p[0] == 0.0), "aperture {}", aperture);
        }
    }

    #[test]
    fn test_laplacian_point_response() {
        // A single bright pixel: aperture 1 is the 4-neighbour cross
        let mut gray = GrayImage::new(5, 5);
        gray.put_pixel(2, 2, Luma([10]));
        let lap = laplacian(&gray, 1).unwrap();

        assert_eq!(lap.get_pixel(2, 2)[0], -40.0);
        assert_eq!(lap.get_pixel(1, 2)[0], 10.0);
        assert_eq!(lap.get_pixel(2, 3)[0], 10.0);
        assert_eq!(lap.get_pixel(1, 1)[0], 0.0);
    }

    #[test]
    fn test_laplacian_aperture_three_corners() {
        let mut gray = GrayImage::new(5, 5);
        gray.put_pixel(2, 2, Luma([1]));
        let lap = laplacian(&gray, 3).unwrap();

        // [2 0 2; 0 -8 0; 2 0 2]
        assert_eq!(lap.get_pixel(2, 2)[0], -8.0);
        assert_eq!(lap.get_pixel(1, 1)[0], 2.0);
        assert_eq!(lap.get_pixel(2, 1)[0], 0.0);
    }

    #[test]
    fn test_laplacian_aperture_five_kernel() {
        let mut gray = GrayImage::new(9, 9);
        gray.put_pixel(4, 4, Luma([1]));
        let lap = laplacian(&gray, 5).unwrap();

        // 2  4  4  4  2
        // 4  0 -8  0  4
        // 4 -8 -24 -8 4
        // 4  0 -8  0  4
        // 2  4  4  4  2
        let expected: [[f32; 5]; 5] = [
            [2.0, 4.0, 4.0, 4.0, 2.0],
            [4.0, 0.0, -8.0, 0.0, 4.0],
            [4.0, -8.0, -24.0, -8.0, 4.0],
            [4.0, 0.0, -8.0, 0.0, 4.0],
            [2.0, 4.0, 4.0, 4.0, 2.0],
        ];
        for (dy, row) in expected.iter().enumerate() {
            for (dx, &value) in row.iter().enumerate() {
                let (x, y) = (2 + dx as u32, 2 + dy as u32);
                assert_eq!(lap.get_pixel(x, y)[0], value, "at ({}, {})", x, y);
            }
        }
        assert_eq!(lap.get_pixel(1, 4)[0], 0.0);
    }

    #[test]
    fn test_unsupported_aperture() {
        let gray = GrayImage::new(4, 4);
        assert!(matches!(laplacian(&gray, 4), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_rescale_saturates() {
        let edges = EdgeMap::from_raw(3, 1, vec![-1.0, 0.5, 0.001]).unwrap();
        let out = rescale_to_u8(&edges, 256.0, 0.0);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(1, 0)[0], 128);
        assert_eq!(out.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn test_flat_crop_is_fully_removed() {
        let crop = RgbImage::from_pixel(8, 8, Rgb([200, 100, 50]));
        let out = remove_flat_regions(&crop, &crop, 5, 256.0, 0.0).unwrap();
        assert!(out.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_reflect101() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(6, 5), 2);
        assert_eq!(reflect101(-3, 1), 0);
    }
}
