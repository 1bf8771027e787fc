//! sRGB to CIE L*a*b* (D65) conversion with an 8-bit encoding.
//!
//! Lab values are packed into ordinary 3x8-bit buffers:
//! `L8 = L * 255 / 100`, `a8 = a + 128`, `b8 = b + 128`, rounded and
//! saturated. The histograms are built over these 8-bit values.

use image::{Rgb, RgbImage};
use imageproc::map::map_colors;
use palette::{FromColor, Lab, Srgb};

/// Channel names of an encoded Lab image, in buffer order
pub const LAB_CHANNELS: [&str; 3] = ["L", "a", "b"];

fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Encode a Lab color as 8-bit channels
pub fn encode_lab(lab: Lab) -> [u8; 3] {
    [
        saturate(lab.l * 255.0 / 100.0),
        saturate(lab.a + 128.0),
        saturate(lab.b + 128.0),
    ]
}

/// Decode 8-bit channels back to a Lab color
pub fn decode_lab(encoded: [u8; 3]) -> Lab {
    Lab::new(
        f32::from(encoded[0]) * 100.0 / 255.0,
        f32::from(encoded[1]) - 128.0,
        f32::from(encoded[2]) - 128.0,
    )
}

/// Convert a single 8-bit sRGB pixel to encoded Lab
pub fn rgb_pixel_to_lab(pixel: Rgb<u8>) -> Rgb<u8> {
    let srgb: Srgb<f32> = Srgb::new(pixel[0], pixel[1], pixel[2]).into_format();
    Rgb(encode_lab(Lab::from_color(srgb)))
}

/// Convert a single encoded Lab pixel to 8-bit sRGB, clamping out-of-gamut values
pub fn lab_pixel_to_rgb(pixel: Rgb<u8>) -> Rgb<u8> {
    let srgb: Srgb = Srgb::from_color(decode_lab(pixel.0));
    Rgb([
        saturate(srgb.red * 255.0),
        saturate(srgb.green * 255.0),
        saturate(srgb.blue * 255.0),
    ])
}

/// Convert an sRGB image to encoded Lab
pub fn rgb_to_lab(image: &RgbImage) -> RgbImage {
    map_colors(image, rgb_pixel_to_lab)
}

/// Convert an encoded Lab image back to sRGB
pub fn lab_to_rgb(image: &RgbImage) -> RgbImage {
    map_colors(image, lab_pixel_to_rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white() {
        assert_eq!(rgb_pixel_to_lab(Rgb([0, 0, 0])), Rgb([0, 128, 128]));
        assert_eq!(rgb_pixel_to_lab(Rgb([255, 255, 255])), Rgb([255, 128, 128]));
    }

    #[test]
    fn test_gray_is_neutral() {
        let lab = rgb_pixel_to_lab(Rgb([119, 119, 119]));
        assert_eq!(lab[1], 128);
        assert_eq!(lab[2], 128);
        // sRGB 119 is close to L* = 50
        assert!((i32::from(lab[0]) - 128).abs() <= 2);
    }

    #[test]
    fn test_red_has_positive_a() {
        let lab = rgb_pixel_to_lab(Rgb([200, 30, 30]));
        assert!(lab[1] > 128 + 40);
    }

    #[test]
    fn test_encode_saturates() {
        assert_eq!(encode_lab(Lab::new(120.0, -200.0, 200.0)), [255, 0, 255]);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let lab = decode_lab(encode_lab(Lab::new(50.0, 20.0, -30.0)));
        assert!((lab.l - 50.0).abs() < 0.5);
        assert_eq!(lab.a, 20.0);
        assert_eq!(lab.b, -30.0);
    }
}
