//! Radial alpha mask and alpha blending.
//!
//! The mask is opaque at the image center and fades to transparent at the
//! edge of the inscribed ellipse, following a square-root taper:
//!
//! `mask = floor(255 * (1 - sqrt(min(1, r))))`
//!
//! where `r` is the distance from the center in coordinates normalized by
//! half the width and half the height. The mask is then mixed into the
//! existing alpha channel by linear interpolation:
//!
//! `alpha' = round(alpha * (1 - t) + mask * t)`

use image::{GrayImage, RgbaImage};

use crate::error::{Error, Result};

/// Default weight of the mask against the original alpha.
pub const DEFAULT_BLEND_FACTOR: f32 = 0.7;

/// Fixed-point scale for the blend factor (four decimal places).
///
/// Integer lerp keeps `.5` results exact, so `0 -> 255` at `0.7` gives 179
/// rather than drifting to 178 through the binary form of `0.7`.
const BLEND_SCALE: u32 = 10_000;

/// Mask intensity at pixel `(x, y)` of a `width x height` image.
///
/// Pure function of the coordinates. `width` and `height` must be non-zero.
#[must_use]
pub fn mask_value(x: u32, y: u32, width: u32, height: u32) -> u8 {
    debug_assert!(width > 0 && height > 0);
    let half_w = f64::from(width) / 2.0;
    let half_h = f64::from(height) / 2.0;

    let dx = (f64::from(x) - half_w) / half_w;
    let dy = (f64::from(y) - half_h) / half_h;
    let distance = dx.hypot(dy).min(1.0);

    let value = (255.0 * (1.0 - distance.sqrt())).floor().max(0.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        value as u8
    }
}

/// Linear interpolation between an original alpha and a mask value.
///
/// `blend_factor` is the weight of the mask and is expected in `[0, 1]`;
/// it is clamped otherwise. Rounds halves up.
#[must_use]
pub fn blend_alpha(original: u8, mask: u8, blend_factor: f32) -> u8 {
    blend_scaled(original, mask, scaled_factor(blend_factor))
}

fn scaled_factor(blend_factor: f32) -> u32 {
    let t = f64::from(blend_factor.clamp(0.0, 1.0));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (t * f64::from(BLEND_SCALE)).round() as u32
    }
}

fn blend_scaled(original: u8, mask: u8, t: u32) -> u8 {
    let mixed = u32::from(original) * (BLEND_SCALE - t) + u32::from(mask) * t;
    let rounded = (mixed + BLEND_SCALE / 2) / BLEND_SCALE;
    // mixed <= 255 * BLEND_SCALE, so rounded <= 255
    u8::try_from(rounded).unwrap_or(u8::MAX)
}

/// Build the radial mask for a `width x height` image.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if either dimension is zero.
pub fn radial_mask(width: u32, height: u32) -> Result<GrayImage> {
    check_dimensions(width, height)?;

    let row_len = width as usize;
    let mut buf = vec![0u8; row_len * height as usize];
    let fill_row = |(y, row): (usize, &mut [u8])| {
        #[allow(clippy::cast_possible_truncation)]
        let y = y as u32;
        for (x, out) in (0..width).zip(row.iter_mut()) {
            *out = mask_value(x, y, width, height);
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        buf.par_chunks_mut(row_len).enumerate().for_each(fill_row);
    }

    #[cfg(not(feature = "parallel"))]
    {
        buf.chunks_mut(row_len).enumerate().for_each(fill_row);
    }

    GrayImage::from_raw(width, height, buf)
        .ok_or_else(|| Error::InvalidInput(format!("mask buffer does not fit {width}x{height}")))
}

/// Fade an image with the radial mask at [`DEFAULT_BLEND_FACTOR`].
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the image has a zero dimension.
pub fn composite_radial_mask(image: &RgbaImage) -> Result<RgbaImage> {
    composite_radial_mask_with(image, DEFAULT_BLEND_FACTOR)
}

/// Fade an image with the radial mask at the given blend factor.
///
/// Returns a new image with the same dimensions and RGB channels; only the
/// alpha channel is replaced by the blend of the original alpha and the mask.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the image has a zero dimension or the
/// blend factor is not a finite value in `[0, 1]`.
pub fn composite_radial_mask_with(image: &RgbaImage, blend_factor: f32) -> Result<RgbaImage> {
    check_blend_factor(blend_factor)?;
    let mask = radial_mask(image.width(), image.height())?;
    let t = scaled_factor(blend_factor);

    let mut out = image.clone();
    for (px, m) in out.pixels_mut().zip(mask.as_raw()) {
        px[3] = blend_scaled(px[3], *m, t);
    }
    Ok(out)
}

/// Validate that a blend factor is finite and within `[0, 1]`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] otherwise.
pub fn check_blend_factor(blend_factor: f32) -> Result<()> {
    if blend_factor.is_finite() && (0.0..=1.0).contains(&blend_factor) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "blend factor must be within [0, 1], got {blend_factor}"
        )))
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput(format!(
            "image has zero dimension ({width}x{height})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(px))
    }

    #[test]
    fn center_is_opaque() {
        for &(w, h) in &[(4, 4), (8, 8), (100, 60), (2, 50)] {
            assert_eq!(mask_value(w / 2, h / 2, w, h), 255, "{w}x{h} center");
        }
    }

    #[test]
    fn corners_are_transparent() {
        for &(w, h) in &[(8, 8), (100, 60), (7, 31), (64, 48)] {
            assert_eq!(mask_value(0, 0, w, h), 0, "{w}x{h} top-left");
            assert_eq!(mask_value(w - 1, h - 1, w, h), 0, "{w}x{h} bottom-right");
            assert_eq!(mask_value(w - 1, 0, w, h), 0, "{w}x{h} top-right");
            assert_eq!(mask_value(0, h - 1, w, h), 0, "{w}x{h} bottom-left");
        }
        // The top-left pixel sits at normalized (-1, -1) for every size.
        assert_eq!(mask_value(0, 0, 3, 3), 0);
    }

    #[test]
    fn taper_is_square_root_of_distance() {
        // 10x10: pixel (7, 5) sits at distance 0.4 from the center.
        assert_eq!(mask_value(7, 5, 10, 10), 93);

        // Linear falloff would give 153 and squared falloff 214.
        assert_ne!(mask_value(7, 5, 10, 10), 153);
        assert_ne!(mask_value(7, 5, 10, 10), 214);
    }

    #[test]
    fn mask_does_not_increase_along_rays() {
        let (w, h) = (64, 48);
        let (cx, cy) = (w / 2, h / 2);
        let rays: [(i64, i64); 8] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (-1, -1), (1, -1), (-1, 1)];
        for (sx, sy) in rays {
            let mut prev = u8::MAX;
            let mut step = 0i64;
            loop {
                let x = i64::from(cx) + sx * step;
                let y = i64::from(cy) + sy * step;
                if x < 0 || y < 0 || x >= i64::from(w) || y >= i64::from(h) {
                    break;
                }
                let v = mask_value(
                    u32::try_from(x).unwrap(),
                    u32::try_from(y).unwrap(),
                    w,
                    h,
                );
                assert!(v <= prev, "ray ({sx},{sy}) step {step}: {v} > {prev}");
                prev = v;
                step += 1;
            }
        }
    }

    #[test]
    fn blend_is_lerp_not_multiply() {
        assert_eq!(blend_alpha(0, 255, 0.7), 179);
        assert_eq!(blend_alpha(255, 0, 0.7), 77);
        assert_eq!(blend_alpha(255, 255, 0.7), 255);
        assert_eq!(blend_alpha(0, 0, 0.7), 0);
    }

    #[test]
    fn blend_factor_extremes() {
        assert_eq!(blend_alpha(42, 200, 0.0), 42);
        assert_eq!(blend_alpha(42, 200, 1.0), 200);
        assert_eq!(blend_alpha(100, 201, 0.5), 151);
    }

    #[test]
    fn radial_mask_matches_pointwise_values() {
        let mask = radial_mask(9, 6).unwrap();
        assert_eq!(mask.dimensions(), (9, 6));
        for (x, y, px) in mask.enumerate_pixels() {
            assert_eq!(px[0], mask_value(x, y, 9, 6));
        }
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(radial_mask(0, 4), Err(Error::InvalidInput(_))));
        assert!(matches!(radial_mask(4, 0), Err(Error::InvalidInput(_))));
        let empty = RgbaImage::new(0, 0);
        assert!(matches!(
            composite_radial_mask(&empty),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn out_of_range_blend_factor_is_rejected() {
        let img = solid(2, 2, [1, 2, 3, 255]);
        for bad in [-0.1, 1.5, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                composite_radial_mask_with(&img, bad),
                Err(Error::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn rgb_channels_are_untouched() {
        let mut img = RgbaImage::new(13, 7);
        for (x, y, px) in img.enumerate_pixels_mut() {
            #[allow(clippy::cast_possible_truncation)]
            {
                *px = Rgba([(x * 19) as u8, (y * 31) as u8, (x + y) as u8, 200]);
            }
        }
        let out = composite_radial_mask(&img).unwrap();
        assert_eq!(out.dimensions(), img.dimensions());
        for (a, b) in img.pixels().zip(out.pixels()) {
            assert_eq!(a.0[0..3], b.0[0..3]);
        }
    }

    #[test]
    fn single_pixel_image_sits_on_the_rim() {
        // 1x1: the pixel at (0, 0) sits at normalized (-1, -1), outside the ellipse.
        let out = composite_radial_mask(&solid(1, 1, [9, 9, 9, 255])).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [9, 9, 9, 77]);
    }

    #[test]
    fn second_application_fades_further() {
        let img = solid(16, 16, [255, 255, 255, 255]);
        let once = composite_radial_mask(&img).unwrap();
        let twice = composite_radial_mask(&once).unwrap();
        assert_ne!(once, twice);
        assert_eq!(once.get_pixel(0, 0)[3], 77);
        assert_eq!(twice.get_pixel(0, 0)[3], 23);
        assert_eq!(twice.get_pixel(8, 8)[3], 255);
    }
}
