use image::{Rgba, RgbaImage};
use proptest::prelude::*;
use radial_fade::{composite_radial_mask, composite_radial_mask_with, mask};

fn arb_image() -> impl Strategy<Value = RgbaImage> {
    (1u32..=24, 1u32..=24).prop_flat_map(|(w, h)| {
        proptest::collection::vec(any::<u8>(), (w * h * 4) as usize)
            .prop_map(move |raw| RgbaImage::from_raw(w, h, raw).unwrap())
    })
}

proptest! {
    #[test]
    fn dimensions_and_rgb_are_preserved(img in arb_image()) {
        let out = composite_radial_mask(&img).unwrap();
        prop_assert_eq!(out.dimensions(), img.dimensions());
        for (a, b) in img.pixels().zip(out.pixels()) {
            prop_assert_eq!(&a.0[..3], &b.0[..3]);
        }
    }

    #[test]
    fn alpha_is_the_rounded_lerp(img in arb_image(), t in 0.0f32..=1.0) {
        let out = composite_radial_mask_with(&img, t).unwrap();
        let (w, h) = img.dimensions();
        for (x, y, px) in out.enumerate_pixels() {
            let orig = f64::from(img.get_pixel(x, y)[3]);
            let m = f64::from(mask::mask_value(x, y, w, h));
            let exact = orig * (1.0 - f64::from(t)) + m * f64::from(t);
            prop_assert!((f64::from(px[3]) - exact).abs() <= 0.52,
                "({}, {}): {} vs {}", x, y, px[3], exact);
        }
    }

    #[test]
    fn mask_falls_off_along_the_center_row(w in 1u32..=200, h in 1u32..=200) {
        let cy = h / 2;
        let mut prev = u8::MAX;
        for x in (w / 2)..w {
            let v = mask::mask_value(x, cy, w, h);
            prop_assert!(v <= prev);
            prev = v;
        }
        prop_assert_eq!(mask::mask_value(0, 0, w, h), 0);
    }

    #[test]
    fn blend_endpoints(orig in any::<u8>(), m in any::<u8>()) {
        prop_assert_eq!(mask::blend_alpha(orig, m, 0.0), orig);
        prop_assert_eq!(mask::blend_alpha(orig, m, 1.0), m);
    }
}

#[test]
fn opaque_image_keeps_its_rgb_when_faded_twice() {
    let img = RgbaImage::from_pixel(20, 20, Rgba([12, 34, 56, 255]));
    let once = composite_radial_mask(&img).unwrap();
    let twice = composite_radial_mask(&once).unwrap();
    assert!(twice.pixels().all(|px| px.0[..3] == [12, 34, 56]));
    assert!(once
        .pixels()
        .zip(twice.pixels())
        .any(|(a, b)| a[3] != b[3]));
}
