//! # Raster
//!
//! Destructive pixel operations on straight-alpha RGBA8 bitmaps: the upload downscale,
//! crops, background removal and the tone adjustments. Everything here is pure, taking and
//! returning [`image::RgbaImage`]s, and knows nothing of the design.

use crate::util::Rect;

mod adjust;
mod sample;
pub use adjust::Adjustments;
pub use sample::{draw_image, sample_bilinear};

/// Longest side of an uploaded image after downscaling.
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
/// Channel value above which a pixel counts as background white.
pub const DEFAULT_BACKGROUND_THRESHOLD: u8 = 240;
/// Largest bitmap, in pixels, produced from caller-supplied sizes. 64MiB of RGBA8.
pub const MAX_PIXELS: u64 = 16 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error("image has no pixels")]
    Empty,
    #[error("crop region {0:?} is empty")]
    EmptyRegion(Rect),
    #[error("crop region {0:?} maps outside any representable size")]
    RegionTooLarge(Rect),
    #[error("decoding failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode any supported format (PNG, JPEG, GIF, WebP, BMP) from memory.
pub fn decode(bytes: &[u8]) -> Result<image::RgbaImage, RasterError> {
    let image = image::load_from_memory(bytes)?.into_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(RasterError::Empty);
    }
    log::trace!("decoded {}x{} image", image.width(), image.height());
    Ok(image)
}

/// Size after fitting `size` within `max_dimension` on both axes, preserving aspect ratio.
/// Sizes already within bounds are returned unchanged.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_within([width, height]: [u32; 2], max_dimension: u32) -> [u32; 2] {
    if width <= max_dimension && height <= max_dimension {
        return [width, height];
    }
    let max = max_dimension as f32;
    let scale = (max / width as f32).min(max / height as f32);
    [
        ((width as f32 * scale).round() as u32).max(1),
        ((height as f32 * scale).round() as u32).max(1),
    ]
}

/// Downscale so neither side exceeds `max_dimension`. Never upscales.
#[must_use]
pub fn resize_to_max(image: image::RgbaImage, max_dimension: u32) -> image::RgbaImage {
    let size = [image.width(), image.height()];
    let [width, height] = fit_within(size, max_dimension);
    if [width, height] == size {
        return image;
    }
    log::debug!(
        "downscaling upload {}x{} -> {width}x{height}",
        size[0],
        size[1]
    );
    image::imageops::resize(
        &image,
        width,
        height,
        image::imageops::FilterType::Triangle,
    )
}

/// Sample the `source_rect` region of `image` (in source pixels, may extend past the edges)
/// stretched onto a new bitmap of `out_size`. Parts of the region outside the source are
/// left transparent.
pub fn crop(
    image: &image::RgbaImage,
    source_rect: Rect,
    out_size: [u32; 2],
) -> Result<image::RgbaImage, RasterError> {
    if !(source_rect.width > 0.0 && source_rect.height > 0.0) {
        return Err(RasterError::EmptyRegion(source_rect));
    }
    let [out_w, out_h] = out_size;
    if out_w == 0 || out_h == 0 {
        return Err(RasterError::EmptyRegion(source_rect));
    }
    if u64::from(out_w) * u64::from(out_h) > MAX_PIXELS {
        return Err(RasterError::RegionTooLarge(source_rect));
    }
    let mut out = image::RgbaImage::new(out_w, out_h);
    #[allow(clippy::cast_precision_loss)]
    let matrix = crate::state::Matrix::scale(
        out_w as f32 / source_rect.width,
        out_h as f32 / source_rect.height,
    ) * crate::state::Matrix::translation(-source_rect.x, -source_rect.y);
    draw_image(&mut out, image, matrix, crate::blend::Blend::default());
    Ok(out)
}

/// Make every pixel with all of red, green and blue strictly above `threshold` fully
/// transparent. Returns how many pixels were cleared, not counting already transparent ones.
pub fn remove_background(image: &mut image::RgbaImage, threshold: u8) -> usize {
    let mut cleared = 0;
    for image::Rgba([r, g, b, a]) in image.pixels_mut() {
        if *a != 0 && *r > threshold && *g > threshold && *b > threshold {
            *a = 0;
            cleared += 1;
        }
    }
    log::debug!("background removal cleared {cleared} pixels");
    cleared
}

#[cfg(test)]
mod test {
    use super::*;
    fn solid(width: u32, height: u32, color: [u8; 4]) -> image::RgbaImage {
        image::RgbaImage::from_pixel(width, height, image::Rgba(color))
    }
    #[test]
    fn fit_rounds_and_preserves_aspect() {
        assert_eq!(fit_within([2048, 1024], 1024), [1024, 512]);
        assert_eq!(fit_within([1000, 3000], 1024), [341, 1024]);
        assert_eq!(fit_within([1024, 10], 1024), [1024, 10]);
        assert_eq!(fit_within([5000, 1], 1024), [1024, 1]);
    }
    #[test]
    fn resize_skips_small() {
        let image = solid(30, 20, [1, 2, 3, 4]);
        let resized = resize_to_max(image.clone(), 1024);
        assert_eq!(resized, image);
        let resized = resize_to_max(solid(40, 20, [9; 4]), 10);
        assert_eq!(resized.dimensions(), (10, 5));
    }
    #[test]
    fn background_threshold_is_strict() {
        let mut image = solid(3, 1, [255; 4]);
        image.put_pixel(1, 0, image::Rgba([240, 255, 255, 255]));
        image.put_pixel(2, 0, image::Rgba([241, 241, 241, 200]));
        assert_eq!(remove_background(&mut image, 240), 2);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(1, 0).0[3], 255);
        assert_eq!(image.get_pixel(2, 0).0[3], 0);
    }
    #[test]
    fn crop_identity_region() {
        let mut image = solid(4, 4, [0, 0, 0, 255]);
        image.put_pixel(2, 1, image::Rgba([255, 0, 0, 255]));
        let cropped = crop(&image, Rect::new(2.0, 1.0, 2.0, 2.0), [2, 2]).unwrap();
        assert_eq!(cropped.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(cropped.get_pixel(1, 1).0, [0, 0, 0, 255]);
    }
    #[test]
    fn crop_outside_is_transparent() {
        let image = solid(4, 4, [10, 20, 30, 255]);
        let cropped = crop(&image, Rect::new(-4.0, 0.0, 8.0, 4.0), [8, 4]).unwrap();
        assert_eq!(cropped.get_pixel(0, 0).0[3], 0);
        assert_eq!(cropped.get_pixel(6, 2).0, [10, 20, 30, 255]);
    }
    #[test]
    fn crop_rejects_empty() {
        let image = solid(4, 4, [0; 4]);
        assert!(matches!(
            crop(&image, Rect::new(0.0, 0.0, 0.0, 1.0), [1, 1]),
            Err(RasterError::EmptyRegion(_))
        ));
        assert!(crop(&image, Rect::new(0.0, 0.0, 1.0, 1.0), [0, 1]).is_err());
    }
    #[test]
    fn background_is_strictly_above_threshold() {
        let mut image = solid(3, 1, [241, 241, 241, 255]);
        image.put_pixel(1, 0, image::Rgba([240, 255, 255, 255]));
        image.put_pixel(2, 0, image::Rgba([255, 255, 255, 0]));
        assert_eq!(remove_background(&mut image, 240), 1);
        assert_eq!(image.get_pixel(0, 0).0, [241, 241, 241, 0]);
        assert_eq!(image.get_pixel(1, 0).0[3], 255);
        assert_eq!(remove_background(&mut image, 240), 0);
    }
    #[test]
    fn decode_png() {
        let image = solid(3, 2, [1, 2, 3, 255]);
        let mut bytes = std::io::Cursor::new(Vec::new());
        image.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        let decoded = decode(bytes.get_ref()).unwrap();
        assert_eq!(decoded, image);
        assert!(matches!(decode(b"not an image"), Err(RasterError::Decode(_))));
    }
}
