//! The single base image a design is built around.

use super::transform::Transform;
use crate::repositories::images::ImageId;
use crate::util::Rect;

/// Padding kept between a freshly placed image and the canvas edges, in logical pixels.
pub const FIT_PADDING: f32 = 50.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BaseImage {
    pub source: ImageId,
    /// Pixel size of `source`, cached so geometry doesn't need the repository.
    pub size: [u32; 2],
    pub transform: Transform,
}
impl BaseImage {
    /// Place `source` centered on the canvas, shrunk to fit inside the padded area.
    #[must_use]
    pub fn fitted(source: ImageId, size: [u32; 2], canvas: [u32; 2]) -> Self {
        Self {
            source,
            size,
            transform: fit_transform(size, canvas, FIT_PADDING),
        }
    }
    /// Place `source` centered on the canvas at its natural size.
    #[must_use]
    pub fn centered(source: ImageId, size: [u32; 2], canvas: [u32; 2]) -> Self {
        let [w, h] = size.map(|v| v as f32);
        let [cw, ch] = canvas.map(|v| v as f32);
        Self {
            source,
            size,
            transform: Transform::at((cw - w) / 2.0, (ch - h) / 2.0),
        }
    }
    /// Axis-aligned bounds of the transformed image, in canvas space.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        let [w, h] = self.size.map(|v| v as f32);
        let matrix = self.transform.matrix();
        Rect::bounding(
            Rect::new(0.0, 0.0, w, h)
                .corners()
                .map(|corner| matrix.apply(corner)),
        )
        .unwrap_or_default()
    }
}

/// Transform that shrinks an image of `size` to fit within `canvas` minus `padding` on every
/// side, keeping aspect ratio and centering it. Small images are never enlarged.
#[must_use]
pub fn fit_transform(size: [u32; 2], canvas: [u32; 2], padding: f32) -> Transform {
    let [w, h] = size.map(|v| (v as f32).max(1.0));
    let [cw, ch] = canvas.map(|v| v as f32);
    let fit_w = (cw - padding * 2.0).max(1.0);
    let fit_h = (ch - padding * 2.0).max(1.0);

    let scale = if w / h > fit_w / fit_h {
        fit_w / w
    } else {
        fit_h / h
    }
    .min(1.0);

    Transform::uniform((cw - w * scale) / 2.0, (ch - h * scale) / 2.0, scale)
}

#[cfg(test)]
mod test {
    use super::{fit_transform, BaseImage};
    use crate::repositories::images::ImageId;
    #[test]
    fn wide_image_fits_width() {
        // Fit area of the print canvas is 800x200.
        let transform = fit_transform([1600, 200], [900, 300], 50.0);
        assert!((transform.scale_x - 0.5).abs() < 1e-6);
        assert_eq!(transform.scale_x, transform.scale_y);
        assert!((transform.x - 50.0).abs() < 1e-4);
        assert!((transform.y - 100.0).abs() < 1e-4);
    }
    #[test]
    fn tall_image_fits_height() {
        let transform = fit_transform([400, 800], [900, 300], 50.0);
        assert!((transform.scale_y - 0.25).abs() < 1e-6);
        assert!((transform.x - 400.0).abs() < 1e-4);
    }
    #[test]
    fn small_image_not_enlarged() {
        let transform = fit_transform([100, 50], [900, 300], 50.0);
        assert_eq!(transform.scale_x, 1.0);
        assert!((transform.x - 400.0).abs() < 1e-4);
        assert!((transform.y - 125.0).abs() < 1e-4);
    }
    #[test]
    fn bounds_follow_transform() {
        let image = BaseImage::fitted(ImageId::fresh(), [1600, 200], [900, 300]);
        let bounds = image.bounding_box();
        assert!((bounds.width - 800.0).abs() < 1e-3);
        assert!((bounds.height - 100.0).abs() < 1e-3);
    }
}
