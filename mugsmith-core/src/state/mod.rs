//! # State
//!
//! The full, plain-data description of a mug design. A [`Design`] is cheap to clone (images
//! are held by ID) so every history entry is simply a whole copy of it.

pub mod graphics;
pub mod image;
pub mod text;
pub mod transform;

pub use graphics::{GraphicCollection, GraphicId, GraphicObject};
pub use image::BaseImage;
pub use text::{TextCollection, TextId, TextObject};
pub use transform::{Axis, Matrix, Transform};

use crate::color::Color;
use crate::repositories::images::ImageId;

/// The surface the design is composed on.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    /// Shown wherever the design leaves the surface uncovered.
    pub color: Color,
}
impl Default for CanvasSpec {
    fn default() -> Self {
        let [width, height] = crate::PRINT_AREA;
        Self {
            width,
            height,
            color: Color::WHITE,
        }
    }
}
impl CanvasSpec {
    #[must_use]
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Design {
    pub canvas: CanvasSpec,
    pub image: Option<BaseImage>,
    pub texts: TextCollection,
    pub graphics: GraphicCollection,
}
impl Design {
    #[must_use]
    pub fn new(canvas: CanvasSpec) -> Self {
        Self {
            canvas,
            ..Self::default()
        }
    }
    /// Place a new base image, fitted to the canvas. Overlays are kept.
    pub fn set_image(&mut self, source: ImageId, size: [u32; 2]) {
        self.image = Some(BaseImage::fitted(source, size, self.canvas.size()));
    }
    /// Drop the base image along with all text, which was laid out against it.
    pub fn remove_image(&mut self) {
        self.image = None;
        self.texts.clear();
    }
    /// Every stored image this design needs to render.
    pub fn referenced_images(&self) -> impl Iterator<Item = ImageId> + '_ {
        self.image.iter().map(|image| image.source)
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.texts.is_empty() && self.graphics.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::{text::TextDraft, Design};
    use crate::repositories::images::ImageId;
    #[test]
    fn defaults_to_print_area() {
        let design = Design::default();
        assert_eq!(design.canvas.size(), crate::PRINT_AREA);
        assert!(design.is_empty());
    }
    #[test]
    fn remove_image_clears_text() {
        let mut design = Design::default();
        let source = ImageId::fresh();
        design.set_image(source, [100, 100]);
        design.texts.add(TextDraft::new("hello"));
        assert_eq!(design.referenced_images().collect::<Vec<_>>(), [source]);

        design.remove_image();
        assert!(design.image.is_none());
        assert!(design.texts.is_empty());
        assert_eq!(design.referenced_images().count(), 0);
    }
}
