//! # Render
//!
//! A CPU compositor flattening a [`Design`] into a single bitmap. Vector content (graphics,
//! glyph outlines) is tessellated with lyon and rasterized into antialiased coverage, raster
//! content is resampled through its transform. Layers draw bottom to top: canvas color, base
//! image, graphics, texts.

mod coverage;
pub mod shapes;
pub mod text;

pub use coverage::{Coverage, Mesh};

use crate::blend::Blend;
use crate::color::Color;
use crate::raster::{draw_image, Adjustments};
use crate::repositories::fonts::{FaceRequest, Fonts};
use crate::repositories::images::{ImageId, Images};
use crate::state::text::{TextStyle, TextId, TextObject};
use crate::state::{BaseImage, Design, GraphicObject, Matrix};
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, StrokeOptions, StrokeTessellator,
    StrokeVertex,
};

/// Max distance of flattened curves from the true curve, in output pixels.
pub const DEFAULT_TOLERANCE: f32 = 0.25;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("image {0} is not in the repository")]
    MissingImage(ImageId),
    #[error("design has no base image")]
    NoImage,
    #[error("tessellation failed: {0:?}")]
    Tessellation(lyon_tessellation::TessellationError),
    #[error("encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
impl From<lyon_tessellation::TessellationError> for RenderError {
    fn from(value: lyon_tessellation::TessellationError) -> Self {
        Self::Tessellation(value)
    }
}

/// Per-render view state that isn't part of the design itself.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RenderSettings {
    pub adjustments: Adjustments,
    /// A text open in the editing dialog, left out so it isn't drawn twice.
    pub hidden_text: Option<TextId>,
}

pub struct Compositor<'a> {
    images: &'a Images,
    fonts: &'a Fonts,
    tolerance: f32,
}
impl<'a> Compositor<'a> {
    #[must_use]
    pub fn new(images: &'a Images, fonts: &'a Fonts) -> Self {
        Self {
            images,
            fonts,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
    #[must_use]
    pub fn with_tolerance(self, tolerance: f32) -> Self {
        Self {
            tolerance: tolerance.max(0.01),
            ..self
        }
    }
    /// Flatten every layer of the design onto a canvas-sized bitmap.
    pub fn composite(
        &self,
        design: &Design,
        settings: &RenderSettings,
    ) -> Result<image::RgbaImage, RenderError> {
        let size = design.canvas.size();
        let mut target = image::RgbaImage::from_pixel(size[0], size[1], design.canvas.color.into());
        if let Some(base) = &design.image {
            self.draw_base(&mut target, base, settings.adjustments, base.transform.matrix())?;
        }
        let mut coverage = Coverage::new(size);
        for graphic in design.graphics.iter() {
            self.draw_graphic(&mut target, &mut coverage, graphic)?;
        }
        self.draw_texts(&mut target, &mut coverage, design, settings.hidden_text)?;
        log::trace!(
            "composited {}x{}, {} graphics, {} texts",
            size[0],
            size[1],
            design.graphics.len(),
            design.texts.len()
        );
        Ok(target)
    }
    /// The bitmap wrapped around the mug: the base image at its own pixel size, untransformed,
    /// over the canvas color, with the texts on top. Texts keep their canvas placement.
    pub fn texture(
        &self,
        design: &Design,
        settings: &RenderSettings,
    ) -> Result<image::RgbaImage, RenderError> {
        let base = design.image.as_ref().ok_or(RenderError::NoImage)?;
        let [width, height] = base.size;
        let mut target = image::RgbaImage::from_pixel(width, height, design.canvas.color.into());
        self.draw_base(&mut target, base, settings.adjustments, Matrix::IDENTITY)?;
        let mut coverage = Coverage::new(base.size);
        self.draw_texts(&mut target, &mut coverage, design, settings.hidden_text)?;
        Ok(target)
    }
    fn draw_base(
        &self,
        target: &mut image::RgbaImage,
        base: &BaseImage,
        adjustments: Adjustments,
        matrix: Matrix,
    ) -> Result<(), RenderError> {
        let pixels = self
            .images
            .get(base.source)
            .ok_or(RenderError::MissingImage(base.source))?;
        if adjustments.is_identity() {
            draw_image(target, &pixels, matrix, Blend::default());
        } else {
            let mut adjusted = (*pixels).clone();
            adjustments.apply(&mut adjusted);
            draw_image(target, &adjusted, matrix, Blend::default());
        }
        Ok(())
    }
    fn draw_graphic(
        &self,
        target: &mut image::RgbaImage,
        coverage: &mut Coverage,
        graphic: &GraphicObject,
    ) -> Result<(), RenderError> {
        let mut matrix = graphic.transform.matrix();
        if let Some([sx, sy]) = shapes::icon_scale(&graphic.shape) {
            matrix = matrix * Matrix::scale(sx, sy);
        }
        // Tessellation happens in local space, so tighten by the zoom into output pixels.
        let tolerance = self.tolerance / matrix.max_scale().max(1e-6);
        let blend = Blend::with_opacity(graphic.opacity);
        for paint in shapes::paints(graphic) {
            if let Some(color) = paint.fill {
                let mesh = fill_mesh(&paint.path, matrix, tolerance)?;
                paint_mesh(target, coverage, &mesh, color, blend);
            }
            if let Some((color, width)) = paint.stroke {
                let mesh = stroke_mesh(&paint.path, width, matrix, tolerance)?;
                paint_mesh(target, coverage, &mesh, color, blend);
            }
        }
        Ok(())
    }
    fn draw_texts(
        &self,
        target: &mut image::RgbaImage,
        coverage: &mut Coverage,
        design: &Design,
        hidden: Option<TextId>,
    ) -> Result<(), RenderError> {
        for text in design.texts.iter().filter(|text| Some(text.id) != hidden) {
            self.draw_text(target, coverage, text)?;
        }
        Ok(())
    }
    fn draw_text(
        &self,
        target: &mut image::RgbaImage,
        coverage: &mut Coverage,
        text: &TextObject,
    ) -> Result<(), RenderError> {
        if text.content.is_empty() {
            return Ok(());
        }
        let request = FaceRequest {
            family: &text.font_family,
            bold: text.style.contains(TextStyle::BOLD),
            italic: text.style.contains(TextStyle::ITALIC),
        };
        let meshed = self.fonts.with_face(request, |face| {
            text::TextMesher::new(face, text, text.transform.matrix(), self.tolerance).build()
        });
        match meshed {
            Ok(mesh) => {
                paint_mesh(
                    target,
                    coverage,
                    &mesh?,
                    text.fill,
                    Blend::with_opacity(text.opacity),
                );
            }
            Err(err) => log::warn!("skipping text {}: {err}", text.id),
        }
        Ok(())
    }
}

fn paint_mesh(
    target: &mut image::RgbaImage,
    coverage: &mut Coverage,
    mesh: &Mesh,
    color: Color,
    blend: Blend,
) {
    coverage.clear();
    coverage.add_mesh(mesh);
    coverage.paint(target, color, blend);
}

/// Fill `path`, mapping its local space through `matrix`.
pub fn fill_mesh(
    path: &lyon_tessellation::path::Path,
    matrix: Matrix,
    tolerance: f32,
) -> Result<Mesh, lyon_tessellation::TessellationError> {
    let mut mesh = Mesh::new();
    FillTessellator::new().tessellate_path(
        path,
        &FillOptions::non_zero().with_tolerance(tolerance),
        &mut BuffersBuilder::new(&mut mesh, move |vertex: FillVertex| {
            let position = vertex.position();
            matrix.apply([position.x, position.y])
        }),
    )?;
    Ok(mesh)
}
/// Stroke `path` with a centered line of `width` local units.
pub fn stroke_mesh(
    path: &lyon_tessellation::path::Path,
    width: f32,
    matrix: Matrix,
    tolerance: f32,
) -> Result<Mesh, lyon_tessellation::TessellationError> {
    let mut mesh = Mesh::new();
    StrokeTessellator::new().tessellate_path(
        path,
        &StrokeOptions::tolerance(tolerance).with_line_width(width),
        &mut BuffersBuilder::new(&mut mesh, move |vertex: StrokeVertex| {
            let position = vertex.position();
            matrix.apply([position.x, position.y])
        }),
    )?;
    Ok(mesh)
}

/// Encode as PNG bytes.
pub fn encode_png(image: &image::RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image.write_to(&mut bytes, image::ImageFormat::Png)?;
    Ok(bytes.into_inner())
}
