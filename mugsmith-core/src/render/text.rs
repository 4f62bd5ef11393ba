//! Text objects to triangle meshes.
//!
//! Each line is shaped with `rustybuzz`, and every glyph outline is streamed straight from
//! `ttf_parser` into a lyon fill tessellator, positioned by the text's own transform.

use super::coverage::Mesh;
use crate::state::text::{Align, TextObject};
use crate::state::Matrix;
use lyon_tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex};
use rustybuzz::ttf_parser;
use unicode_segmentation::UnicodeSegmentation;

/// Newtype to allow lyon tess to accept TTF path events.
struct LyonBridge<'builder>(
    lyon_tessellation::path::builder::NoAttributes<lyon_tessellation::FillBuilder<'builder>>,
);
impl ttf_parser::OutlineBuilder for LyonBridge<'_> {
    fn close(&mut self) {
        self.0.close();
    }
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        use lyon_tessellation::math::point;
        self.0
            .cubic_bezier_to(point(x1, y1), point(x2, y2), point(x, y));
    }
    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        use lyon_tessellation::math::point;
        self.0.quadratic_bezier_to(point(x1, y1), point(x, y));
    }
    fn line_to(&mut self, x: f32, y: f32) {
        use lyon_tessellation::math::point;
        self.0.line_to(point(x, y));
    }
    fn move_to(&mut self, x: f32, y: f32) {
        use lyon_tessellation::math::point;
        // This has a precondition we cannot verify!
        self.0.begin(point(x, y));
    }
}

/// A run of shaped glyphs, positions in font units relative to the run's pen origin.
struct ShapedRun {
    glyphs: Vec<(ttf_parser::GlyphId, [f32; 2])>,
    /// Total advance in font units, without letter spacing.
    advance: f32,
}
#[allow(clippy::cast_precision_loss)]
fn shape(face: &rustybuzz::Face<'_>, text: &str) -> ShapedRun {
    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.guess_segment_properties();
    let shaped = rustybuzz::shape(face, &[], buffer);

    let mut pen = 0.0;
    let mut glyphs = Vec::with_capacity(shaped.len());
    for (info, position) in shaped.glyph_infos().iter().zip(shaped.glyph_positions()) {
        // Glyph IDs from shaping always come from the face, and faces hold at most u16::MAX.
        let Ok(id) = u16::try_from(info.glyph_id) else {
            continue;
        };
        glyphs.push((
            ttf_parser::GlyphId(id),
            [pen + position.x_offset as f32, position.y_offset as f32],
        ));
        pen += position.x_advance as f32;
    }
    ShapedRun {
        glyphs,
        advance: pen,
    }
}

/// Tessellates the glyphs of a text into one mesh in canvas pixel space.
pub struct TextMesher<'face, 'a> {
    face: &'face rustybuzz::Face<'a>,
    text: &'face TextObject,
    /// Text local space to canvas.
    matrix: Matrix,
    /// Font units to text local space.
    scale: f32,
    /// Max deviation in canvas pixels.
    tolerance: f32,
    tessellator: FillTessellator,
}
impl<'face, 'a> TextMesher<'face, 'a> {
    #[must_use]
    pub fn new(
        face: &'face rustybuzz::Face<'a>,
        text: &'face TextObject,
        matrix: Matrix,
        tolerance: f32,
    ) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let units_per_em = face.units_per_em().max(1) as f32;
        Self {
            face,
            text,
            matrix,
            scale: text.font_size / units_per_em,
            tolerance,
            tessellator: FillTessellator::new(),
        }
    }
    /// Distance from the top of a line to its baseline, in local units.
    ///
    /// Lines are laid out em-box centered, like a canvas with a `middle` baseline.
    fn baseline(&self) -> f32 {
        let ascender = f32::from(self.face.ascender());
        let descender = f32::from(self.face.descender());
        self.text.font_size / 2.0 + (ascender + descender) / 2.0 * self.scale
    }
    pub fn build(mut self) -> Result<Mesh, lyon_tessellation::TessellationError> {
        let mut mesh = Mesh::new();
        let baseline = self.baseline();
        let spacing = self.text.letter_spacing;

        if let Some(offsets) = self.text.curve_offsets() {
            // Every grapheme is placed on its own along the curve.
            let graphemes: Vec<&str> = self.text.content.graphemes(true).collect();
            for (grapheme, [x, y]) in graphemes.into_iter().zip(offsets) {
                let run = shape(self.face, grapheme);
                self.emit_run(&run, [x, y + baseline], &mut mesh)?;
            }
        } else {
            let runs: Vec<ShapedRun> = self
                .text
                .content
                .split('\n')
                .map(|line| shape(self.face, line))
                .collect();
            let scale = self.scale;
            let width_of = |run: &ShapedRun| {
                #[allow(clippy::cast_precision_loss)]
                let glyphs = run.glyphs.len() as f32;
                run.advance * scale + spacing * glyphs
            };
            let block_width = runs.iter().map(width_of).fold(0.0f32, f32::max);
            for (line, run) in runs.iter().enumerate() {
                let slack = block_width - width_of(run);
                let x = match self.text.align {
                    Align::Left => 0.0,
                    Align::Center => slack / 2.0,
                    Align::Right => slack,
                };
                #[allow(clippy::cast_precision_loss)]
                let top = line as f32 * self.text.font_size;
                self.emit_run(run, [x, top + baseline], &mut mesh)?;
            }
        }
        if self.text.style.contains(crate::state::text::TextStyle::UNDERLINE) {
            self.emit_underline(&mut mesh)?;
        }
        Ok(mesh)
    }
    /// Tessellate a run with its pen origin at `origin`, local units.
    fn emit_run(
        &mut self,
        run: &ShapedRun,
        [x, baseline]: [f32; 2],
        mesh: &mut Mesh,
    ) -> Result<(), lyon_tessellation::TessellationError> {
        let font_tolerance = self.tolerance / (self.scale * self.matrix.max_scale()).max(1e-6);
        let options = FillOptions::non_zero().with_tolerance(font_tolerance);
        for (i, &(glyph, [gx, gy])) in run.glyphs.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let pen = x + gx * self.scale + self.text.letter_spacing * i as f32;
            // Font units are y-up.
            let glyph_matrix = self.matrix
                * Matrix::translation(pen, baseline - gy * self.scale)
                * Matrix::scale(self.scale, -self.scale);
            let mut output = BuffersBuilder::new(mesh, move |vertex: FillVertex| {
                let position = vertex.position();
                glyph_matrix.apply([position.x, position.y])
            });
            let mut bridge = LyonBridge(self.tessellator.builder(&options, &mut output));
            if self.face.outline_glyph(glyph, &mut bridge).is_none() {
                // Whitespace and the like have no outline.
                continue;
            }
            let LyonBridge(builder) = bridge;
            builder.build()?;
        }
        Ok(())
    }
    fn emit_underline(&mut self, mesh: &mut Mesh) -> Result<(), lyon_tessellation::TessellationError> {
        use lyon_tessellation::math::point;
        let [x, y, width, height] = self.text.underline_rect();
        let matrix = self.matrix;
        let mut output = BuffersBuilder::new(mesh, move |vertex: FillVertex| {
            let position = vertex.position();
            matrix.apply([position.x, position.y])
        });
        let options = FillOptions::non_zero().with_tolerance(self.tolerance);
        let mut builder = self.tessellator.builder(&options, &mut output);
        builder.add_polygon(lyon_tessellation::path::Polygon {
            points: &[
                point(x, y),
                point(x + width, y),
                point(x + width, y + height),
                point(x, y + height),
            ],
            closed: true,
        });
        builder.build()
    }
}

#[cfg(test)]
mod test {
    use super::TextMesher;
    use crate::repositories::fonts::{FaceRequest, Fonts};
    use crate::state::text::{Align, TextDraft, TextObject, TextStyle};
    use crate::util::Rect;

    fn bounds(text: &TextObject, fonts: &Fonts) -> Option<Rect> {
        let request = FaceRequest {
            family: &text.font_family,
            bold: false,
            italic: false,
        };
        let mesh = fonts
            .with_face(request, |face| {
                TextMesher::new(face, text, text.transform.matrix(), 0.25).build()
            })
            .ok()?
            .ok()?;
        Rect::bounding(mesh.vertices.iter().copied())
    }
    #[test]
    fn glyphs_sit_in_the_em_box() {
        let fonts = Fonts::new_system();
        if fonts.is_empty() {
            // Nothing to shape with on this machine.
            return;
        }
        let text = TextObject::from_draft(TextDraft::new("H"));
        let Some(rect) = bounds(&text, &fonts) else {
            return;
        };
        // Placed at (50, 50), a capital stays within its own line.
        assert!(rect.x >= 50.0 - 1.0);
        assert!(rect.y >= 50.0 - 1.0);
        assert!(rect.bottom() <= 50.0 + text.font_size + 1.0);
    }
    #[test]
    fn right_align_shifts_short_lines() {
        let fonts = Fonts::new_system();
        if fonts.is_empty() {
            return;
        }
        let left = TextObject::from_draft(TextDraft::new("i\nWWWW"));
        let right = TextObject::from_draft(TextDraft {
            align: Align::Right,
            ..TextDraft::new("i\nWWWW")
        });
        let (Some(left), Some(right)) = (bounds(&left, &fonts), bounds(&right, &fonts)) else {
            return;
        };
        // The block is as wide either way, only the short line moves.
        assert!((left.width - right.width).abs() < 1.0);
        assert!(right.right() >= left.right() - 1.0);
    }
    #[test]
    fn underline_bar_is_meshed() {
        let fonts = Fonts::new_system();
        if fonts.is_empty() {
            return;
        }
        let text = TextObject::from_draft(TextDraft {
            style: TextStyle::UNDERLINE,
            ..TextDraft::new("ab")
        });
        let Some(rect) = bounds(&text, &fonts) else {
            return;
        };
        let [_, y, _, height] = text.underline_rect();
        assert!(rect.bottom() >= 50.0 + y + height - 0.01);
    }
}
