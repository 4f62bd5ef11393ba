//! # Editor
//!
//! One editing session over a [`Design`]: the undo history holding it, plus everything that
//! is *view* state rather than design state. That is the active tool, the selection, an
//! in-progress crop, the text dialog, tone adjustments, zoom and the recent uploads.
//!
//! All design edits go through [`Editor::write_with`] (or the helpers built on it) so each
//! user action lands in the history as exactly one snapshot.

use crate::history::{writer::HistoryWriter, History, DEFAULT_CAPACITY};
use crate::raster::{self, Adjustments, RasterError};
use crate::render::{Compositor, RenderError, RenderSettings};
use crate::repositories::fonts::Fonts;
use crate::repositories::images::{ImageId, Images};
use crate::state::graphics::{Arrange, CatalogArt, GraphicId, GraphicObject, TransformEnd};
use crate::state::text::{CopiedStyle, TextDraft, TextId, TextObject};
use crate::state::{Axis, BaseImage, CanvasSpec, Design, Transform};
use crate::util::Rect;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Discrete zoom steps of the stage.
pub const ZOOM_LEVELS: [f32; 9] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 3.0, 4.0];
/// Most recent uploads kept for quick re-use.
pub const MAX_RECENT_IMAGES: usize = 5;
/// Offset of a fresh crop rectangle from the image's top-left corner.
pub const CROP_INSET: f32 = 40.0;
/// Smallest side of a fresh crop rectangle.
pub const CROP_MIN_SIZE: f32 = 100.0;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EditorConfig {
    pub history_depth: NonZeroUsize,
    /// Uploads are downscaled so neither side exceeds this.
    pub max_dimension: u32,
    pub background_threshold: u8,
    pub canvas: CanvasSpec,
}
impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_CAPACITY,
            max_dimension: raster::DEFAULT_MAX_DIMENSION,
            background_threshold: raster::DEFAULT_BACKGROUND_THRESHOLD,
            canvas: CanvasSpec::default(),
        }
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::AsRefStr,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    #[default]
    Select,
    Text,
    Crop,
    Graphics,
    Erase,
    Adjust,
}

/// At most one thing is selected at a time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Image,
    Text(TextId),
    Graphic(GraphicId),
}

/// State of the add/edit text dialog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TextModal {
    #[default]
    Closed,
    /// Saving adds a new text.
    New,
    /// Saving replaces this text. It is hidden from the render meanwhile.
    Editing(TextId),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CropSession {
    /// In canvas space, axis aligned.
    pub rect: Rect,
}

/// Anchor points of one text, for mapping onto the mug.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnchors {
    pub text_id: u64,
    pub anchors: [[f32; 2]; 8],
}

#[derive(thiserror::Error, Debug)]
pub enum EditError {
    #[error("the design has no image")]
    NoImage,
    #[error("no crop in progress")]
    NotCropping,
    #[error("image {0} is no longer available")]
    MissingImage(ImageId),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub struct Editor {
    images: Arc<Images>,
    fonts: Arc<Fonts>,
    config: EditorConfig,
    history: History<Design>,
    tool: Tool,
    selection: Selection,
    crop: Option<CropSession>,
    text_modal: TextModal,
    copied_style: Option<CopiedStyle>,
    adjustments: Adjustments,
    zoom: f32,
    /// Newest first.
    recent: VecDeque<ImageId>,
}
impl Editor {
    #[must_use]
    pub fn new(images: Arc<Images>, fonts: Arc<Fonts>, config: EditorConfig) -> Self {
        let history = History::new(Design::new(config.canvas), config.history_depth);
        Self {
            images,
            fonts,
            config,
            history,
            tool: Tool::default(),
            selection: Selection::None,
            crop: None,
            text_modal: TextModal::Closed,
            copied_style: None,
            adjustments: Adjustments::IDENTITY,
            zoom: 1.0,
            recent: VecDeque::with_capacity(MAX_RECENT_IMAGES),
        }
    }
    #[must_use]
    pub fn design(&self) -> &Design {
        self.history.present()
    }
    #[must_use]
    pub fn history(&self) -> &History<Design> {
        &self.history
    }
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
    #[must_use]
    pub fn images(&self) -> &Arc<Images> {
        &self.images
    }
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }
    #[must_use]
    pub fn crop(&self) -> Option<&CropSession> {
        self.crop.as_ref()
    }
    #[must_use]
    pub fn text_modal(&self) -> TextModal {
        self.text_modal
    }
    #[must_use]
    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }
    pub fn set_adjustments(&mut self, adjustments: Adjustments) {
        self.adjustments = adjustments.clamped();
    }
    pub fn reset_adjustments(&mut self) {
        self.adjustments = Adjustments::IDENTITY;
    }
    /// Newest first.
    pub fn recent_images(&self) -> impl ExactSizeIterator<Item = ImageId> + '_ {
        self.recent.iter().copied()
    }

    /// Perform one grouped edit of the design. It becomes a single history entry, or none at
    /// all if nothing changed.
    pub fn write_with<R>(&mut self, write: impl FnOnce(&mut HistoryWriter<'_, Design>) -> R) -> R {
        let result = self.history.write_with(write);
        self.drop_stale_view_state();
        result
    }
    /// Forget selection and dialogs pointing at things the present design no longer has.
    fn drop_stale_view_state(&mut self) {
        let design = self.history.present();
        let stale = match self.selection {
            Selection::None => false,
            Selection::Image => design.image.is_none(),
            Selection::Text(id) => design.texts.get(id).is_none(),
            Selection::Graphic(id) => design.graphics.get(id).is_none(),
        };
        if stale {
            log::trace!("dropping stale selection {:?}", self.selection);
            self.selection = Selection::None;
        }
        if let TextModal::Editing(id) = self.text_modal {
            if design.texts.get(id).is_none() {
                self.text_modal = TextModal::Closed;
            }
        }
        if design.image.is_none() {
            self.crop = None;
        }
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.tool = tool;
        match tool {
            Tool::Text => {
                self.text_modal = TextModal::New;
                self.selection = Selection::None;
            }
            Tool::Crop => {
                if self.begin_crop().is_err() {
                    self.tool = Tool::Select;
                }
            }
            Tool::Select => {
                self.crop = None;
            }
            Tool::Erase => {
                self.selection = Selection::None;
            }
            Tool::Graphics | Tool::Adjust => {
                self.selection = Selection::None;
                self.crop = None;
            }
        }
        if tool != Tool::Text {
            self.text_modal = TextModal::Closed;
        }
    }
    /// Select something, replacing any previous selection. Returns false, leaving the
    /// selection alone, if the target doesn't exist.
    pub fn select(&mut self, selection: Selection) -> bool {
        let design = self.design();
        let exists = match selection {
            Selection::None => true,
            Selection::Image => design.image.is_some(),
            Selection::Text(id) => design.texts.get(id).is_some(),
            Selection::Graphic(id) => design.graphics.get(id).is_some(),
        };
        if exists {
            self.selection = selection;
        }
        exists
    }

    /// Decode an upload, downscale it, and make it the design's image.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<ImageId, EditError> {
        let decoded = raster::decode(bytes)?;
        let resized = raster::resize_to_max(decoded, self.config.max_dimension);
        let size = [resized.width(), resized.height()];
        let id = self.images.insert(resized);
        self.install_image(id, size);
        log::info!("loaded {}x{} image {id}", size[0], size[1]);
        Ok(id)
    }
    /// Re-use a previous upload.
    pub fn load_recent(&mut self, id: ImageId) -> Result<(), EditError> {
        let size = self
            .images
            .dimensions(id)
            .ok_or(EditError::MissingImage(id))?;
        self.install_image(id, size);
        Ok(())
    }
    fn install_image(&mut self, id: ImageId, size: [u32; 2]) {
        self.write_with(|design| design.set_image(id, size));
        self.selection = Selection::Image;
        self.crop = None;
        self.reset_adjustments();
        self.recent.retain(|&recent| recent != id);
        self.recent.push_front(id);
        self.recent.truncate(MAX_RECENT_IMAGES);
    }
    /// Commit the image's placement after a drag, rotation or resize. False without an image.
    pub fn transform_image(&mut self, transform: Transform) -> bool {
        self.write_with(|design| {
            let image = design.image.as_mut()?;
            image.transform = transform;
            Some(())
        })
        .is_some()
    }
    /// Remove the image, and with it every text.
    pub fn remove_image(&mut self) {
        self.write_with(|design| design.remove_image());
    }

    /// Start cropping with a rectangle inset into the image's bounds.
    pub fn begin_crop(&mut self) -> Result<&CropSession, EditError> {
        let bounds = self
            .design()
            .image
            .as_ref()
            .ok_or(EditError::NoImage)?
            .bounding_box();
        self.tool = Tool::Crop;
        self.selection = Selection::None;
        Ok(self.crop.insert(CropSession {
            rect: Rect::new(
                bounds.x + CROP_INSET,
                bounds.y + CROP_INSET,
                (bounds.width / 2.0).max(CROP_MIN_SIZE),
                (bounds.height / 2.0).max(CROP_MIN_SIZE),
            ),
        }))
    }
    /// Move or resize the crop rectangle.
    pub fn set_crop_rect(&mut self, rect: Rect) -> Result<(), EditError> {
        let crop = self.crop.as_mut().ok_or(EditError::NotCropping)?;
        crop.rect = rect;
        Ok(())
    }
    pub fn cancel_crop(&mut self) {
        self.crop = None;
        if self.tool == Tool::Crop {
            self.tool = Tool::Select;
        }
    }
    /// Replace the image with the region under the crop rectangle, at the rectangle's on-screen
    /// size, centered on the canvas.
    pub fn apply_crop(&mut self) -> Result<ImageId, EditError> {
        let rect = self.crop.ok_or(EditError::NotCropping)?.rect;
        let base = self.design().image.ok_or(EditError::NoImage)?;
        let pixels = self
            .images
            .get(base.source)
            .ok_or(EditError::MissingImage(base.source))?;

        let Transform {
            x,
            y,
            scale_x,
            scale_y,
            ..
        } = base.transform;
        // The crop rect is axis aligned on the canvas, so image rotation is ignored here.
        let source_rect = Rect::new(
            (rect.x - x) / scale_x,
            (rect.y - y) / scale_y,
            rect.width / scale_x,
            rect.height / scale_y,
        );
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let out_size = [rect.width.round() as u32, rect.height.round() as u32];
        let cropped = raster::crop(&pixels, source_rect, out_size)?;
        let id = self.images.insert(cropped);

        let canvas = self.design().canvas.size();
        self.write_with(|design| design.image = Some(BaseImage::centered(id, out_size, canvas)));
        self.crop = None;
        self.tool = Tool::Select;
        self.selection = Selection::Image;
        log::debug!("cropped to {}x{}", out_size[0], out_size[1]);
        Ok(id)
    }
    /// Make near-white pixels of the image transparent. Returns how many were cleared. Nothing
    /// is committed when no pixel qualified.
    pub fn remove_background(&mut self) -> Result<usize, EditError> {
        let base = self.design().image.ok_or(EditError::NoImage)?;
        let pixels = self
            .images
            .get(base.source)
            .ok_or(EditError::MissingImage(base.source))?;
        let mut cleared = (*pixels).clone();
        let count = raster::remove_background(&mut cleared, self.config.background_threshold);
        if count == 0 {
            return Ok(0);
        }
        let id = self.images.insert(cleared);
        self.write_with(|design| {
            if let Some(image) = &mut design.image {
                image.source = id;
            }
        });
        Ok(count)
    }

    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        self.after_time_travel();
        true
    }
    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        self.after_time_travel();
        true
    }
    fn after_time_travel(&mut self) {
        self.reset_adjustments();
        self.drop_stale_view_state();
    }

    /// Open the dialog on an existing text. Refused for locked texts.
    pub fn begin_text_edit(&mut self, id: TextId) -> bool {
        match self.design().texts.get(id) {
            Some(text) if !text.locked => {
                self.text_modal = TextModal::Editing(id);
                self.selection = Selection::Text(id);
                true
            }
            _ => false,
        }
    }
    /// Save the dialog: replaces the text being edited, or adds a new one. The saved text is
    /// selected and the dialog closed.
    pub fn save_text(&mut self, draft: TextDraft) -> Option<TextId> {
        let modal = std::mem::take(&mut self.text_modal);
        let id = match modal {
            TextModal::Editing(id) => self
                .write_with(|design| design.texts.save(id, draft))
                .then_some(id)?,
            TextModal::New | TextModal::Closed => {
                self.write_with(|design| design.texts.add(draft))
            }
        };
        self.selection = Selection::Text(id);
        Some(id)
    }
    pub fn close_text_modal(&mut self) {
        self.text_modal = TextModal::Closed;
    }
    /// Run `edit` on one text as a single history entry.
    pub fn update_text<R>(&mut self, id: TextId, edit: impl FnOnce(&mut TextObject) -> R) -> Option<R> {
        self.write_with(|design| design.texts.update(id, edit))
    }
    /// Move/rotate/scale a text. Refused for locked texts.
    pub fn transform_text(&mut self, id: TextId, transform: Transform) -> bool {
        self.write_with(|design| design.texts.transform(id, transform))
    }
    pub fn rotate_text(&mut self, id: TextId, degrees: f32) -> bool {
        self.write_with(|design| design.texts.rotate(id, degrees))
    }
    pub fn flip_text(&mut self, id: TextId, axis: Axis) -> bool {
        self.write_with(|design| design.texts.flip(id, axis))
    }
    pub fn duplicate_text(&mut self, id: TextId) -> Option<TextId> {
        let copy = self.write_with(|design| design.texts.duplicate(id))?;
        self.selection = Selection::Text(copy);
        Some(copy)
    }
    pub fn toggle_text_lock(&mut self, id: TextId) -> Option<bool> {
        self.write_with(|design| design.texts.toggle_lock(id))
    }
    pub fn delete_text(&mut self, id: TextId) -> bool {
        self.write_with(|design| design.texts.delete(id)).is_some()
    }
    /// Remember a text's style for [`Self::paste_style`].
    pub fn copy_style(&mut self, id: TextId) -> bool {
        self.copied_style = self.design().texts.get(id).map(TextObject::copy_style);
        self.copied_style.is_some()
    }
    pub fn paste_style(&mut self, id: TextId) -> bool {
        let Some(style) = self.copied_style.clone() else {
            return false;
        };
        self.update_text(id, |text| text.paste_style(&style)).is_some()
    }

    /// Place a catalog item and select it.
    pub fn add_graphic(&mut self, art: CatalogArt) -> GraphicId {
        let graphic = crate::state::graphics::create_graphic(art);
        let id = self.write_with(|design| design.graphics.add(graphic));
        self.selection = Selection::Graphic(id);
        id
    }
    pub fn update_graphic<R>(
        &mut self,
        id: GraphicId,
        edit: impl FnOnce(&mut GraphicObject) -> R,
    ) -> Option<R> {
        self.write_with(|design| design.graphics.update(id, edit))
    }
    /// Commit the result of an interactive transform.
    pub fn end_graphic_transform(&mut self, id: GraphicId, end: TransformEnd) -> bool {
        self.write_with(|design| design.graphics.apply_transform_end(id, end))
    }
    pub fn set_graphic_opacity(&mut self, id: GraphicId, percent: f32) -> bool {
        self.write_with(|design| design.graphics.set_opacity_percent(id, percent))
    }
    pub fn set_graphic_border(&mut self, id: GraphicId, width: f32) -> bool {
        self.write_with(|design| design.graphics.set_border_width(id, width))
    }
    pub fn duplicate_graphic(&mut self, id: GraphicId) -> Option<GraphicId> {
        let copy = self.write_with(|design| design.graphics.duplicate(id))?;
        self.selection = Selection::Graphic(copy);
        Some(copy)
    }
    pub fn toggle_graphic_lock(&mut self, id: GraphicId) -> Option<bool> {
        self.write_with(|design| design.graphics.toggle_lock(id))
    }
    pub fn delete_graphic(&mut self, id: GraphicId) -> bool {
        self.write_with(|design| design.graphics.delete(id)).is_some()
    }
    #[allow(clippy::cast_precision_loss)]
    pub fn center_graphic(&mut self, id: GraphicId) -> bool {
        self.write_with(|design| {
            let width = design.canvas.width as f32;
            design.graphics.center(id, width)
        })
    }
    #[allow(clippy::cast_precision_loss)]
    pub fn middle_graphic(&mut self, id: GraphicId) -> bool {
        self.write_with(|design| {
            let height = design.canvas.height as f32;
            design.graphics.middle(id, height)
        })
    }
    pub fn arrange_graphic(&mut self, id: GraphicId, arrange: Arrange) -> bool {
        self.write_with(|design| design.graphics.arrange(id, arrange))
    }

    /// The Delete/Backspace key: removes the selected text or graphic. Texts are left alone
    /// while the text dialog is open, as the key belongs to the dialog then.
    pub fn delete_selected(&mut self) -> bool {
        match self.selection {
            Selection::Text(id) if self.text_modal == TextModal::Closed => self.delete_text(id),
            Selection::Graphic(id) => self.delete_graphic(id),
            _ => false,
        }
    }

    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }
    /// Set any zoom, clamped to the range of [`ZOOM_LEVELS`].
    pub fn set_zoom(&mut self, zoom: f32) {
        let [min, .., max] = ZOOM_LEVELS;
        if zoom.is_finite() {
            self.zoom = zoom.clamp(min, max);
        }
    }
    /// Step to the next larger level.
    pub fn zoom_in(&mut self) {
        if let Some(current) = self.level_index() {
            if let Some(&next) = ZOOM_LEVELS.get(current + 1) {
                self.zoom = next;
            }
        }
    }
    /// Step to the next smaller level.
    pub fn zoom_out(&mut self) {
        if let Some(current) = self.level_index() {
            if let Some(prev) = current.checked_sub(1) {
                self.zoom = ZOOM_LEVELS[prev];
            }
        }
    }
    /// Index of the smallest level not below the current zoom. A free zoom between two levels
    /// counts as the upper one.
    fn level_index(&self) -> Option<usize> {
        ZOOM_LEVELS
            .iter()
            .position(|&level| level >= self.zoom - 0.001)
    }
    /// Offset of the zoomed stage that keeps the canvas centered in its unzoomed frame.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stage_offset(&self) -> [f32; 2] {
        let CanvasSpec { width, height, .. } = self.design().canvas;
        let (width, height) = (width as f32, height as f32);
        [
            (width - width * self.zoom) / 2.0,
            (height - height * self.zoom) / 2.0,
        ]
    }

    fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            adjustments: self.adjustments,
            hidden_text: match self.text_modal {
                TextModal::Editing(id) => Some(id),
                TextModal::New | TextModal::Closed => None,
            },
        }
    }
    /// Flatten the whole design, as shown on the stage.
    pub fn composite(&self) -> Result<image::RgbaImage, EditError> {
        Ok(Compositor::new(&self.images, &self.fonts)
            .composite(self.design(), &self.render_settings())?)
    }
    /// The texture for the mug model. See [`Compositor::texture`].
    pub fn texture(&self) -> Result<image::RgbaImage, EditError> {
        Ok(Compositor::new(&self.images, &self.fonts)
            .texture(self.design(), &self.render_settings())?)
    }
    #[must_use]
    pub fn text_anchors(&self) -> Vec<TextAnchors> {
        self.design()
            .texts
            .iter()
            .map(|text| TextAnchors {
                text_id: text.id.raw(),
                anchors: text.anchors(),
            })
            .collect()
    }

    /// Replace the whole session with `design`, forgetting all history. Used on import.
    pub fn reset_to(&mut self, design: Design) {
        self.history = History::new(design, self.config.history_depth);
        self.selection = Selection::None;
        self.crop = None;
        self.text_modal = TextModal::Closed;
        self.tool = Tool::Select;
        self.reset_adjustments();
    }

    /// Release stored images no longer reachable from the history or the recent list.
    ///
    /// Only sound while this editor is the sole user of its image repository.
    pub fn collect_garbage(&self) -> usize {
        let mut live: hashbrown::HashSet<ImageId> = self.recent.iter().copied().collect();
        for design in self.history.iter() {
            live.extend(design.referenced_images());
        }
        self.images.retain(|id| live.contains(&id))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::graphics::{BasicShape, Variant};

    fn editor() -> Editor {
        Editor::new(
            Arc::new(Images::new()),
            Arc::new(Fonts::empty()),
            EditorConfig::default(),
        )
    }
    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
        crate::render::encode_png(&image).unwrap()
    }
    /// Red on the left half, blue on the right.
    fn split_png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        crate::render::encode_png(&image).unwrap()
    }
    fn is_red(pixel: image::Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        r > 200 && g < 50 && b < 50 && a == 255
    }
    fn is_blue(pixel: image::Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        r < 50 && g < 50 && b > 200 && a == 255
    }
    fn square() -> CatalogArt {
        CatalogArt::Shape {
            shape: BasicShape::Square,
            variant: Variant::Solid,
        }
    }

    #[test]
    fn load_selects_and_fits() {
        let mut editor = editor();
        editor.set_adjustments(Adjustments {
            brightness: 50.0,
            ..Adjustments::IDENTITY
        });
        let id = editor.load_image(&png(2000, 1000, [255, 0, 0, 255])).unwrap();
        assert_eq!(editor.selection(), Selection::Image);
        assert!(editor.adjustments().is_identity());
        assert_eq!(editor.images().dimensions(id), Some([1024, 512]));
        let image = editor.design().image.unwrap();
        assert_eq!(image.size, [1024, 512]);
        // Fit height 200 of the padded 900x300 canvas.
        assert!((image.transform.scale_x - 200.0 / 512.0).abs() < 1e-5);
        assert!(editor.history().can_undo());
    }
    #[test]
    fn recent_dedups_and_caps() {
        let mut editor = editor();
        let mut ids = Vec::new();
        for _ in 0..7 {
            ids.push(editor.load_image(&png(4, 4, [0; 4])).unwrap());
        }
        let recent: Vec<_> = editor.recent_images().collect();
        assert_eq!(recent.len(), MAX_RECENT_IMAGES);
        assert_eq!(recent[0], ids[6]);

        editor.load_recent(ids[4]).unwrap();
        let recent: Vec<_> = editor.recent_images().collect();
        assert_eq!(recent.len(), MAX_RECENT_IMAGES);
        assert_eq!(recent[0], ids[4]);
        assert_eq!(recent.iter().filter(|&&id| id == ids[4]).count(), 1);
    }
    #[test]
    fn crop_tool_needs_image() {
        let mut editor = editor();
        editor.select_tool(Tool::Crop);
        assert_eq!(editor.tool(), Tool::Select);
        assert!(editor.crop().is_none());

        editor.load_image(&png(400, 200, [0, 0, 255, 255])).unwrap();
        editor.select_tool(Tool::Crop);
        assert_eq!(editor.tool(), Tool::Crop);
        assert_eq!(editor.selection(), Selection::None);
        let crop = editor.crop().unwrap();
        // 400x200 image fits 800x200 at scale 1, so its bounds are (250, 50, 400, 200).
        assert_eq!(crop.rect, Rect::new(290.0, 90.0, 200.0, 100.0));

        editor.select_tool(Tool::Select);
        assert!(editor.crop().is_none());
    }
    #[test]
    fn apply_crop_centers_result() {
        let mut editor = editor();
        editor.load_image(&png(400, 200, [0, 255, 0, 255])).unwrap();
        editor.begin_crop().unwrap();
        editor
            .set_crop_rect(Rect::new(300.0, 100.0, 120.0, 60.0))
            .unwrap();
        let id = editor.apply_crop().unwrap();
        let image = editor.design().image.unwrap();
        assert_eq!(image.source, id);
        assert_eq!(image.size, [120, 60]);
        assert_eq!(image.transform, Transform::at(390.0, 120.0));
        assert_eq!(editor.tool(), Tool::Select);
        assert_eq!(editor.selection(), Selection::Image);
        assert!(editor.crop().is_none());
        let pixels = editor.images().get(id).unwrap();
        assert_eq!(pixels.get_pixel(60, 30).0, [0, 255, 0, 255]);

        assert!(matches!(editor.apply_crop(), Err(EditError::NotCropping)));
    }
    #[test]
    fn crop_maps_through_fit_scale() {
        let mut editor = editor();
        // Stored at 1024x512, fitted into the 800x200 padded canvas at 200/512.
        editor.load_image(&split_png(2000, 1000)).unwrap();
        let fitted = editor.design().image.unwrap().transform;
        assert_eq!((fitted.x, fitted.y), (250.0, 50.0));
        assert!((fitted.scale_x - 0.390_625).abs() < 1e-6);

        editor.begin_crop().unwrap();
        // The color boundary sits at canvas x 450, halfway through this rect.
        editor
            .set_crop_rect(Rect::new(400.0, 100.0, 100.0, 50.0))
            .unwrap();
        let id = editor.apply_crop().unwrap();
        let pixels = editor.images().get(id).unwrap();
        assert_eq!(pixels.dimensions(), (100, 50));
        assert!(is_red(*pixels.get_pixel(10, 25)));
        assert!(is_red(*pixels.get_pixel(40, 25)));
        assert!(is_blue(*pixels.get_pixel(60, 25)));
        assert!(is_blue(*pixels.get_pixel(90, 25)));
    }
    #[test]
    fn image_transform_is_undoable_and_cropped_through() {
        let mut editor = editor();
        assert!(!editor.transform_image(Transform::at(0.0, 0.0)));
        editor.load_image(&split_png(400, 200)).unwrap();
        let fitted = editor.design().image.unwrap().transform;
        assert_eq!(fitted, Transform::at(250.0, 50.0));

        let steps = editor.history().len();
        let moved = Transform::uniform(100.0, 50.0, 0.5);
        assert!(editor.transform_image(moved));
        assert_eq!(editor.history().len(), steps + 1);
        assert!(editor.undo());
        assert_eq!(editor.design().image.unwrap().transform, fitted);
        assert!(editor.redo());
        assert_eq!(editor.design().image.unwrap().transform, moved);

        // The image now covers canvas x 100..300 with its color boundary at 200.
        editor.begin_crop().unwrap();
        editor
            .set_crop_rect(Rect::new(150.0, 60.0, 100.0, 40.0))
            .unwrap();
        let id = editor.apply_crop().unwrap();
        let pixels = editor.images().get(id).unwrap();
        assert_eq!(pixels.dimensions(), (100, 40));
        assert!(is_red(*pixels.get_pixel(20, 20)));
        assert!(is_blue(*pixels.get_pixel(80, 20)));
    }
    #[test]
    fn remove_background_commits_new_image() {
        let mut editor = editor();
        editor.load_image(&png(4, 4, [250, 250, 250, 255])).unwrap();
        let before = editor.design().image.unwrap().source;
        let steps = editor.history().len();
        assert_eq!(editor.remove_background().unwrap(), 16);
        let after = editor.design().image.unwrap().source;
        assert_ne!(before, after);
        assert_eq!(editor.history().len(), steps + 1);
        assert_eq!(editor.images().get(after).unwrap().get_pixel(0, 0).0[3], 0);
        // Second pass finds nothing left and commits nothing.
        assert_eq!(editor.remove_background().unwrap(), 0);
        assert_eq!(editor.history().len(), steps + 1);
    }
    #[test]
    fn undo_resets_adjustments_and_selection() {
        let mut editor = editor();
        let id = editor.add_graphic(square());
        assert_eq!(editor.selection(), Selection::Graphic(id));
        editor.set_adjustments(Adjustments {
            hue: 90.0,
            ..Adjustments::IDENTITY
        });
        assert!(editor.undo());
        assert!(editor.design().graphics.is_empty());
        assert_eq!(editor.selection(), Selection::None);
        assert!(editor.adjustments().is_identity());
        assert!(!editor.undo());

        assert!(editor.redo());
        assert!(editor.design().graphics.get(id).is_some());
        assert!(!editor.redo());
    }
    #[test]
    fn text_modal_flow() {
        let mut editor = editor();
        editor.select_tool(Tool::Text);
        assert_eq!(editor.text_modal(), TextModal::New);
        let id = editor.save_text(TextDraft::new("hello")).unwrap();
        assert_eq!(editor.text_modal(), TextModal::Closed);
        assert_eq!(editor.selection(), Selection::Text(id));

        assert!(editor.begin_text_edit(id));
        assert_eq!(editor.render_settings().hidden_text, Some(id));
        // Delete belongs to the dialog while it's open.
        assert!(!editor.delete_selected());
        let saved = editor.save_text(TextDraft::new("bye")).unwrap();
        assert_eq!(saved, id);
        assert_eq!(editor.design().texts.get(id).unwrap().content, "bye");
        assert_eq!(editor.render_settings().hidden_text, None);

        editor.toggle_text_lock(id);
        assert!(!editor.begin_text_edit(id));

        assert!(editor.delete_selected());
        assert!(editor.design().texts.is_empty());
        assert_eq!(editor.selection(), Selection::None);
    }
    #[test]
    fn one_action_one_snapshot() {
        let mut editor = editor();
        let id = editor.add_graphic(square());
        let steps = editor.history().len();
        editor.write_with(|design| {
            design.graphics.center(id, 900.0);
            design.graphics.middle(id, 300.0);
        });
        assert_eq!(editor.history().len(), steps + 1);
        // No-op edits leave no trace.
        editor.center_graphic(id);
        assert_eq!(editor.history().len(), steps + 1);
    }
    #[test]
    fn copy_paste_style() {
        let mut editor = editor();
        let bold = editor
            .save_text(TextDraft {
                font_size: 48.0,
                ..TextDraft::new("big")
            })
            .unwrap();
        let plain = editor.save_text(TextDraft::new("small")).unwrap();
        assert!(!editor.paste_style(plain));
        assert!(editor.copy_style(bold));
        assert!(editor.paste_style(plain));
        assert_eq!(editor.design().texts.get(plain).unwrap().font_size, 48.0);
    }
    #[test]
    fn zoom_steps_and_clamps() {
        let mut editor = editor();
        editor.zoom_in();
        assert_eq!(editor.zoom(), 1.25);
        editor.set_zoom(1.1);
        editor.zoom_out();
        assert_eq!(editor.zoom(), 1.0);
        editor.set_zoom(100.0);
        assert_eq!(editor.zoom(), 4.0);
        editor.zoom_in();
        assert_eq!(editor.zoom(), 4.0);
        editor.set_zoom(0.0);
        assert_eq!(editor.zoom(), 0.25);
        editor.zoom_out();
        assert_eq!(editor.zoom(), 0.25);

        editor.set_zoom(2.0);
        assert_eq!(editor.stage_offset(), [-450.0, -150.0]);
    }
    #[test]
    fn garbage_collection_keeps_history() {
        let mut editor = editor();
        editor.load_image(&png(4, 4, [250, 250, 250, 255])).unwrap();
        editor.remove_background().unwrap();
        assert_eq!(editor.images().len(), 2);
        // Both are reachable, one through undo.
        assert_eq!(editor.collect_garbage(), 0);
        editor.reset_to(editor.design().clone());
        editor.recent.clear();
        assert_eq!(editor.collect_garbage(), 1);
        assert_eq!(editor.images().len(), 1);
    }
    #[test]
    fn anchors_per_text() {
        let mut editor = editor();
        editor.save_text(TextDraft::new("a"));
        editor.save_text(TextDraft::new("b"));
        let anchors = editor.text_anchors();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].anchors[0], [50.0, 50.0]);
    }
}
