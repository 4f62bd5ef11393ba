//! # Text
//!
//! Free-standing text objects laid over the image. Each carries its own style and transform
//! and is drawn above every graphic, in collection order.

use super::transform::{Axis, Transform};
use crate::color::Color;
use unicode_segmentation::UnicodeSegmentation;

pub type TextId = crate::ObjectId<TextObject>;

/// Families offered by the text tools. Any other family name is accepted and resolved
/// through the font database like these are.
pub const FONT_FAMILIES: [&str; 8] = [
    "Inter",
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Georgia",
    "Courier New",
    "Verdana",
    "Palatino",
];
/// Preset sizes offered by the size picker.
pub const FONT_SIZES: [u32; 17] = [
    8, 10, 12, 14, 16, 18, 20, 24, 28, 32, 36, 42, 48, 56, 64, 72, 96,
];
pub const DEFAULT_FAMILY: &str = "Inter";
pub const DEFAULT_SIZE: f32 = 24.0;
/// Smallest size reachable by [`TextObject::decrease_size`].
pub const MIN_STEP_SIZE: f32 = 8.0;
/// Where newly added text is placed.
pub const NEW_TEXT_POSITION: [f32; 2] = [50.0, 50.0];
pub const DUPLICATE_OFFSET: f32 = 20.0;
pub const BULLET: &str = "\u{2022} ";
/// Approximate advance of one glyph, as a fraction of the font size. Used for layout estimates
/// that must not depend on which fonts are installed.
pub const ADVANCE_RATIO: f32 = 1.0 / 1.7;

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct TextStyle: u8 {
        const BOLD = 1;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::EnumIter,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CurveType {
    FullCurveUp,
    SlightCurveUp,
    #[default]
    Straight,
    SlightCurveDown,
    FullCurveDown,
}
impl CurveType {
    /// Vertical displacement per squared glyph index, relative to font size.
    /// Negative bends the ends downward into an arch.
    #[must_use]
    pub fn curvature(self) -> f32 {
        match self {
            Self::FullCurveUp => -0.04,
            Self::SlightCurveUp => -0.01,
            Self::Straight => 0.0,
            Self::SlightCurveDown => 0.01,
            Self::FullCurveDown => 0.04,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Case {
    Upper,
    Lower,
    /// Left as typed.
    Mixed,
}

/// The fields edited through the text dialog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextDraft {
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    pub fill: Color,
    pub style: TextStyle,
    pub align: Align,
}
impl Default for TextDraft {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_family: DEFAULT_FAMILY.to_owned(),
            font_size: DEFAULT_SIZE,
            fill: Color::BLACK,
            style: TextStyle::empty(),
            align: Align::Left,
        }
    }
}
impl TextDraft {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Style shared by copy and paste style.
#[derive(Clone, Debug, PartialEq)]
pub struct CopiedStyle {
    pub font_family: String,
    pub font_size: f32,
    pub fill: Color,
    pub style: TextStyle,
    pub align: Align,
    pub letter_spacing: f32,
    pub opacity: f32,
    pub curve: CurveType,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextObject {
    /// Not persisted, loaded texts are given fresh IDs.
    #[serde(skip, default)]
    pub id: TextId,
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    pub fill: Color,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub letter_spacing: f32,
    #[serde(default = "one")]
    pub opacity: f32,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub curve: CurveType,
    #[serde(default)]
    pub locked: bool,
}
fn one() -> f32 {
    1.0
}
impl TextObject {
    /// A new text from the dialog, placed at the default position.
    #[must_use]
    pub fn from_draft(draft: TextDraft) -> Self {
        let [x, y] = NEW_TEXT_POSITION;
        Self {
            id: TextId::fresh(),
            content: draft.content,
            font_family: draft.font_family,
            font_size: draft.font_size,
            fill: draft.fill,
            style: draft.style,
            align: draft.align,
            letter_spacing: 0.0,
            opacity: 1.0,
            transform: Transform::at(x, y),
            curve: CurveType::Straight,
            locked: false,
        }
    }
    /// The dialog fields of this text, to pre-fill an edit.
    #[must_use]
    pub fn draft(&self) -> TextDraft {
        TextDraft {
            content: self.content.clone(),
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            fill: self.fill,
            style: self.style,
            align: self.align,
        }
    }
    /// Overwrite the dialog fields, keeping placement and the rest of the style.
    pub fn apply_draft(&mut self, draft: TextDraft) {
        self.content = draft.content;
        self.font_family = draft.font_family;
        self.font_size = draft.font_size;
        self.fill = draft.fill;
        self.style = draft.style;
        self.align = draft.align;
    }
    /// Number of user-perceived characters.
    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.content.graphemes(true).count()
    }
    pub fn increase_size(&mut self) {
        self.font_size += 2.0;
    }
    pub fn decrease_size(&mut self) {
        self.font_size = (self.font_size - 2.0).max(MIN_STEP_SIZE);
    }
    pub fn toggle_style(&mut self, style: TextStyle) {
        self.style.toggle(style);
    }
    /// Add a bullet before the content, or remove it if already present.
    pub fn toggle_bullet(&mut self) {
        if let Some(rest) = self.content.strip_prefix(BULLET) {
            self.content = rest.to_owned();
        } else {
            self.content.insert_str(0, BULLET);
        }
    }
    pub fn increase_letter_spacing(&mut self) {
        self.letter_spacing += 1.0;
    }
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
    pub fn change_case(&mut self, case: Case) {
        match case {
            Case::Upper => self.content = self.content.to_uppercase(),
            Case::Lower => self.content = self.content.to_lowercase(),
            Case::Mixed => (),
        }
    }
    #[must_use]
    pub fn copy_style(&self) -> CopiedStyle {
        CopiedStyle {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            fill: self.fill,
            style: self.style,
            align: self.align,
            letter_spacing: self.letter_spacing,
            opacity: self.opacity,
            curve: self.curve,
        }
    }
    pub fn paste_style(&mut self, style: &CopiedStyle) {
        self.font_family.clone_from(&style.font_family);
        self.font_size = style.font_size;
        self.fill = style.fill;
        self.style = style.style;
        self.align = style.align;
        self.letter_spacing = style.letter_spacing;
        self.opacity = style.opacity;
        self.curve = style.curve;
    }
    /// Estimated unscaled size of the text block, `[width, height]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimated_size(&self) -> [f32; 2] {
        let len = self.glyph_count().max(1) as f32;
        [len * self.font_size * ADVANCE_RATIO, self.font_size]
    }
    /// Eight points around the estimated text block in canvas space: corners and edge
    /// midpoints, clockwise from the top-left.
    #[must_use]
    pub fn anchors(&self) -> [[f32; 2]; 8] {
        let [w, h] = self.estimated_size();
        let matrix = self.transform.matrix();
        [
            [0.0, 0.0],
            [w / 2.0, 0.0],
            [w, 0.0],
            [w, h / 2.0],
            [w, h],
            [w / 2.0, h],
            [0.0, h],
            [0.0, h / 2.0],
        ]
        .map(|point| matrix.apply(point))
    }
    /// Local offset of each grapheme along the curve, or None when laid out straight.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn curve_offsets(&self) -> Option<Vec<[f32; 2]>> {
        let curvature = self.curve.curvature();
        if curvature == 0.0 {
            return None;
        }
        let half = self.glyph_count() as f32 / 2.0;
        let advance = self.font_size * ADVANCE_RATIO;
        Some(
            (0..self.glyph_count())
                .map(|i| {
                    let i = i as f32;
                    [i * advance, (i - half).powi(2) * curvature * self.font_size]
                })
                .collect(),
        )
    }
    /// Local rect of the underline bar, `[x, y, width, height]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn underline_rect(&self) -> [f32; 4] {
        let len = self.glyph_count() as f32;
        [0.0, self.font_size, len * self.font_size / 2.0, 2.0]
    }
}

/// Ordered texts of a design. Later texts draw above earlier ones.
#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TextCollection {
    texts: Vec<TextObject>,
}
impl TextCollection {
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TextObject> + '_ {
        self.texts.iter()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
    #[must_use]
    pub fn get(&self, id: TextId) -> Option<&TextObject> {
        self.texts.iter().find(|text| text.id == id)
    }
    pub fn get_mut(&mut self, id: TextId) -> Option<&mut TextObject> {
        self.texts.iter_mut().find(|text| text.id == id)
    }
    pub fn clear(&mut self) {
        self.texts.clear();
    }
    /// Append an existing object. Used when loading.
    pub fn push(&mut self, text: TextObject) -> TextId {
        let id = text.id;
        self.texts.push(text);
        id
    }
    pub fn add(&mut self, draft: TextDraft) -> TextId {
        let text = TextObject::from_draft(draft);
        log::trace!("adding {} {:?}", text.id, text.content);
        self.push(text)
    }
    /// Apply a dialog save to an existing text. False if it doesn't exist.
    pub fn save(&mut self, id: TextId, draft: TextDraft) -> bool {
        self.update(id, |text| text.apply_draft(draft)).is_some()
    }
    pub fn delete(&mut self, id: TextId) -> Option<TextObject> {
        let idx = self.texts.iter().position(|text| text.id == id)?;
        Some(self.texts.remove(idx))
    }
    /// Run `f` on the text if it exists.
    pub fn update<R>(&mut self, id: TextId, f: impl FnOnce(&mut TextObject) -> R) -> Option<R> {
        self.get_mut(id).map(f)
    }
    /// Replace the placement of an unlocked text. False if missing or locked.
    pub fn transform(&mut self, id: TextId, transform: Transform) -> bool {
        match self.get_mut(id) {
            Some(text) if !text.locked => {
                text.transform = transform;
                true
            }
            _ => false,
        }
    }
    pub fn rotate(&mut self, id: TextId, degrees: f32) -> bool {
        self.update(id, |text| text.transform.rotate_by(degrees))
            .is_some()
    }
    pub fn flip(&mut self, id: TextId, axis: Axis) -> bool {
        self.update(id, |text| text.transform.flip(axis)).is_some()
    }
    /// Copy a text, offset down and to the right, appended on top. Returns the copy's ID.
    pub fn duplicate(&mut self, id: TextId) -> Option<TextId> {
        let mut copy = self.get(id)?.clone();
        copy.id = TextId::fresh();
        copy.transform.translate(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        Some(self.push(copy))
    }
    /// Flip the lock. Returns the new lock state.
    pub fn toggle_lock(&mut self, id: TextId) -> Option<bool> {
        self.update(id, |text| {
            text.locked = !text.locked;
            text.locked
        })
    }
}
impl<'a> IntoIterator for &'a TextCollection {
    type Item = &'a TextObject;
    type IntoIter = std::slice::Iter<'a, TextObject>;
    fn into_iter(self) -> Self::IntoIter {
        self.texts.iter()
    }
}
