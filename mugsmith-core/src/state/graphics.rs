//! # Graphics
//!
//! Vector shapes and built-in icons placed over the image. Collection order is z-order, the
//! last graphic draws on top (but still below all text).

use super::transform::Transform;
use crate::color::Color;

pub type GraphicId = crate::ObjectId<GraphicObject>;

/// Where newly created graphics are placed.
pub const NEW_GRAPHIC_POSITION: [f32; 2] = [350.0, 200.0];
pub const DUPLICATE_OFFSET: f32 = 20.0;
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
pub const MAX_BORDER_WIDTH: f32 = 20.0;

/// Built-in vector artwork, drawn from a 40x40 design box.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::EnumIter,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum IconKind {
    Heart,
    Smile,
    Lightning,
    Moon,
    Burst,
    Rainbow,
    Bunting,
    Starburst,
}
impl IconKind {
    /// Side of the square box the artwork is drawn in.
    pub const DESIGN_SIZE: f32 = 40.0;
}

/// Geometry of a graphic, in local units before its transform.
///
/// Rects and icons are anchored at their top-left corner, every other shape at its center.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeKind {
    Circle {
        radius: f32,
    },
    Rect {
        width: f32,
        height: f32,
    },
    /// A regular triangle, point up.
    #[serde(rename_all = "camelCase")]
    Triangle {
        radius: f32,
    },
    #[serde(rename_all = "camelCase")]
    Star {
        points: u32,
        inner_radius: f32,
        outer_radius: f32,
    },
    /// A regular polygon, first vertex up.
    Polygon {
        sides: u32,
        radius: f32,
    },
    Icon {
        glyph: IconKind,
        width: f32,
        height: f32,
    },
}
impl ShapeKind {
    /// Absorb a scale applied by a transform handle into the geometry itself.
    ///
    /// Radial shapes can't stretch unevenly, they follow the horizontal factor.
    pub fn absorb_scale(&mut self, scale_x: f32, scale_y: f32) {
        match self {
            Self::Rect { width, height } | Self::Icon { width, height, .. } => {
                *width *= scale_x;
                *height *= scale_y;
            }
            Self::Circle { radius }
            | Self::Triangle { radius }
            | Self::Polygon { radius, .. } => *radius *= scale_x,
            Self::Star {
                inner_radius,
                outer_radius,
                ..
            } => {
                *inner_radius *= scale_x;
                *outer_radius *= scale_x;
            }
        }
    }
    /// Local bounds `[x, y, width, height]`, relative to the anchor.
    #[must_use]
    pub fn local_bounds(&self) -> [f32; 4] {
        match *self {
            Self::Rect { width, height } | Self::Icon { width, height, .. } => {
                [0.0, 0.0, width, height]
            }
            Self::Circle { radius }
            | Self::Triangle { radius }
            | Self::Polygon { radius, .. }
            | Self::Star {
                outer_radius: radius,
                ..
            } => [-radius, -radius, radius * 2.0, radius * 2.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicObject {
    #[serde(skip, default)]
    pub id: GraphicId,
    #[serde(flatten)]
    pub shape: ShapeKind,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    #[serde(default = "one")]
    pub opacity: f32,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub locked: bool,
}
fn one() -> f32 {
    1.0
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Shapes,
    Icons,
    Clipart,
}
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    Solid,
    Outline,
}
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BasicShape {
    Circle,
    Square,
    Triangle,
    Star,
    Polygon,
}
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatalogArt {
    Shape { shape: BasicShape, variant: Variant },
    Icon { glyph: IconKind },
}
/// An entry in the graphics picker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct CatalogItem {
    pub key: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub art: CatalogArt,
}
const fn shape(
    key: &'static str,
    label: &'static str,
    shape: BasicShape,
    variant: Variant,
) -> CatalogItem {
    CatalogItem {
        key,
        label,
        category: Category::Shapes,
        art: CatalogArt::Shape { shape, variant },
    }
}
const fn icon(
    key: &'static str,
    label: &'static str,
    category: Category,
    glyph: IconKind,
) -> CatalogItem {
    CatalogItem {
        key,
        label,
        category,
        art: CatalogArt::Icon { glyph },
    }
}
pub const CATALOG: [CatalogItem; 18] = [
    shape("circle-solid", "Circle (Solid)", BasicShape::Circle, Variant::Solid),
    shape("circle-outline", "Circle (Outline)", BasicShape::Circle, Variant::Outline),
    shape("square-solid", "Square (Solid)", BasicShape::Square, Variant::Solid),
    shape("square-outline", "Square (Outline)", BasicShape::Square, Variant::Outline),
    shape("triangle-solid", "Triangle (Solid)", BasicShape::Triangle, Variant::Solid),
    shape("triangle-outline", "Triangle (Outline)", BasicShape::Triangle, Variant::Outline),
    shape("star-solid", "Star (Solid)", BasicShape::Star, Variant::Solid),
    shape("star-outline", "Star (Outline)", BasicShape::Star, Variant::Outline),
    shape("polygon-solid", "Polygon (Solid)", BasicShape::Polygon, Variant::Solid),
    shape("polygon-outline", "Polygon (Outline)", BasicShape::Polygon, Variant::Outline),
    icon("icon-heart", "Heart", Category::Icons, IconKind::Heart),
    icon("icon-smile", "Smile", Category::Icons, IconKind::Smile),
    icon("icon-lightning", "Lightning", Category::Icons, IconKind::Lightning),
    icon("icon-moon", "Moon", Category::Icons, IconKind::Moon),
    icon("clipart-burst", "Burst", Category::Clipart, IconKind::Burst),
    icon("clipart-rainbow", "Rainbow", Category::Clipart, IconKind::Rainbow),
    icon("clipart-bunting", "Bunting", Category::Clipart, IconKind::Bunting),
    icon("clipart-starburst", "Starburst", Category::Clipart, IconKind::Starburst),
];

/// Catalog entries of `category` whose label contains `query`, ignoring case.
/// An empty query matches everything.
pub fn search(category: Category, query: &str) -> impl Iterator<Item = &'static CatalogItem> {
    let query = query.to_lowercase();
    CATALOG
        .iter()
        .filter(move |item| item.category == category)
        .filter(move |item| query.is_empty() || item.label.to_lowercase().contains(&query))
}
#[must_use]
pub fn find_item(key: &str) -> Option<&'static CatalogItem> {
    CATALOG.iter().find(|item| item.key == key)
}

/// Instantiate a catalog entry at the default position.
#[must_use]
pub fn create_graphic(art: CatalogArt) -> GraphicObject {
    let [x, y] = NEW_GRAPHIC_POSITION;
    let (shape, outline) = match art {
        CatalogArt::Shape { shape, variant } => (
            match shape {
                BasicShape::Circle => ShapeKind::Circle { radius: 40.0 },
                BasicShape::Square => ShapeKind::Rect {
                    width: 80.0,
                    height: 80.0,
                },
                BasicShape::Triangle => ShapeKind::Triangle { radius: 40.0 },
                BasicShape::Star => ShapeKind::Star {
                    points: 5,
                    inner_radius: 20.0,
                    outer_radius: 40.0,
                },
                BasicShape::Polygon => ShapeKind::Polygon {
                    sides: 6,
                    radius: 40.0,
                },
            },
            variant == Variant::Outline,
        ),
        CatalogArt::Icon { glyph } => (
            ShapeKind::Icon {
                glyph,
                width: 80.0,
                height: 80.0,
            },
            false,
        ),
    };
    let (fill, stroke) = if outline {
        (Color::TRANSPARENT, Color::BRAND)
    } else {
        (Color::BRAND, Color::TRANSPARENT)
    };
    GraphicObject {
        id: GraphicId::fresh(),
        shape,
        fill,
        stroke,
        stroke_width: DEFAULT_STROKE_WIDTH,
        opacity: 1.0,
        transform: Transform::at(x, y),
        locked: false,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Arrange {
    /// To the top of the stack.
    Front,
    /// Up by one.
    Forward,
    /// Down by one.
    Backward,
    /// To the bottom of the stack.
    Back,
}

/// The placement reported by a finished drag or transform handle.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformEnd {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct GraphicCollection {
    graphics: Vec<GraphicObject>,
}
impl GraphicCollection {
    /// Bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &GraphicObject> + '_ {
        self.graphics.iter()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphics.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }
    #[must_use]
    pub fn get(&self, id: GraphicId) -> Option<&GraphicObject> {
        self.graphics.iter().find(|graphic| graphic.id == id)
    }
    pub fn get_mut(&mut self, id: GraphicId) -> Option<&mut GraphicObject> {
        self.graphics.iter_mut().find(|graphic| graphic.id == id)
    }
    fn position(&self, id: GraphicId) -> Option<usize> {
        self.graphics.iter().position(|graphic| graphic.id == id)
    }
    pub fn add(&mut self, graphic: GraphicObject) -> GraphicId {
        let id = graphic.id;
        log::trace!("adding {id} {:?}", graphic.shape);
        self.graphics.push(graphic);
        id
    }
    pub fn delete(&mut self, id: GraphicId) -> Option<GraphicObject> {
        let idx = self.position(id)?;
        Some(self.graphics.remove(idx))
    }
    pub fn update<R>(
        &mut self,
        id: GraphicId,
        f: impl FnOnce(&mut GraphicObject) -> R,
    ) -> Option<R> {
        self.get_mut(id).map(f)
    }
    /// Commit a finished drag or resize. Scale is folded into the geometry, so the stored
    /// transform only ever carries position and rotation. False if missing or locked.
    pub fn apply_transform_end(&mut self, id: GraphicId, end: TransformEnd) -> bool {
        match self.get_mut(id) {
            Some(graphic) if !graphic.locked => {
                graphic.transform = Transform {
                    rotation: end.rotation,
                    ..Transform::at(end.x, end.y)
                };
                graphic.shape.absorb_scale(end.scale_x, end.scale_y);
                true
            }
            _ => false,
        }
    }
    /// Opacity as a percentage, `0..=100`.
    pub fn set_opacity_percent(&mut self, id: GraphicId, percent: f32) -> bool {
        self.update(id, |graphic| {
            graphic.opacity = percent.clamp(0.0, 100.0) / 100.0;
        })
        .is_some()
    }
    pub fn set_border_width(&mut self, id: GraphicId, width: f32) -> bool {
        self.update(id, |graphic| {
            graphic.stroke_width = width.clamp(0.0, MAX_BORDER_WIDTH);
        })
        .is_some()
    }
    pub fn duplicate(&mut self, id: GraphicId) -> Option<GraphicId> {
        let mut copy = self.get(id)?.clone();
        copy.id = GraphicId::fresh();
        copy.transform.translate(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        Some(self.add(copy))
    }
    pub fn toggle_lock(&mut self, id: GraphicId) -> Option<bool> {
        self.update(id, |graphic| {
            graphic.locked = !graphic.locked;
            graphic.locked
        })
    }
    /// Move the anchor to the horizontal center of the canvas.
    pub fn center(&mut self, id: GraphicId, canvas_width: f32) -> bool {
        self.update(id, |graphic| graphic.transform.x = canvas_width / 2.0)
            .is_some()
    }
    /// Move the anchor to the vertical middle of the canvas.
    pub fn middle(&mut self, id: GraphicId, canvas_height: f32) -> bool {
        self.update(id, |graphic| graphic.transform.y = canvas_height / 2.0)
            .is_some()
    }
    pub fn arrange(&mut self, id: GraphicId, arrange: Arrange) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let graphic = self.graphics.remove(idx);
        let target = match arrange {
            Arrange::Front => self.graphics.len(),
            Arrange::Forward => (idx + 1).min(self.graphics.len()),
            Arrange::Backward => idx.saturating_sub(1),
            Arrange::Back => 0,
        };
        self.graphics.insert(target, graphic);
        true
    }
}
impl<'a> IntoIterator for &'a GraphicCollection {
    type Item = &'a GraphicObject;
    type IntoIter = std::slice::Iter<'a, GraphicObject>;
    fn into_iter(self) -> Self::IntoIter {
        self.graphics.iter()
    }
}
