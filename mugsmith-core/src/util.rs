//! Utility types, used throughout the crate.

/// An axis-aligned rectangle in logical pixels. `x, y` is the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}
impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
    /// Smallest rectangle containing every point, or None if there are none.
    #[must_use]
    pub fn bounding(points: impl IntoIterator<Item = [f32; 2]>) -> Option<Self> {
        let mut points = points.into_iter();
        let [x, y] = points.next()?;
        let (min, max) = points.fold(([x, y], [x, y]), |(min, max), [x, y]| {
            ([min[0].min(x), min[1].min(y)], [max[0].max(x), max[1].max(y)])
        });
        Some(Self::new(min[0], min[1], max[0] - min[0], max[1] - min[1]))
    }
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
    #[must_use]
    pub fn center(&self) -> [f32; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }
    /// Four corners, clockwise from the top-left.
    #[must_use]
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.x, self.y],
            [self.right(), self.y],
            [self.right(), self.bottom()],
            [self.x, self.bottom()],
        ]
    }
    /// Integer pixel span `[x0, y0, x1, y1)` touched by this rect, clipped to `size`.
    /// None when nothing remains after clipping.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_span(&self, size: [u32; 2]) -> Option<[u32; 4]> {
        let clip = |value: f32, max: u32| value.clamp(0.0, max as f32) as u32;
        let x0 = clip(self.x.floor(), size[0]);
        let y0 = clip(self.y.floor(), size[1]);
        let x1 = clip(self.right().ceil(), size[0]);
        let y1 = clip(self.bottom().ceil(), size[1]);
        (x0 < x1 && y0 < y1).then_some([x0, y0, x1, y1])
    }
}
