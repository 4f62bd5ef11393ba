//! Triangle meshes to antialiased pixel coverage.
//!
//! Every pixel is tested at four sample points on a rotated grid and the hits are kept as a
//! bitmask. Meshes coming out of lyon never overlap themselves, and masks are combined with
//! OR, so shared triangle edges are neither dropped nor counted twice.

use crate::blend::Blend;
use crate::color::Color;
use crate::util::Rect;
use rayon::prelude::*;

/// Sample offsets within a pixel.
const SAMPLES: [[f32; 2]; 4] = [
    [0.375, 0.125],
    [0.875, 0.375],
    [0.125, 0.625],
    [0.625, 0.875],
];

/// Triangle list output of the lyon tessellators, positions already in target pixel space.
pub type Mesh = lyon_tessellation::VertexBuffers<[f32; 2], u32>;

pub struct Coverage {
    width: u32,
    height: u32,
    masks: Vec<u8>,
    /// Union of touched pixel spans, to limit the paint pass.
    touched: Option<[u32; 4]>,
}
impl Coverage {
    #[must_use]
    pub fn new([width, height]: [u32; 2]) -> Self {
        Self {
            width,
            height,
            masks: vec![0; width as usize * height as usize],
            touched: None,
        }
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.touched.is_none()
    }
    pub fn clear(&mut self) {
        self.masks.fill(0);
        self.touched = None;
    }
    /// Accumulate every triangle of the mesh.
    pub fn add_mesh(&mut self, mesh: &Mesh) {
        for triangle in mesh.indices.chunks_exact(3) {
            let fetch = |index: u32| mesh.vertices.get(index as usize).copied();
            if let (Some(a), Some(b), Some(c)) =
                (fetch(triangle[0]), fetch(triangle[1]), fetch(triangle[2]))
            {
                self.add_triangle([a, b, c]);
            }
        }
    }
    #[allow(clippy::cast_precision_loss)]
    pub fn add_triangle(&mut self, [a, b, c]: [[f32; 2]; 3]) {
        let edge = |p: [f32; 2], q: [f32; 2], x: f32, y: f32| {
            (q[0] - p[0]) * (y - p[1]) - (q[1] - p[1]) * (x - p[0])
        };
        let area = edge(a, b, c[0], c[1]);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        // Normalize winding, so inside is always positive.
        let sign = area.signum();
        let Some(bounds) = Rect::bounding([a, b, c]) else {
            return;
        };
        let Some([x0, y0, x1, y1]) = bounds.pixel_span([self.width, self.height]) else {
            return;
        };
        self.touched = Some(match self.touched {
            None => [x0, y0, x1, y1],
            Some([tx0, ty0, tx1, ty1]) => [tx0.min(x0), ty0.min(y0), tx1.max(x1), ty1.max(y1)],
        });
        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            for x in x0..x1 {
                let mut mask = 0u8;
                for (bit, [sx, sy]) in SAMPLES.iter().enumerate() {
                    let px = x as f32 + sx;
                    let py = y as f32 + sy;
                    if edge(a, b, px, py) * sign >= 0.0
                        && edge(b, c, px, py) * sign >= 0.0
                        && edge(c, a, px, py) * sign >= 0.0
                    {
                        mask |= 1 << bit;
                    }
                }
                self.masks[row + x as usize] |= mask;
            }
        }
    }
    /// Fraction of the pixel covered, `0.0..=1.0`.
    #[must_use]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        let mask = self.masks[y as usize * self.width as usize + x as usize];
        #[allow(clippy::cast_precision_loss)]
        let hits = mask.count_ones() as f32;
        hits / SAMPLES.len() as f32
    }
    /// Blend `color` into every covered pixel of `target`, which must be the size this
    /// coverage was created with.
    pub fn paint(&self, target: &mut image::RgbaImage, color: Color, blend: Blend) {
        let Some([x0, y0, x1, y1]) = self.touched else {
            return;
        };
        if target.dimensions() != (self.width, self.height) || color.is_transparent() {
            return;
        }
        let width = self.width as usize;
        let source = color.as_array();
        target
            .as_mut()
            .par_chunks_exact_mut(width * 4)
            .zip(self.masks.par_chunks_exact(width))
            .skip(y0 as usize)
            .take((y1 - y0) as usize)
            .for_each(|(row, masks)| {
                for x in x0 as usize..x1 as usize {
                    let mask = masks[x];
                    if mask == 0 {
                        continue;
                    }
                    #[allow(clippy::cast_precision_loss)]
                    let coverage = mask.count_ones() as f32 / SAMPLES.len() as f32;
                    let pixel = &mut row[x * 4..x * 4 + 4];
                    let backdrop = [pixel[0], pixel[1], pixel[2], pixel[3]];
                    pixel.copy_from_slice(&blend.over(backdrop, source, coverage));
                }
            });
    }
}
