use crate::blend::Blend;
use crate::state::Matrix;
use crate::util::Rect;
use rayon::prelude::*;

/// Bilinearly sample `image` at a point in pixel space, where pixel `(x, y)` has its center
/// at `(x + 0.5, y + 0.5)`. Everything outside the image is transparent, so edges fade out
/// over one pixel.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn sample_bilinear(image: &image::RgbaImage, [x, y]: [f32; 2]) -> [u8; 4] {
    let (width, height) = image.dimensions();
    let x = x - 0.5;
    let y = y - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let fetch = |px: i64, py: i64| -> [f32; 4] {
        if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
            return [0.0; 4];
        }
        #[allow(clippy::cast_sign_loss)]
        let [r, g, b, a] = image.get_pixel(px as u32, py as u32).0;
        // Premultiply, so transparent neighbours don't bleed their color.
        let a = f32::from(a) / 255.0;
        [
            f32::from(r) * a,
            f32::from(g) * a,
            f32::from(b) * a,
            a,
        ]
    };

    let mut acc = [0.0f32; 4];
    for (px, py, weight) in [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ] {
        if weight <= 0.0 {
            continue;
        }
        let texel = fetch(px, py);
        for (acc, texel) in acc.iter_mut().zip(texel) {
            *acc += texel * weight;
        }
    }
    let alpha = acc[3];
    if alpha <= 0.0 {
        return [0; 4];
    }
    #[allow(clippy::cast_sign_loss)]
    let channel = |value: f32| (value / alpha).round().clamp(0.0, 255.0) as u8;
    [
        channel(acc[0]),
        channel(acc[1]),
        channel(acc[2]),
        crate::blend::from_unit(alpha),
    ]
}

/// Draw `source` onto `target` through `matrix`, which maps source pixel space into target
/// pixel space. Each covered target pixel is sampled at its center.
///
/// Does nothing if the matrix is singular.
#[allow(clippy::cast_precision_loss)]
pub fn draw_image(
    target: &mut image::RgbaImage,
    source: &image::RgbaImage,
    matrix: Matrix,
    blend: Blend,
) {
    let Some(inverse) = matrix.invert() else {
        return;
    };
    let local = Rect::new(0.0, 0.0, source.width() as f32, source.height() as f32);
    let Some(bounds) = Rect::bounding(local.corners().map(|corner| matrix.apply(corner))) else {
        return;
    };
    // Pad by a pixel to catch the faded edge.
    let bounds = Rect::new(
        bounds.x - 1.0,
        bounds.y - 1.0,
        bounds.width + 2.0,
        bounds.height + 2.0,
    );
    let (width, height) = target.dimensions();
    let Some([x0, y0, x1, y1]) = bounds.pixel_span([width, height]) else {
        return;
    };
    let row_len = width as usize * 4;
    target
        .as_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(y, row)| {
            for x in x0..x1 {
                let point = inverse.apply([x as f32 + 0.5, y as f32 + 0.5]);
                let texel = sample_bilinear(source, point);
                if texel[3] == 0 {
                    continue;
                }
                let idx = x as usize * 4;
                let pixel = &mut row[idx..idx + 4];
                let backdrop = [pixel[0], pixel[1], pixel[2], pixel[3]];
                pixel.copy_from_slice(&blend.over(backdrop, texel, 1.0));
            }
        });
}
