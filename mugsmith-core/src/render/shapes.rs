//! Vector outlines of graphics, as lyon paths in the graphic's local space.

use crate::color::Color;
use crate::state::graphics::{GraphicObject, IconKind, ShapeKind};
use lyon_tessellation::math::{point, vector, Angle, Point};
use lyon_tessellation::path::builder::SvgPathBuilder;
use lyon_tessellation::path::{ArcFlags, Path, Polygon, Winding};

/// One filled and/or stroked outline. Drawn fill first, then stroke.
pub struct Paint {
    pub path: Path,
    pub fill: Option<Color>,
    /// Color and width, centered on the outline.
    pub stroke: Option<(Color, f32)>,
}
impl Paint {
    fn new(path: Path) -> Self {
        Self {
            path,
            fill: None,
            stroke: None,
        }
    }
    fn fill(self, color: Color) -> Self {
        Self {
            fill: (!color.is_transparent()).then_some(color),
            ..self
        }
    }
    fn stroke(self, color: Color, width: f32) -> Self {
        Self {
            stroke: (!color.is_transparent() && width > 0.0).then_some((color, width)),
            ..self
        }
    }
}

/// Outlines of a graphic, bottom to top, in its local space.
#[must_use]
pub fn paints(graphic: &GraphicObject) -> Vec<Paint> {
    let styled = |path: Path| {
        Paint::new(path)
            .fill(graphic.fill)
            .stroke(graphic.stroke, graphic.stroke_width)
    };
    match graphic.shape {
        ShapeKind::Circle { radius } => vec![styled(circle(point(0.0, 0.0), radius))],
        ShapeKind::Rect { width, height } => vec![styled(polygon(&[
            point(0.0, 0.0),
            point(width, 0.0),
            point(width, height),
            point(0.0, height),
        ]))],
        ShapeKind::Triangle { radius } => vec![styled(regular_polygon(3, radius))],
        ShapeKind::Polygon { sides, radius } => vec![styled(regular_polygon(sides, radius))],
        ShapeKind::Star {
            points,
            inner_radius,
            outer_radius,
        } => vec![styled(star(points, inner_radius, outer_radius))],
        ShapeKind::Icon { glyph, .. } => icon(glyph),
    }
}

/// Map from the icon design box into the graphic's local space.
#[must_use]
pub fn icon_scale(shape: &ShapeKind) -> Option<[f32; 2]> {
    match *shape {
        ShapeKind::Icon { width, height, .. } => Some([
            width / IconKind::DESIGN_SIZE,
            height / IconKind::DESIGN_SIZE,
        ]),
        _ => None,
    }
}

fn circle(center: Point, radius: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_circle(center, radius.abs(), Winding::Positive);
    builder.build()
}
fn polygon(points: &[Point]) -> Path {
    let mut builder = Path::builder();
    builder.add_polygon(Polygon {
        points,
        closed: true,
    });
    builder.build()
}
/// Vertex `i` of `count` evenly spaced around a circle, starting straight up.
#[allow(clippy::cast_precision_loss)]
fn around(i: u32, count: u32, radius: f32) -> Point {
    let angle = std::f32::consts::TAU * i as f32 / count as f32;
    let (sin, cos) = angle.sin_cos();
    point(radius * sin, -radius * cos)
}
fn regular_polygon(sides: u32, radius: f32) -> Path {
    let sides = sides.max(3);
    let points: Vec<_> = (0..sides).map(|i| around(i, sides, radius)).collect();
    polygon(&points)
}
fn star(points: u32, inner_radius: f32, outer_radius: f32) -> Path {
    let points = points.max(2);
    let vertices: Vec<_> = (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 {
                outer_radius
            } else {
                inner_radius
            };
            around(i, points * 2, radius)
        })
        .collect();
    polygon(&vertices)
}

const YELLOW: Color = Color::rgb(0xfb, 0xbf, 0x24);
const ORANGE: Color = Color::rgb(0xf5, 0x9e, 0x42);
const RED: Color = Color::rgb(0xf8, 0x71, 0x71);
const GREEN: Color = Color::rgb(0x34, 0xd3, 0x99);
const PURPLE: Color = Color::rgb(0xa7, 0x8b, 0xfa);
const INK: Color = Color::rgb(0x33, 0x33, 0x33);
const HEART: Color = Color::rgb(0xe5, 0x3e, 0x3e);

fn points(coords: &[[f32; 2]]) -> Vec<Point> {
    coords.iter().map(|&[x, y]| point(x, y)).collect()
}
/// Upper half-circle arc, open, from `x0` to `x1` along `y`.
fn arch(x0: f32, x1: f32, y: f32) -> Path {
    let radius = (x1 - x0) / 2.0;
    let mut builder = Path::svg_builder();
    builder.move_to(point(x0, y));
    builder.arc_to(
        vector(radius, radius),
        Angle::degrees(0.0),
        ArcFlags {
            large_arc: false,
            sweep: true,
        },
        point(x1, y),
    );
    builder.build()
}

/// Built-in artwork, in the 40x40 design box.
fn icon(glyph: IconKind) -> Vec<Paint> {
    match glyph {
        IconKind::Heart => {
            let mut builder = Path::svg_builder();
            builder.move_to(point(20.0, 34.0));
            builder.cubic_bezier_to(point(20.0, 34.0), point(11.0, 26.5), point(8.0, 21.5));
            builder.cubic_bezier_to(point(4.0, 16.0), point(7.0, 10.0), point(13.0, 10.0));
            builder.cubic_bezier_to(point(16.0, 10.0), point(18.0, 12.0), point(20.0, 14.0));
            builder.cubic_bezier_to(point(22.0, 12.0), point(24.0, 10.0), point(27.0, 10.0));
            builder.cubic_bezier_to(point(33.0, 10.0), point(36.0, 16.0), point(32.0, 21.5));
            builder.cubic_bezier_to(point(29.0, 26.5), point(20.0, 34.0), point(20.0, 34.0));
            builder.close();
            vec![Paint::new(builder.build()).stroke(HEART, 3.0)]
        }
        IconKind::Smile => {
            let mut mouth = Path::svg_builder();
            mouth.move_to(point(14.0, 26.0));
            mouth.cubic_bezier_to(point(16.0, 28.0), point(22.0, 28.0), point(26.0, 26.0));
            vec![
                Paint::new(circle(point(20.0, 20.0), 16.0))
                    .fill(Color::WHITE)
                    .stroke(INK, 3.0),
                Paint::new(circle(point(14.0, 18.0), 2.0)).fill(INK),
                Paint::new(circle(point(26.0, 18.0), 2.0)).fill(INK),
                Paint::new(mouth.build()).stroke(INK, 2.0),
            ]
        }
        IconKind::Lightning => vec![Paint::new(polygon(&points(&[
            [20.0, 6.0],
            [28.0, 22.0],
            [22.0, 22.0],
            [26.0, 34.0],
            [12.0, 18.0],
            [18.0, 18.0],
        ])))
        .fill(YELLOW)
        .stroke(ORANGE, 2.0)],
        IconKind::Moon => {
            let mut builder = Path::svg_builder();
            builder.move_to(point(28.0, 20.0));
            builder.arc_to(
                vector(8.0, 8.0),
                Angle::degrees(0.0),
                ArcFlags {
                    large_arc: true,
                    sweep: true,
                },
                point(20.0, 12.0),
            );
            builder.cubic_bezier_to(
                point(20.0, 16.418),
                point(23.582, 20.0),
                point(28.0, 20.0),
            );
            builder.close();
            vec![Paint::new(builder.build())
                .fill(YELLOW)
                .stroke(INK, 2.0)]
        }
        IconKind::Burst => [(10.0, RED), (6.0, YELLOW), (2.0, GREEN)]
            .into_iter()
            .map(|(radius, color)| Paint::new(circle(point(20.0, 20.0), radius)).fill(color))
            .collect(),
        IconKind::Rainbow => vec![
            Paint::new(arch(8.0, 32.0, 32.0)).stroke(PURPLE, 4.0),
            Paint::new(arch(12.0, 28.0, 32.0)).stroke(YELLOW, 4.0),
            Paint::new(arch(16.0, 24.0, 32.0)).stroke(GREEN, 4.0),
        ],
        IconKind::Bunting => vec![
            Paint::new(polygon(&points(&[
                [4.0, 28.0],
                [36.0, 28.0],
                [36.0, 34.0],
                [4.0, 34.0],
            ])))
            .fill(YELLOW),
            Paint::new(polygon(&points(&[[8.0, 34.0], [12.0, 28.0], [16.0, 34.0]]))).fill(RED),
            Paint::new(polygon(&points(&[[20.0, 34.0], [24.0, 28.0], [28.0, 34.0]])))
                .fill(GREEN),
        ],
        IconKind::Starburst => vec![Paint::new(polygon(&points(&[
            [20.0, 4.0],
            [24.0, 16.0],
            [36.0, 16.0],
            [26.0, 24.0],
            [30.0, 36.0],
            [20.0, 28.0],
            [10.0, 36.0],
            [14.0, 24.0],
            [4.0, 16.0],
            [16.0, 16.0],
        ])))
        .fill(YELLOW)
        .stroke(ORANGE, 2.0)],
    }
}
