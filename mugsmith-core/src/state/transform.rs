//! Placement of objects on the canvas.

/// Position, rotation and per-axis scale of an object, in canvas logical pixels.
///
/// Applied as scale, then rotation about the object's origin, then translation. A negative
/// scale on an axis mirrors the object along that axis.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    /// Degrees, *clockwise* on screen (+Y is down).
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}
impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Horizontal,
    Vertical,
}
impl Transform {
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
    #[must_use]
    pub fn uniform(x: f32, y: f32, scale: f32) -> Self {
        Self {
            x,
            y,
            scale_x: scale,
            scale_y: scale,
            ..Self::default()
        }
    }
    /// Rotate further by `degrees`, wrapping into `(-360, 360)`.
    pub fn rotate_by(&mut self, degrees: f32) {
        self.rotation = (self.rotation + degrees) % 360.0;
    }
    /// Mirror along the given axis.
    pub fn flip(&mut self, axis: Axis) {
        match axis {
            Axis::Horizontal => self.scale_x = -self.scale_x,
            Axis::Vertical => self.scale_y = -self.scale_y,
        }
    }
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
    #[must_use]
    pub fn matrix(&self) -> Matrix {
        Matrix::from(*self)
    }
}

/// An arbitrary 2D affine transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix {
    /// Column-major matrix elements, last column is translation.
    pub elements: [[f32; 2]; 3],
}
impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
impl Matrix {
    pub const IDENTITY: Self = Self {
        elements: [[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]],
    };
    #[must_use]
    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            elements: [[1.0, 0.0], [0.0, 1.0], [x, y]],
        }
    }
    #[must_use]
    pub fn scale(x: f32, y: f32) -> Self {
        Self {
            elements: [[x, 0.0], [0.0, y], [0.0, 0.0]],
        }
    }
    #[must_use]
    pub fn apply(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        let [[a, b], [c, d], [e, f]] = self.elements;
        [a * x + c * y + e, b * x + d * y + f]
    }
    #[must_use]
    pub fn determinant(&self) -> f32 {
        let [[a, b], [c, d], _] = self.elements;
        a * d - b * c
    }
    /// Inverse transform, or None if this transform collapses the plane.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let [[a, b], [c, d], [e, f]] = self.elements;
        let inv = 1.0 / det;
        Some(Self {
            elements: [
                [d * inv, -b * inv],
                [-c * inv, a * inv],
                [(c * f - d * e) * inv, (b * e - a * f) * inv],
            ],
        })
    }
    /// Largest factor by which this transform stretches any length.
    #[must_use]
    pub fn max_scale(&self) -> f32 {
        let [[a, b], [c, d], _] = self.elements;
        a.hypot(b).max(c.hypot(d))
    }
}
/// `lhs * rhs` applies `rhs` first.
impl std::ops::Mul for Matrix {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let [[a1, b1], [c1, d1], [e1, f1]] = self.elements;
        let [[a2, b2], [c2, d2], [e2, f2]] = rhs.elements;
        Self {
            elements: [
                [a1 * a2 + c1 * b2, b1 * a2 + d1 * b2],
                [a1 * c2 + c1 * d2, b1 * c2 + d1 * d2],
                [a1 * e2 + c1 * f2 + e1, b1 * e2 + d1 * f2 + f1],
            ],
        }
    }
}
impl From<Transform> for Matrix {
    fn from(value: Transform) -> Self {
        let (sin, cos) = value.rotation.to_radians().sin_cos();
        Self {
            // Scale times rotation, and then translate.
            elements: [
                [value.scale_x * cos, value.scale_x * sin],
                [value.scale_y * -sin, value.scale_y * cos],
                [value.x, value.y],
            ],
        }
    }
}
