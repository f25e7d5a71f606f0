//! 2D affine geometry for glyph and page transforms.
//!
//! Matrices use the PDF convention `[a b c d e f]`:
//!
//! ```text
//! | a b 0 |
//! | c d 0 |
//! | e f 1 |
//! ```
//!
//! with points transformed as row vectors, `(x', y') = (ax + cy + e, bx + dy + f)`.

use serde::{Deserialize, Serialize};

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A 2D affine transformation matrix in PDF `[a b c d e f]` form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    /// X scale.
    pub a: f32,
    /// Y shear.
    pub b: f32,
    /// X shear.
    pub c: f32,
    /// Y scale.
    pub d: f32,
    /// X translation.
    pub e: f32,
    /// Y translation.
    pub f: f32,
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six coefficients.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A translation matrix.
    pub fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// A scale matrix.
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// A counterclockwise rotation about the origin, in degrees.
    ///
    /// Quarter turns use exact coefficients so compensated glyph
    /// positions stay stable.
    pub fn rotate_degrees(degrees: f32) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        let (sin, cos) = if normalized == 0.0 {
            (0.0, 1.0)
        } else if normalized == 90.0 {
            (1.0, 0.0)
        } else if normalized == 180.0 {
            (0.0, -1.0)
        } else if normalized == 270.0 {
            (-1.0, 0.0)
        } else {
            normalized.to_radians().sin_cos()
        };
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Compose `self` with `other`, applying `self` first.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// Y shear coefficient.
    pub fn shear_y(&self) -> f32 {
        self.b
    }

    /// Y scale coefficient.
    pub fn scale_y(&self) -> f32 {
        self.d
    }

    /// The rotation this matrix renders text at, in integer degrees
    /// normalized to `[0, 360)`.
    pub fn rotation_degrees(&self) -> i32 {
        let angle = self.shear_y().atan2(self.scale_y()).to_degrees();
        let angle = angle.round() as i32;
        angle.rem_euclid(360)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::IDENTITY
    }
}
