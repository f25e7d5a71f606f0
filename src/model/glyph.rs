//! Positioned glyph and font descriptor types.
//!
//! These are the value types produced by an upstream content-stream
//! decoder. Glyph positions are in layout space, already adjusted for the
//! page transform; the text matrix is kept alongside so rotation detection
//! can recover the glyph's rendered orientation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::geometry::Matrix;

/// Font descriptor fields exposed by the upstream font decoder.
///
/// Shared by reference across all glyphs drawn with the same font on a
/// page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Font family, when the descriptor carries one.
    pub family: Option<String>,

    /// Internal font name, e.g. `"ABCDEF+Helvetica,Bold"` for a subset.
    pub name: String,

    /// Numeric weight (400 regular, 700 bold); 0 when unspecified.
    pub weight: f32,

    /// Italic angle in degrees; non-zero means italic.
    pub italic_angle: f32,

    /// Font matrix mapping glyph space to text space.
    pub font_matrix: Matrix,
}

impl FontDescriptor {
    /// Create a descriptor with the given internal name and defaults
    /// for everything else.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            family: None,
            name: name.into(),
            weight: 0.0,
            italic_angle: 0.0,
            font_matrix: Matrix::IDENTITY,
        }
    }

    /// Set the family.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Set the numeric weight.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Set the italic angle.
    pub fn with_italic_angle(mut self, angle: f32) -> Self {
        self.italic_angle = angle;
        self
    }

    /// Set the font matrix.
    pub fn with_font_matrix(mut self, matrix: Matrix) -> Self {
        self.font_matrix = matrix;
        self
    }
}

/// One positioned, sized unit of rendered text.
///
/// Immutable once produced by the content-stream walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Glyph {
    /// Unicode text for this glyph (usually one codepoint, sometimes a
    /// ligature expansion).
    pub text: String,

    /// Left edge in layout space.
    pub x: f32,

    /// Top offset in layout space.
    pub y: f32,

    /// Advance width in layout space.
    pub width: f32,

    /// Rendered height in layout space.
    pub height: f32,

    /// The text matrix this glyph was placed with.
    pub text_matrix: Matrix,

    /// The font this glyph is drawn with.
    pub font: Arc<FontDescriptor>,
}

impl Glyph {
    /// Create a glyph at a position with the given metrics and font.
    pub fn new(
        text: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        font: Arc<FontDescriptor>,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
            text_matrix: Matrix::IDENTITY,
            font,
        }
    }

    /// Set the text matrix.
    pub fn with_text_matrix(mut self, matrix: Matrix) -> Self {
        self.text_matrix = matrix;
        self
    }

    /// The angle this glyph renders at, from its text matrix composed
    /// with its font matrix, in integer degrees in `[0, 360)`.
    pub fn rotation_degrees(&self) -> i32 {
        self.text_matrix
            .concat(&self.font.font_matrix)
            .rotation_degrees()
    }
}

/// An ordered, non-empty sequence of glyphs between two structural breaks.
#[derive(Debug, Clone)]
pub struct TextRun {
    glyphs: Vec<Glyph>,
}

impl TextRun {
    /// Build a run from a non-empty glyph sequence.
    ///
    /// Returns `None` for an empty sequence; runs are non-empty by
    /// construction.
    pub fn new(glyphs: Vec<Glyph>) -> Option<Self> {
        if glyphs.is_empty() {
            None
        } else {
            Some(Self { glyphs })
        }
    }

    /// The glyphs in placement order.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// The first glyph. Seeds the run's indentation and starting
    /// font-size metadata.
    pub fn first(&self) -> &Glyph {
        &self.glyphs[0]
    }

    /// Number of glyphs in the run.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false; kept for the conventional pairing with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The run's literal text content.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.text.as_str()).collect()
    }
}
