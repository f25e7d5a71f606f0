//! Page object graph: documents, pages, content operators, and embedded
//! raster objects.
//!
//! These types are the contract with the upstream container parser. The
//! parser decodes the binary file into this graph; glyphml walks it and
//! never mutates it except for the scoped operator prepend/remove used by
//! rotation compensation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::geometry::Matrix;
use super::glyph::Glyph;

/// Stable identity of an underlying stream object.
///
/// This is the dedup key for raster extraction: identity comes from the
/// object graph (object number, generation), never from decoded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32, pub u16);

/// An embedded raster object and its descriptive metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageObject {
    /// Identity of the underlying stream object.
    pub id: ObjectId,

    /// Decoded raster bytes.
    #[serde(skip_serializing)]
    pub data: Vec<u8>,

    /// MIME type (e.g. "image/jpeg").
    pub mime_type: String,

    /// Width in pixels, when known.
    pub width: Option<u32>,

    /// Height in pixels, when known.
    pub height: Option<u32>,

    /// Color space name (e.g. "RGB", "Gray"), when known.
    pub color_space: Option<String>,

    /// Bits per component, when known.
    pub bits_per_component: Option<u8>,

    /// Resource name from the page dictionary, when known.
    pub name: Option<String>,
}

impl ImageObject {
    /// Create an image object with the given identity, bytes and MIME type.
    pub fn new(id: ObjectId, data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            id,
            data,
            mime_type: mime_type.into(),
            width: None,
            height: None,
            color_space: None,
            bits_per_component: None,
            name: None,
        }
    }

    /// Set pixel dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the color space name.
    pub fn with_color_space(mut self, color_space: impl Into<String>) -> Self {
        self.color_space = Some(color_space.into());
        self
    }

    /// Set bits per component.
    pub fn with_bits_per_component(mut self, bits: u8) -> Self {
        self.bits_per_component = Some(bits);
        self
    }

    /// Set the resource name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Size of the raster data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// File extension for the MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/tiff" => "tiff",
            "image/bmp" => "bmp",
            "image/jp2" | "image/jpeg2000" => "jp2",
            _ => "raw",
        }
    }

    /// File name suggested to the byte sink for display id `seq`.
    pub fn suggested_filename(&self, seq: u32) -> String {
        format!("image{}.{}", seq, self.extension())
    }
}

/// One drawing operator from a page's content stream, in stream order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentOp {
    /// Structural break: the glyphs that follow start a new line or
    /// paragraph fragment.
    BeginLine,

    /// Place one positioned glyph.
    ShowGlyph(Glyph),

    /// Paint a raster object referenced from the page's resources.
    PaintImage(Arc<ImageObject>),

    /// Paint raster data carried inline in the content stream.
    InlineImage(Arc<ImageObject>),

    /// Modify the current transformation matrix.
    Transform(Matrix),

    /// A segment the upstream decoder could not decode. Walking it is a
    /// recoverable content-stream error: the page is abandoned at this
    /// point but the document continues.
    Corrupt {
        /// Decoder detail.
        message: String,
    },
}

/// One page of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-indexed page number.
    pub number: u32,

    /// Intrinsic page rotation in degrees.
    pub rotation: i32,

    ops: Vec<ContentOp>,
}

impl Page {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            rotation: 0,
            ops: Vec::new(),
        }
    }

    /// Set the intrinsic rotation.
    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Append a content operator.
    pub fn push_op(&mut self, op: ContentOp) {
        self.ops.push(op);
    }

    /// Append a content operator, builder style.
    pub fn with_op(mut self, op: ContentOp) -> Self {
        self.ops.push(op);
        self
    }

    /// The content operators in stream order.
    pub fn ops(&self) -> &[ContentOp] {
        &self.ops
    }

    /// Prepend an operator to the content stream.
    ///
    /// Used by rotation compensation; every prepend must be paired with
    /// a [`Page::remove_first_op`] before the page is handed on.
    pub fn prepend_op(&mut self, op: ContentOp) {
        self.ops.insert(0, op);
    }

    /// Remove the first operator from the content stream.
    pub fn remove_first_op(&mut self) -> Option<ContentOp> {
        if self.ops.is_empty() {
            None
        } else {
            Some(self.ops.remove(0))
        }
    }
}

/// A decoded document: an ordered sequence of pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pages in document order.
    pub pages: Vec<Page>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page, builder style.
    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Serialize the object graph to JSON, for diagnostics and
    /// snapshot comparisons. Raster bytes are omitted.
    pub fn to_json(&self, pretty: bool) -> crate::error::Result<String> {
        let result = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        result.map_err(|e| crate::error::Error::Other(format!("JSON serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_prepend_and_remove() {
        let mut page = Page::new(1);
        page.push_op(ContentOp::BeginLine);
        page.prepend_op(ContentOp::Transform(Matrix::rotate_degrees(90.0)));
        assert_eq!(page.ops().len(), 2);
        assert!(matches!(page.ops()[0], ContentOp::Transform(_)));

        let removed = page.remove_first_op();
        assert!(matches!(removed, Some(ContentOp::Transform(_))));
        assert_eq!(page.ops().len(), 1);
        assert!(matches!(page.ops()[0], ContentOp::BeginLine));
    }

    #[test]
    fn test_image_suggested_filename() {
        let img = ImageObject::new(ObjectId(12, 0), vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        assert_eq!(img.suggested_filename(3), "image3.jpg");
        let raw = ImageObject::new(ObjectId(13, 0), vec![], "application/octet-stream");
        assert_eq!(raw.suggested_filename(0), "image0.raw");
    }

    #[test]
    fn test_document_page_count() {
        let doc = Document::new()
            .with_page(Page::new(1))
            .with_page(Page::new(2));
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_document_to_json() {
        let doc = Document::new().with_page(Page::new(1).with_rotation(90));
        let pretty = doc.to_json(true).unwrap();
        assert!(pretty.contains("\"rotation\": 90"));
        assert!(pretty.contains('\n'));
        let compact = doc.to_json(false).unwrap();
        assert!(!compact.contains('\n'));
    }
}
