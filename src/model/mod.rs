//! Data model for the decoded page object graph and the glyph stream.

pub mod geometry;
pub mod glyph;
pub mod page;

pub use geometry::{Matrix, Point};
pub use glyph::{FontDescriptor, Glyph, TextRun};
pub use page::{ContentOp, Document, ImageObject, ObjectId, Page};
