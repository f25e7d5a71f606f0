//! # glyphml
//!
//! Layout-preserving structured markup extraction from parsed PDF page
//! graphs.
//!
//! Given a decoded document object graph (pages, content-stream
//! operators, fonts, embedded raster resources — produced by an external
//! container parser), glyphml emits an XHTML-like event stream whose
//! per-paragraph style attributes carry enough positional and
//! typographic metadata (indentation, font sizes, top offsets, font
//! family/weight/style, word-boundary positions) for a downstream
//! renderer to reconstruct visual layout without re-reading the source
//! document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use glyphml::{process_document, ExtractorConfig, NullImageSink, XhtmlWriter};
//! use glyphml::model::Document;
//!
//! fn main() -> glyphml::Result<()> {
//!     let mut doc: Document = load_from_upstream_parser();
//!     let mut markup = XhtmlWriter::new(Vec::new());
//!     let config = ExtractorConfig::new().with_rotation_detection(true);
//!
//!     process_document(&mut doc, &mut markup, &mut NullImageSink, &config)?;
//!     let xhtml = String::from_utf8(markup.into_inner()).unwrap();
//!     println!("{}", xhtml);
//!     Ok(())
//! }
//! # fn load_from_upstream_parser() -> Document { Document::new() }
//! ```
//!
//! ## Features
//!
//! - **Layout-aware paragraphs**: one styled `<p>` per text run, with
//!   per-run CSS-like layout metadata
//! - **At-most-once image extraction**: dedup by stream-object identity,
//!   stable display ids for duplicate references
//! - **Rotated text**: per-page angle detection and one compensated
//!   reprocessing pass per orientation
//! - **Per-page error recovery**: a malformed page is recorded, not
//!   fatal; the first record becomes the representative failure
//! - **Batch parallelism**: independent documents fan out over a worker
//!   pool (`batch::process_all`)

pub mod annotate;
pub mod batch;
pub mod error;
pub mod extract;
pub mod markup;
pub mod model;
pub mod resources;
pub mod rotation;

// Re-export commonly used types
pub use annotate::{RunAnnotator, DEFAULT_WORD_SEPARATOR};
pub use error::{Error, ErrorRecord, Result};
pub use extract::{DocumentExtractor, ExtractorConfig};
pub use markup::{EventCollector, MarkupEvent, MarkupSink, XhtmlWriter};
pub use model::{ContentOp, Document, FontDescriptor, Glyph, ImageObject, Matrix, ObjectId, Page, Point, TextRun};
pub use resources::{CollectingImageSink, DedupTable, ImagePolicy, ImageSink, NullImageSink, ResourceExtractor};

/// Process one document with the given configuration.
///
/// Convenience wrapper around [`DocumentExtractor`]: markup events flow
/// to `markup` incrementally in page order, raster bytes go to `images`,
/// and recoverable per-page failures are reported at the end as
/// [`Error::Incomplete`] with the first record as the representative
/// cause.
pub fn process_document(
    document: &mut model::Document,
    markup: &mut dyn MarkupSink,
    images: &mut dyn ImageSink,
    config: &ExtractorConfig,
) -> Result<()> {
    DocumentExtractor::new(config.clone()).process(document, markup, images)
}
