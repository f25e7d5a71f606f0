//! Embedded raster resource extraction.
//!
//! Walks a page's drawing operators once, in content-stream order, finds
//! inline and referenced raster objects, and hands their bytes to an
//! [`ImageSink`]. Identity comes from the underlying stream object
//! ([`crate::model::ObjectId`]), so the same object painted from several
//! places extracts at most once per document under the unique-only
//! policy. A per-page visited set keeps self-referential resource graphs
//! from being walked more than once per page.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::markup::MarkupSink;
use crate::model::page::{ContentOp, ImageObject, ObjectId, Page};

/// Receiver for extracted raster bytes.
///
/// The sink decides destination, path and naming; `suggested_name` is a
/// hint derived from the resource's display id and MIME type. When
/// `should_extract` is false the resource is a duplicate (or metadata-only
/// mode is active) and the sink should skip the bytes but may still
/// account for the reference. Returns whether bytes were written.
pub trait ImageSink {
    /// Offer one raster resource to the sink.
    fn write_image(
        &mut self,
        image: &ImageObject,
        suggested_name: &str,
        should_extract: bool,
    ) -> Result<bool>;
}

/// Image sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullImageSink;

impl ImageSink for NullImageSink {
    fn write_image(&mut self, _: &ImageObject, _: &str, _: bool) -> Result<bool> {
        Ok(false)
    }
}

/// One call received by [`CollectingImageSink`].
#[derive(Debug, Clone)]
pub struct ImageSinkCall {
    /// Identity of the offered resource.
    pub id: ObjectId,
    /// The suggested file name.
    pub suggested_name: String,
    /// Whether extraction was requested.
    pub should_extract: bool,
}

/// Image sink that records every call. Used by tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingImageSink {
    /// Calls in the order received.
    pub calls: Vec<ImageSinkCall>,
}

impl CollectingImageSink {
    /// Create an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many calls requested extraction.
    pub fn extracted_count(&self) -> usize {
        self.calls.iter().filter(|c| c.should_extract).count()
    }
}

impl ImageSink for CollectingImageSink {
    fn write_image(
        &mut self,
        image: &ImageObject,
        suggested_name: &str,
        should_extract: bool,
    ) -> Result<bool> {
        self.calls.push(ImageSinkCall {
            id: image.id,
            suggested_name: suggested_name.to_string(),
            should_extract,
        });
        Ok(should_extract)
    }
}

/// Document-scoped dedup table: resource identity to display sequence
/// number.
///
/// Created at document start, discarded at document end. The visitation
/// counter increments on every visit, extracted or not, so display
/// identifiers stay stable for referenced-but-skipped duplicates.
#[derive(Debug, Default)]
pub struct DedupTable {
    seen: HashMap<ObjectId, u32>,
    visits: u32,
}

/// Outcome of recording one resource visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Display sequence number for this resource (stable across
    /// duplicate references).
    pub seq: u32,
    /// Whether this is the first visit to the resource in the document.
    pub first: bool,
}

impl DedupTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit to `id`.
    pub fn visit(&mut self, id: ObjectId) -> Visit {
        self.visits += 1;
        match self.seen.get(&id) {
            Some(&seq) => Visit { seq, first: false },
            None => {
                let seq = self.seen.len() as u32;
                self.seen.insert(id, seq);
                Visit { seq, first: true }
            }
        }
    }

    /// Total visits recorded, duplicates included.
    pub fn visit_count(&self) -> u32 {
        self.visits
    }

    /// Number of distinct resources seen.
    pub fn distinct_count(&self) -> usize {
        self.seen.len()
    }
}

/// Extraction policy for one document.
#[derive(Debug, Clone, Copy)]
pub struct ImagePolicy {
    /// Extract at most one copy of each distinct resource.
    pub unique_only: bool,
    /// Enumerate and describe resources without delegating bytes.
    pub metadata_only: bool,
}

/// Walks pages for raster resources and delegates bytes to a sink.
///
/// Holds the document-scoped [`DedupTable`]; construct once per document
/// and call [`ResourceExtractor::extract_page`] at each end-of-page.
#[derive(Debug)]
pub struct ResourceExtractor {
    policy: ImagePolicy,
    dedup: DedupTable,
}

impl ResourceExtractor {
    /// Create an extractor for one document.
    pub fn new(policy: ImagePolicy) -> Self {
        Self {
            policy,
            dedup: DedupTable::new(),
        }
    }

    /// The dedup table, for inspection.
    pub fn dedup(&self) -> &DedupTable {
        &self.dedup
    }

    /// Walk one page's operators for raster resources.
    ///
    /// Returns the per-resource recoverable errors encountered on the
    /// page, in order; the caller decides how many to keep. Sink
    /// (markup or byte) failures that are not recoverable propagate
    /// immediately.
    pub fn extract_page(
        &mut self,
        page: &Page,
        markup: &mut dyn MarkupSink,
        images: &mut dyn ImageSink,
    ) -> Result<Vec<Error>> {
        let mut errors = Vec::new();
        let mut visited_this_page: HashSet<ObjectId> = HashSet::new();

        for op in page.ops() {
            let image = match op {
                ContentOp::PaintImage(img) | ContentOp::InlineImage(img) => img,
                _ => continue,
            };

            // At most one visit per page per object, whatever the
            // operator count. Self-referential graphs stop here.
            if !visited_this_page.insert(image.id) {
                continue;
            }

            let visit = self.dedup.visit(image.id);
            let duplicate = self.policy.unique_only && !visit.first;
            let should_extract = !self.policy.metadata_only && !duplicate;

            let name = image.suggested_filename(visit.seq);
            self.emit_markup(markup, image, &name)?;

            match images.write_image(image, &name, should_extract) {
                Ok(written) => {
                    log::debug!(
                        "page {}: image {} ({}), extract={} written={}",
                        page.number,
                        visit.seq,
                        image.mime_type,
                        should_extract,
                        written
                    );
                }
                Err(e) if e.is_recoverable() => errors.push(e),
                Err(e) => return Err(e),
            }
        }

        Ok(errors)
    }

    /// Emit the `<img>` element describing a visited resource.
    fn emit_markup(
        &self,
        markup: &mut dyn MarkupSink,
        image: &ImageObject,
        name: &str,
    ) -> Result<()> {
        let src = format!("embedded:{}", name);
        let width = image.width.map(|w| w.to_string());
        let height = image.height.map(|h| h.to_string());
        let bits = image.bits_per_component.map(|b| b.to_string());

        let mut attrs: Vec<(&str, &str)> = vec![("src", &src)];
        if let Some(alt) = &image.name {
            attrs.push(("alt", alt));
        }
        if let Some(w) = &width {
            attrs.push(("width", w));
        }
        if let Some(h) = &height {
            attrs.push(("height", h));
        }
        if let Some(cs) = &image.color_space {
            attrs.push(("color-space", cs));
        }
        if let Some(b) = &bits {
            attrs.push(("bits-per-component", b));
        }

        markup.start_element("img", &attrs)?;
        markup.end_element("img")
    }
}
