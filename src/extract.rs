//! Document extraction: per-page orchestration, the content-stream walk,
//! and error routing.
//!
//! The extractor drives one document at a time, strictly sequentially:
//! for each page it walks the operator stream (directly, or once per
//! rotation angle when rotation detection is on), hands completed glyph
//! runs to the [`RunAnnotator`], runs the resource engine at end of page,
//! and records recoverable failures without aborting the document. Markup
//! flows to the sink incrementally, in page order.

use crate::annotate::{RunAnnotator, DEFAULT_WORD_SEPARATOR};
use crate::error::{Error, ErrorRecord, Result};
use crate::markup::MarkupSink;
use crate::model::geometry::Matrix;
use crate::model::glyph::TextRun;
use crate::model::page::{ContentOp, Document, Page};
use crate::resources::{ImagePolicy, ImageSink, ResourceExtractor};
use crate::rotation;

/// Extraction configuration, builder style.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Run the raster resource engine and delegate image bytes.
    pub extract_inline_images: bool,

    /// Extract each distinct resource at most once per document.
    pub extract_unique_resources_only: bool,

    /// Enumerate and describe resources without delegating bytes.
    pub extract_resource_metadata_only: bool,

    /// Detect per-glyph rotation and reprocess pages once per angle.
    pub detect_rotated_text: bool,

    /// Keep per-resource errors after the first on a page instead of
    /// dropping them.
    pub catch_intermediate_errors: bool,

    /// Word separator used for boundary detection.
    pub word_separator: char,
}

impl ExtractorConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable image byte extraction.
    pub fn with_inline_images(mut self, extract: bool) -> Self {
        self.extract_inline_images = extract;
        self
    }

    /// Enable or disable unique-only resource extraction.
    pub fn with_unique_resources_only(mut self, unique: bool) -> Self {
        self.extract_unique_resources_only = unique;
        self
    }

    /// Enable or disable metadata-only resource handling.
    pub fn with_resource_metadata_only(mut self, metadata_only: bool) -> Self {
        self.extract_resource_metadata_only = metadata_only;
        self
    }

    /// Enable or disable rotated-text detection.
    pub fn with_rotation_detection(mut self, detect: bool) -> Self {
        self.detect_rotated_text = detect;
        self
    }

    /// Enable or disable collection of intermediate resource errors.
    pub fn with_intermediate_errors(mut self, catch: bool) -> Self {
        self.catch_intermediate_errors = catch;
        self
    }

    /// Set the word separator.
    pub fn with_word_separator(mut self, separator: char) -> Self {
        self.word_separator = separator;
        self
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            extract_inline_images: false,
            extract_unique_resources_only: false,
            extract_resource_metadata_only: false,
            detect_rotated_text: false,
            catch_intermediate_errors: false,
            word_separator: DEFAULT_WORD_SEPARATOR,
        }
    }
}

/// Drives extraction of one document into a markup sink and an image
/// sink.
///
/// Holds the document-scoped state: the resource dedup table and the
/// accumulated error records. Not safe for concurrent use against the
/// same document; different documents are independent (see
/// [`crate::batch`]).
pub struct DocumentExtractor {
    config: ExtractorConfig,
    annotator: RunAnnotator,
    resources: ResourceExtractor,
    errors: Vec<ErrorRecord>,
}

impl DocumentExtractor {
    /// Create an extractor for one document.
    pub fn new(config: ExtractorConfig) -> Self {
        let annotator = RunAnnotator::new(config.word_separator);
        let resources = ResourceExtractor::new(ImagePolicy {
            unique_only: config.extract_unique_resources_only,
            metadata_only: config.extract_resource_metadata_only,
        });
        Self {
            config,
            annotator,
            resources,
            errors: Vec::new(),
        }
    }

    /// Process every page of the document, emitting markup incrementally.
    ///
    /// Recoverable per-page and per-resource errors are recorded and
    /// processing continues; if any were recorded the call returns
    /// [`Error::Incomplete`] carrying the first as the representative
    /// failure and the rest as suppressed diagnostics. Fatal errors
    /// (sink rejections, structural failures) abort immediately without
    /// being recorded. The page borrow is mutable because rotation
    /// compensation temporarily rewrites page state; it is restored
    /// before returning.
    pub fn process(
        &mut self,
        document: &mut Document,
        markup: &mut dyn MarkupSink,
        images: &mut dyn ImageSink,
    ) -> Result<()> {
        markup.start_element("html", &[])?;
        markup.start_element("body", &[])?;

        for page in &mut document.pages {
            self.process_page(page, markup, images)?;
        }

        markup.end_element("body")?;
        markup.end_element("html")?;

        if self.errors.is_empty() {
            Ok(())
        } else {
            let mut records = std::mem::take(&mut self.errors);
            let first = records.remove(0);
            Err(Error::Incomplete {
                first: Box::new(first),
                suppressed: records,
            })
        }
    }

    /// Error records accumulated so far.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Process one page: content walk, end-of-page image pass, page
    /// wrapper markup. A recoverable mid-page error still closes the
    /// page cleanly.
    fn process_page(
        &mut self,
        page: &mut Page,
        markup: &mut dyn MarkupSink,
        images: &mut dyn ImageSink,
    ) -> Result<()> {
        let number = page.number;
        log::debug!("processing page {}", number);
        let page_attr = number.to_string();
        markup.start_element("div", &[("class", "page"), ("data-page", &page_attr)])?;

        let walked = if self.config.detect_rotated_text {
            self.walk_with_rotation(page, markup)
        } else {
            self.walk_content(page, markup, false)
        };
        match walked {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => self.record(number, e),
            Err(e) => return Err(e),
        }

        if self.config.extract_inline_images || self.config.extract_resource_metadata_only {
            match self.resources.extract_page(page, markup, images) {
                Ok(mut resource_errors) => {
                    if !resource_errors.is_empty() {
                        // First resource failure on the page always
                        // surfaces; the rest only under the policy flag.
                        let first = resource_errors.remove(0);
                        self.record(number, first);
                        if self.config.catch_intermediate_errors {
                            for e in resource_errors {
                                self.record(number, e);
                            }
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        markup.end_element("div")
    }

    /// Rotation-aware page processing: one content walk per distinct
    /// angle, each with its compensation in place, emitting only glyphs
    /// upright under it.
    fn walk_with_rotation(&mut self, page: &mut Page, markup: &mut dyn MarkupSink) -> Result<()> {
        let number = page.number;
        let annotator = self.annotator.clone();
        let mut recovered: Vec<ErrorRecord> = Vec::new();

        let result = rotation::reprocess_by_angle(page, |page, angle| {
            log::debug!("page {}: rotation pass at {} degrees", number, angle);
            match walk_ops(page, &annotator, markup, true) {
                Ok(()) => Ok(()),
                Err(e) if e.is_recoverable() => {
                    // Abandon this pass, keep the rest.
                    recovered.push(ErrorRecord::new(number, e));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        });

        self.errors.append(&mut recovered);
        result
    }

    /// Single-pass content walk over a page.
    fn walk_content(
        &mut self,
        page: &Page,
        markup: &mut dyn MarkupSink,
        only_upright: bool,
    ) -> Result<()> {
        walk_ops(page, &self.annotator, markup, only_upright)
    }

    fn record(&mut self, page: u32, error: Error) {
        log::warn!("recoverable error on page {}: {}", page, error);
        self.errors.push(ErrorRecord::new(page, error));
    }
}

/// Walk a page's operator stream, building text runs between structural
/// breaks and handing each completed run to the annotator.
///
/// Tracks the current transform from `Transform` operators and applies
/// it to glyph positions. With `only_upright` set, glyphs whose composed
/// matrix is not at angle 0 are skipped; they belong to another rotation
/// pass.
fn walk_ops(
    page: &Page,
    annotator: &RunAnnotator,
    markup: &mut dyn MarkupSink,
    only_upright: bool,
) -> Result<()> {
    let mut ctm = Matrix::IDENTITY;
    let mut pending = Vec::new();

    for op in page.ops() {
        match op {
            ContentOp::Transform(m) => ctm = m.concat(&ctm),
            ContentOp::BeginLine => flush_run(&mut pending, annotator, markup)?,
            ContentOp::ShowGlyph(glyph) => {
                let effective = glyph
                    .text_matrix
                    .concat(&glyph.font.font_matrix)
                    .concat(&ctm);
                if only_upright && effective.rotation_degrees() != 0 {
                    continue;
                }
                let mut placed = glyph.clone();
                let p = ctm.apply(crate::model::geometry::Point::new(glyph.x, glyph.y));
                placed.x = p.x;
                placed.y = p.y;
                placed.text_matrix = effective;
                pending.push(placed);
            }
            ContentOp::PaintImage(_) | ContentOp::InlineImage(_) => {
                // Raster operators are handled by the end-of-page
                // resource pass.
            }
            ContentOp::Corrupt { message } => {
                return Err(Error::ContentStream {
                    page: page.number,
                    message: message.clone(),
                });
            }
        }
    }

    flush_run(&mut pending, annotator, markup)
}

fn flush_run(
    pending: &mut Vec<crate::model::glyph::Glyph>,
    annotator: &RunAnnotator,
    markup: &mut dyn MarkupSink,
) -> Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    let glyphs = std::mem::take(pending);
    // Non-empty by the check above.
    if let Some(run) = TextRun::new(glyphs) {
        annotator.annotate(&run, markup)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::markup::{EventCollector, MarkupEvent};
    use crate::model::glyph::{FontDescriptor, Glyph};
    use crate::resources::NullImageSink;

    fn font() -> Arc<FontDescriptor> {
        Arc::new(FontDescriptor::named("Helvetica"))
    }

    fn show(text: &str, x: f32, y: f32) -> ContentOp {
        ContentOp::ShowGlyph(Glyph::new(text, x, y, 5.0, 8.0, font()))
    }

    fn simple_document() -> Document {
        let mut page = Page::new(1);
        page.push_op(ContentOp::BeginLine);
        page.push_op(show("H", 0.0, 10.0));
        page.push_op(show("i", 5.0, 10.0));
        page.push_op(ContentOp::BeginLine);
        page.push_op(show("!", 0.0, 20.0));
        Document::new().with_page(page)
    }

    #[test]
    fn test_process_emits_wrappers_and_paragraphs() {
        let mut doc = simple_document();
        let mut markup = EventCollector::new();
        let mut extractor = DocumentExtractor::new(ExtractorConfig::default());
        extractor
            .process(&mut doc, &mut markup, &mut NullImageSink)
            .unwrap();

        let names: Vec<&str> = markup
            .events()
            .iter()
            .filter_map(|e| match e {
                MarkupEvent::StartElement { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["html", "body", "div", "p", "p"]);
        assert_eq!(markup.text(), "Hi!");
    }

    #[test]
    fn test_empty_trailing_run_not_emitted() {
        let mut page = Page::new(1);
        page.push_op(ContentOp::BeginLine);
        page.push_op(show("a", 0.0, 10.0));
        page.push_op(ContentOp::BeginLine);
        let mut doc = Document::new().with_page(page);

        let mut markup = EventCollector::new();
        let mut extractor = DocumentExtractor::new(ExtractorConfig::default());
        extractor
            .process(&mut doc, &mut markup, &mut NullImageSink)
            .unwrap();

        let paragraphs = markup
            .events()
            .iter()
            .filter(|e| matches!(e, MarkupEvent::StartElement { name, .. } if name == "p"))
            .count();
        assert_eq!(paragraphs, 1);
    }

    #[test]
    fn test_idempotent_event_stream() {
        let config = ExtractorConfig::default().with_rotation_detection(true);

        let run = || {
            let mut doc = simple_document();
            let mut markup = EventCollector::new();
            DocumentExtractor::new(config.clone())
                .process(&mut doc, &mut markup, &mut NullImageSink)
                .unwrap();
            markup.into_events()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_config_builder() {
        let config = ExtractorConfig::new()
            .with_inline_images(true)
            .with_unique_resources_only(true)
            .with_rotation_detection(true)
            .with_intermediate_errors(true)
            .with_word_separator('\u{00a0}');
        assert!(config.extract_inline_images);
        assert!(config.extract_unique_resources_only);
        assert!(config.detect_rotated_text);
        assert!(config.catch_intermediate_errors);
        assert_eq!(config.word_separator, '\u{00a0}');
    }
}
