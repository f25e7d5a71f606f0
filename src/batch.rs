//! Parallel processing of independent documents.
//!
//! A single document is strictly sequential, but documents share no
//! mutable state: each gets its own extractor, dedup table and error
//! list. A batch caller can therefore fan documents out across a worker
//! pool. The sink factory is called once per document, so sinks never
//! need to be shared between workers.

use rayon::prelude::*;

use crate::error::Result;
use crate::extract::{DocumentExtractor, ExtractorConfig};
use crate::markup::MarkupSink;
use crate::model::page::Document;
use crate::resources::ImageSink;

/// Process a batch of documents in parallel.
///
/// `sink_factory` receives the document's index in the slice and returns
/// the markup and image sinks for that document. Results come back in
/// input order, one per document; each is the same success/failure
/// contract as [`DocumentExtractor::process`]. No retries: a failed
/// document is reported and left as-is.
pub fn process_all<M, I, F>(
    documents: &mut [Document],
    config: &ExtractorConfig,
    sink_factory: F,
) -> Vec<Result<()>>
where
    M: MarkupSink + Send,
    I: ImageSink + Send,
    F: Fn(usize) -> (M, I) + Sync,
{
    documents
        .par_iter_mut()
        .enumerate()
        .map(|(index, document)| {
            let (mut markup, mut images) = sink_factory(index);
            let mut extractor = DocumentExtractor::new(config.clone());
            extractor.process(document, &mut markup, &mut images)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::markup::EventCollector;
    use crate::model::glyph::{FontDescriptor, Glyph};
    use crate::model::page::{ContentOp, Page};
    use crate::resources::NullImageSink;

    fn document_with_text(text: &str) -> Document {
        let font = Arc::new(FontDescriptor::named("Helvetica"));
        let mut page = Page::new(1);
        page.push_op(ContentOp::BeginLine);
        for (i, c) in text.chars().enumerate() {
            page.push_op(ContentOp::ShowGlyph(Glyph::new(
                c.to_string(),
                i as f32 * 5.0,
                10.0,
                5.0,
                8.0,
                font.clone(),
            )));
        }
        Document::new().with_page(page)
    }

    #[test]
    fn test_batch_results_in_input_order() {
        let mut docs = vec![
            document_with_text("one"),
            document_with_text("two"),
            Document::new(),
        ];
        let config = ExtractorConfig::default();
        let results = process_all(&mut docs, &config, |_| {
            (EventCollector::new(), NullImageSink)
        });

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_batch_failures_stay_per_document() {
        let bad = Document::new().with_page(Page::new(1).with_op(ContentOp::Corrupt {
            message: "truncated".into(),
        }));
        let good = document_with_text("fine");
        let mut docs = vec![bad, good];

        let config = ExtractorConfig::default();
        let results = process_all(&mut docs, &config, |_| {
            (EventCollector::new(), NullImageSink)
        });

        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }
}
