//! Integration tests for embedded raster resource extraction.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use glyphml::model::{ContentOp, Document, ImageObject, ObjectId, Page};
use glyphml::resources::{CollectingImageSink, ImageSink};
use glyphml::{process_document, Error, EventCollector, ExtractorConfig, MarkupEvent, Result};

fn jpeg(id: u32) -> Arc<ImageObject> {
    Arc::new(
        ImageObject::new(ObjectId(id, 0), vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg")
            .with_dimensions(100, 80),
    )
}

fn page_with_images(number: u32, images: Vec<Arc<ImageObject>>) -> Page {
    let mut page = Page::new(number);
    for img in images {
        page.push_op(ContentOp::PaintImage(img));
    }
    page
}

#[test]
fn test_shared_resource_extracted_exactly_once() {
    let shared = jpeg(42);
    let mut doc = Document::new()
        .with_page(page_with_images(1, vec![shared.clone()]))
        .with_page(page_with_images(2, vec![shared.clone()]))
        .with_page(page_with_images(3, vec![shared]));

    let config = ExtractorConfig::new()
        .with_inline_images(true)
        .with_unique_resources_only(true);

    let mut markup = EventCollector::new();
    let mut sink = CollectingImageSink::new();
    process_document(&mut doc, &mut markup, &mut sink, &config).unwrap();

    assert_eq!(sink.calls.len(), 3);
    assert_eq!(sink.extracted_count(), 1);
    assert!(sink.calls[0].should_extract);
    assert!(!sink.calls[1].should_extract);
    assert!(!sink.calls[2].should_extract);
    // Duplicates keep the first occurrence's display name.
    let names: Vec<&str> = sink.calls.iter().map(|c| c.suggested_name.as_str()).collect();
    assert_eq!(names, vec!["image0.jpg", "image0.jpg", "image0.jpg"]);
}

#[test]
fn test_without_unique_policy_every_occurrence_extracts() {
    let shared = jpeg(42);
    let mut doc = Document::new()
        .with_page(page_with_images(1, vec![shared.clone()]))
        .with_page(page_with_images(2, vec![shared]));

    let config = ExtractorConfig::new().with_inline_images(true);
    let mut markup = EventCollector::new();
    let mut sink = CollectingImageSink::new();
    process_document(&mut doc, &mut markup, &mut sink, &config).unwrap();

    assert_eq!(sink.extracted_count(), 2);
}

#[test]
fn test_disabled_extraction_never_touches_sink() {
    let mut doc = Document::new().with_page(page_with_images(1, vec![jpeg(1)]));

    let config = ExtractorConfig::default();
    let mut markup = EventCollector::new();
    let mut sink = CollectingImageSink::new();
    process_document(&mut doc, &mut markup, &mut sink, &config).unwrap();

    assert!(sink.calls.is_empty());
    let imgs = markup
        .events()
        .iter()
        .filter(|e| matches!(e, MarkupEvent::StartElement { name, .. } if name == "img"))
        .count();
    assert_eq!(imgs, 0);
}

#[test]
fn test_metadata_only_emits_markup_without_bytes() {
    let mut doc = Document::new().with_page(page_with_images(1, vec![jpeg(1), jpeg(2)]));

    let config = ExtractorConfig::new().with_resource_metadata_only(true);
    let mut markup = EventCollector::new();
    let mut sink = CollectingImageSink::new();
    process_document(&mut doc, &mut markup, &mut sink, &config).unwrap();

    assert_eq!(sink.extracted_count(), 0);
    let imgs = markup
        .events()
        .iter()
        .filter(|e| matches!(e, MarkupEvent::StartElement { name, .. } if name == "img"))
        .count();
    assert_eq!(imgs, 2);
}

/// Sink that fails for specific object ids.
struct FlakySink {
    fail_ids: Vec<u32>,
    calls: u32,
}

impl ImageSink for FlakySink {
    fn write_image(&mut self, image: &ImageObject, _: &str, _: bool) -> Result<bool> {
        self.calls += 1;
        if self.fail_ids.contains(&image.id.0) {
            Err(Error::ImageExtract(format!("object {} unreadable", image.id.0)))
        } else {
            Ok(true)
        }
    }
}

#[test]
fn test_first_resource_error_per_page_surfaces() {
    let mut doc =
        Document::new().with_page(page_with_images(1, vec![jpeg(1), jpeg(2), jpeg(3)]));

    let config = ExtractorConfig::new().with_inline_images(true);
    let mut markup = EventCollector::new();
    let mut sink = FlakySink {
        fail_ids: vec![1, 2],
        calls: 0,
    };
    let err = process_document(&mut doc, &mut markup, &mut sink, &config).unwrap_err();

    // Without the intermediate-errors flag only the first failure on
    // the page is kept.
    match err {
        Error::Incomplete { first, suppressed } => {
            assert!(first.error.to_string().contains("object 1"));
            assert!(suppressed.is_empty());
        }
        other => panic!("expected Incomplete, got {:?}", other),
    }
    assert_eq!(sink.calls, 3);
}

#[test]
fn test_intermediate_errors_collected_under_flag() {
    let mut doc =
        Document::new().with_page(page_with_images(1, vec![jpeg(1), jpeg(2), jpeg(3)]));

    let config = ExtractorConfig::new()
        .with_inline_images(true)
        .with_intermediate_errors(true);
    let mut markup = EventCollector::new();
    let mut sink = FlakySink {
        fail_ids: vec![1, 2],
        calls: 0,
    };
    let err = process_document(&mut doc, &mut markup, &mut sink, &config).unwrap_err();

    match err {
        Error::Incomplete { first, suppressed } => {
            assert!(first.error.to_string().contains("object 1"));
            assert_eq!(suppressed.len(), 1);
            assert!(suppressed[0].error.to_string().contains("object 2"));
        }
        other => panic!("expected Incomplete, got {:?}", other),
    }
}

/// Sink that writes extracted images into a directory.
struct DirSink {
    dir: PathBuf,
}

impl ImageSink for DirSink {
    fn write_image(
        &mut self,
        image: &ImageObject,
        suggested_name: &str,
        should_extract: bool,
    ) -> Result<bool> {
        if !should_extract {
            return Ok(false);
        }
        fs::write(self.dir.join(suggested_name), &image.data)?;
        Ok(true)
    }
}

#[test]
fn test_file_backed_sink_writes_unique_images() {
    let dir = tempfile::tempdir().unwrap();
    let shared = jpeg(7);
    let mut doc = Document::new()
        .with_page(page_with_images(1, vec![shared.clone(), jpeg(8)]))
        .with_page(page_with_images(2, vec![shared]));

    let config = ExtractorConfig::new()
        .with_inline_images(true)
        .with_unique_resources_only(true);
    let mut markup = EventCollector::new();
    let mut sink = DirSink {
        dir: dir.path().to_path_buf(),
    };
    process_document(&mut doc, &mut markup, &mut sink, &config).unwrap();

    let mut written: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(written, vec!["image0.jpg", "image1.jpg"]);
}
