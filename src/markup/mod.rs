//! Structured-markup output: the sink abstraction and concrete sinks.
//!
//! Markup flows out of the extractor as start-element / characters /
//! end-element events, in document order, written incrementally rather
//! than buffered per document. A sink failure is fatal to the whole
//! extraction and is never retried.

pub mod xhtml;

use crate::error::Result;

pub use xhtml::XhtmlWriter;

/// One markup event, as received by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// An element opened, with its attributes in emission order.
    StartElement {
        /// Element name.
        name: String,
        /// Attribute name/value pairs.
        attrs: Vec<(String, String)>,
    },

    /// Character content inside the current element.
    Characters(String),

    /// An element closed.
    EndElement {
        /// Element name.
        name: String,
    },
}

/// Receiver for the structured markup stream.
pub trait MarkupSink {
    /// An element opens. `attrs` are name/value pairs in a fixed,
    /// documented order.
    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()>;

    /// Character content inside the current element.
    fn characters(&mut self, text: &str) -> Result<()>;

    /// An element closes.
    fn end_element(&mut self, name: &str) -> Result<()>;
}

/// In-memory sink that buffers the full event list.
///
/// Useful in tests and for callers that want the event stream as a value
/// rather than serialized output.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<MarkupEvent>,
}

impl EventCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The events received so far, in order.
    pub fn events(&self) -> &[MarkupEvent] {
        &self.events
    }

    /// Consume the collector and return its events.
    pub fn into_events(self) -> Vec<MarkupEvent> {
        self.events
    }

    /// Concatenated character content of every `Characters` event.
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                MarkupEvent::Characters(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl MarkupSink for EventCollector {
    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.events.push(MarkupEvent::StartElement {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.events.push(MarkupEvent::Characters(text.to_string()));
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        self.events.push(MarkupEvent::EndElement {
            name: name.to_string(),
        });
        Ok(())
    }
}
