//! XHTML serializing sink.

use std::io::Write;

use crate::error::{Error, Result};

use super::MarkupSink;

/// Markup sink that serializes events as XHTML to any [`Write`].
///
/// Attribute values and character content are escaped minimally
/// (`&`, `<`, `>`, `"`). Write failures surface as [`Error::Sink`] and
/// abort the extraction.
pub struct XhtmlWriter<W: Write> {
    out: W,
}

impl<W: Write> XhtmlWriter<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, s: &str) -> Result<()> {
        self.out
            .write_all(s.as_bytes())
            .map_err(|e| Error::Sink(e.to_string()))
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl<W: Write> MarkupSink for XhtmlWriter<W> {
    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write("<")?;
        self.write(name)?;
        for (key, value) in attrs {
            self.write(" ")?;
            self.write(key)?;
            self.write("=\"")?;
            self.write(&escape(value))?;
            self.write("\"")?;
        }
        self.write(">")
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.write(&escape(text))
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        self.write("</")?;
        self.write(name)?;
        self.write(">")
    }
}
