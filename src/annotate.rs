//! Text run annotation: turns an ordered glyph run into one styled
//! markup element.
//!
//! Each run becomes a single `<p>` whose `style` attribute carries a
//! CSS-like declaration list describing the run's layout: indentation,
//! starting and running font size, top offsets, font family/weight/style,
//! and word-boundary positions. A downstream renderer can rebuild
//! columns, paragraph breaks and indentation from these attributes alone.
//!
//! Style values within a run are last-glyph-wins: `font-size` and `top`
//! reflect the final glyph processed, not an aggregate. Runs are treated
//! as visually homogeneous fragments; mixed-size runs report the trailing
//! size. Bold and italic are sticky once detected within a run.

use crate::error::Result;
use crate::markup::MarkupSink;
use crate::model::glyph::{FontDescriptor, TextRun};

/// Default word separator between words in a run.
pub const DEFAULT_WORD_SEPARATOR: char = ' ';

/// Annotates text runs with layout style metadata and emits them as
/// markup elements.
#[derive(Debug, Clone)]
pub struct RunAnnotator {
    separator: String,
}

impl RunAnnotator {
    /// Create an annotator with the given word separator.
    pub fn new(separator: char) -> Self {
        Self {
            separator: separator.to_string(),
        }
    }

    /// Emit one `<p style="...">` element for the run.
    ///
    /// Never fails on malformed font descriptors; the only error source
    /// is the sink rejecting a write.
    pub fn annotate(&self, run: &TextRun, sink: &mut dyn MarkupSink) -> Result<()> {
        let style = self.build_style(run);
        sink.start_element("p", &[("style", &style)])?;
        sink.characters(&run.text())?;
        sink.end_element("p")
    }

    /// Assemble the run's style declaration string.
    ///
    /// Declaration order is fixed: `top1`, `start-font-size`,
    /// `font-size`, `font-family`, `font-style`, `font-weight`, `top`,
    /// `position`, `text-indent`, `word-start-positions`, `last-char`,
    /// `word-end-positions`.
    pub fn build_style(&self, run: &TextRun) -> String {
        let glyphs = run.glyphs();
        let first = run.first();

        let mut word_starts: Vec<String> = Vec::new();
        let mut word_ends: Vec<String> = Vec::new();
        let mut last_char_pos = String::from("(0, 0)");

        let mut font_family = String::new();
        let mut font_weight = String::from("normal");
        let mut font_style = String::from("normal");

        let mut font_size = first.height;
        let mut top = first.y;

        for (i, glyph) in glyphs.iter().enumerate() {
            font_size = glyph.height;
            top = glyph.y;

            if glyph.text != self.separator {
                // A word starts at the run edge or after a separator, and
                // ends at the run edge or before one. The two lists stay
                // symmetric: every start has a matching end.
                let at_start = i == 0 || glyphs[i - 1].text == self.separator;
                let at_end = i + 1 == glyphs.len() || glyphs[i + 1].text == self.separator;
                if at_start {
                    word_starts.push(format_pos(glyph.x, glyph.y));
                }
                if at_end {
                    word_ends.push(format_pos(glyph.x, glyph.y));
                }
            }

            last_char_pos = format_pos(glyph.x, glyph.y);

            self.resolve_font(&glyph.font, &mut font_family, &mut font_weight, &mut font_style);
        }

        format!(
            "top1:{}px;start-font-size:{}px;font-size:{}px;font-family:{};font-style:{};\
             font-weight:{};top:{}px;position:absolute;text-indent:{}px;\
             word-start-positions:[{}];last-char:{};word-end-positions:[{}]",
            first.y,
            first.height,
            font_size,
            font_family,
            font_style,
            font_weight,
            top,
            first.x,
            word_starts.join(", "),
            last_char_pos,
            word_ends.join(", "),
        )
    }

    /// Update the run's family/weight/style strings from one glyph's
    /// descriptor.
    fn resolve_font(
        &self,
        descriptor: &FontDescriptor,
        family: &mut String,
        weight: &mut String,
        style: &mut String,
    ) {
        match &descriptor.family {
            Some(f) => *family = f.clone(),
            None => {
                // Derive from the internal name: strip the subsetting
                // prefix before the first '+', then treat a ',' suffix as
                // a style hint.
                let mut name = descriptor.name.as_str();
                if let Some(idx) = name.find('+') {
                    name = &name[idx + 1..];
                }
                if let Some((base, hint)) = name.split_once(',') {
                    if hint.to_lowercase().contains("bold") {
                        *weight = "bold".to_string();
                    }
                    name = base;
                }
                *family = name.to_string();
            }
        }

        if weight.as_str() == "normal" && descriptor.weight >= 100.0 {
            *weight = format!("{}", descriptor.weight);
        }
        if descriptor.italic_angle != 0.0 {
            *style = "italic".to_string();
        }
    }

    /// Word-start positions for a run, as `(x, y)` strings. Exposed for
    /// callers that want boundary data without emitting markup.
    pub fn word_boundaries(&self, run: &TextRun) -> (Vec<(f32, f32)>, Vec<(f32, f32)>) {
        let glyphs = run.glyphs();
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        for (i, glyph) in glyphs.iter().enumerate() {
            if glyph.text == self.separator {
                continue;
            }
            if i == 0 || glyphs[i - 1].text == self.separator {
                starts.push((glyph.x, glyph.y));
            }
            if i + 1 == glyphs.len() || glyphs[i + 1].text == self.separator {
                ends.push((glyph.x, glyph.y));
            }
        }
        (starts, ends)
    }
}

impl Default for RunAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_SEPARATOR)
    }
}

fn format_pos(x: f32, y: f32) -> String {
    format!("({}, {})", x, y)
}
