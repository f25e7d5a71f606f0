//! Rotation detection and per-angle page reprocessing.
//!
//! Content streams can mix text at several orientations (rotated
//! captions, sideways tables). A single top-to-bottom walk would
//! interleave or drop those glyphs, so pages are handled in two passes:
//! first a detection walk collects the distinct rotation angles present,
//! then the page is reprocessed once per angle with a compensating
//! rotation prepended to its operator stream, so the normal run-building
//! logic sees each orientation upright. The page's intrinsic rotation and
//! operator stream are restored on every exit path.

use crate::error::Result;
use crate::model::geometry::Matrix;
use crate::model::page::{ContentOp, Page};

/// Collect the distinct glyph rotation angles present on a page.
///
/// Walks every glyph once without emitting markup. Each angle comes from
/// the glyph's text matrix composed with its font matrix and the current
/// transform, rounded to integer degrees in `[0, 360)`. The result is
/// sorted so reprocessing order is deterministic.
pub fn collect_angles(page: &Page) -> Vec<i32> {
    let mut ctm = Matrix::IDENTITY;
    let mut angles: Vec<i32> = Vec::new();

    for op in page.ops() {
        match op {
            ContentOp::Transform(m) => ctm = m.concat(&ctm),
            ContentOp::ShowGlyph(glyph) => {
                let angle = glyph
                    .text_matrix
                    .concat(&glyph.font.font_matrix)
                    .concat(&ctm)
                    .rotation_degrees();
                if !angles.contains(&angle) {
                    angles.push(angle);
                }
            }
            _ => {}
        }
    }

    angles.sort_unstable();
    angles
}

/// The compensating transform for a pass targeting `angle`.
pub fn compensation(angle: i32) -> ContentOp {
    ContentOp::Transform(Matrix::rotate_degrees(-(angle as f32)))
}

/// Reprocess a page once per distinct rotation angle.
///
/// Zeroes the page's intrinsic rotation, then for each detected angle
/// invokes `process(page, angle)` — with a compensating transform
/// prepended to the operator stream for non-zero angles, removed again
/// before the next pass. The intrinsic rotation is restored whether the
/// passes succeed or fail.
///
/// `process` sees the page with the current pass's compensation in place
/// and is expected to emit only glyphs that are upright under it;
/// recoverable errors should be absorbed inside `process` (returning
/// `Ok`) so later angles still run, while a returned error aborts the
/// remaining passes.
pub fn reprocess_by_angle<F>(page: &mut Page, mut process: F) -> Result<()>
where
    F: FnMut(&Page, i32) -> Result<()>,
{
    let angles = collect_angles(page);
    let original_rotation = page.rotation;
    page.rotation = 0;

    let result = (|| {
        for angle in angles {
            if angle == 0 {
                process(page, 0)?;
            } else {
                page.prepend_op(compensation(angle));
                let pass = process(page, angle);
                page.remove_first_op();
                pass?;
            }
        }
        Ok(())
    })();

    page.rotation = original_rotation;
    result
}
