//! Coverage validation of captured tiles against the target canvas

use crate::geometry::Rect;
use crate::{Error, Result};

/// Whether `rects` cover `0..canvas_height` with no gap.
///
/// Rects are ordered by top edge; the first must start within `tolerance` of
/// zero, each following one must start no lower than the running bottom plus
/// `tolerance`, and the final bottom must land within
/// `max(tolerance, 1% of canvas_height)` of the canvas height. Small overlaps
/// are fine. An empty set never covers anything.
pub fn is_fully_covered<I>(rects: I, canvas_height: f64, tolerance: f64) -> bool
where
    I: IntoIterator<Item = Rect>,
{
    let mut sorted: Vec<Rect> = rects.into_iter().collect();
    sorted.sort_by(|a, b| a.min_y().total_cmp(&b.min_y()));

    let Some(first) = sorted.first() else {
        return false;
    };
    if first.min_y() > tolerance {
        return false;
    }

    let mut covered_max_y = first.max_y();
    for rect in &sorted[1..] {
        if rect.min_y() > covered_max_y + tolerance {
            return false;
        }
        covered_max_y = covered_max_y.max(rect.max_y());
    }

    let bottom_tolerance = tolerance.max(canvas_height * 0.01);
    (covered_max_y - canvas_height).abs() <= bottom_tolerance
}

/// Check the destination rects of drawn tiles, failing with
/// [`Error::IncompleteComposedImage`] when coverage is incomplete.
pub fn validate_coverage(placed: &[Rect], canvas_height: f64, tolerance: f64) -> Result<()> {
    if is_fully_covered(placed.iter().copied(), canvas_height, tolerance) {
        Ok(())
    } else {
        log::warn!(
            "{} tile(s) do not cover canvas height {}",
            placed.len(),
            canvas_height
        );
        Err(Error::IncompleteComposedImage)
    }
}
