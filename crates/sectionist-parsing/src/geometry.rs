use sectionist_core::{BackendError, DEFAULT_HORIZONTAL_TOLERANCE, Drawing, LineSegment, PdfPage};

/// Horizontal rule lines on `page`, top to bottom.
pub fn horizontal_lines(page: &dyn PdfPage) -> Result<Vec<LineSegment>, BackendError> {
    horizontal_lines_with_tolerance(page, DEFAULT_HORIZONTAL_TOLERANCE)
}

/// Tolerance-aware version of [`horizontal_lines`].
pub fn horizontal_lines_with_tolerance(
    page: &dyn PdfPage,
    tolerance: f32,
) -> Result<Vec<LineSegment>, BackendError> {
    let drawings = page.drawings()?;
    Ok(collect_horizontal(&drawings, tolerance))
}

/// Every straight segment in `drawings` that is horizontal within
/// `tolerance`, stably sorted by the `y` of its start point.
///
/// Coincident lines are kept; the zero-height band between them extracts
/// nothing and is skipped downstream.
pub fn collect_horizontal(drawings: &[Drawing], tolerance: f32) -> Vec<LineSegment> {
    let mut lines: Vec<LineSegment> = drawings
        .iter()
        .flat_map(|drawing| drawing.lines())
        .filter(|segment| segment.is_horizontal(tolerance))
        .copied()
        .collect();
    lines.sort_by(|a, b| a.y().total_cmp(&b.y()));
    lines
}
