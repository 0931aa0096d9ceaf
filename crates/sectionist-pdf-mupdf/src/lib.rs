use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use mupdf::{
    ColorParams, Colorspace, Device, Matrix, NativeDevice, PathWalker, StrokeState, TextPage,
    TextPageFlags,
};
use once_cell::unsync::OnceCell;

use sectionist_core::{
    BackendError, Drawing, LineSegment, PathItem, PdfBackend, PdfDocument, PdfPage, Point, Rect,
};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the segmentation pipeline and its tests do
/// not transitively depend on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn open_path(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            mupdf::Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;
        Ok(Box::new(MupdfDocument { inner: document }))
    }

    fn open_bytes(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>, BackendError> {
        let document = mupdf::Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        Ok(Box::new(MupdfDocument { inner: document }))
    }
}

/// An open MuPDF document. Dropping it releases the decoder handle.
pub struct MupdfDocument {
    inner: mupdf::Document,
}

impl Drop for MupdfDocument {
    fn drop(&mut self) {
        tracing::trace!("closing document");
    }
}

impl PdfDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        let count = self
            .inner
            .page_count()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn page(&self, index: usize) -> Result<Box<dyn PdfPage + '_>, BackendError> {
        if index >= self.page_count()? {
            return Err(BackendError::page(index, "page index out of range"));
        }
        let number = i32::try_from(index)
            .map_err(|_| BackendError::page(index, "page index out of range"))?;
        let page = self
            .inner
            .load_page(number)
            .map_err(|e| BackendError::page(index, e.to_string()))?;

        Ok(Box::new(MupdfPage {
            inner: page,
            index,
            text_page: OnceCell::new(),
        }))
    }
}

struct MupdfPage {
    inner: mupdf::Page,
    index: usize,
    // Built on first extraction and reused for every band of the page.
    text_page: OnceCell<TextPage>,
}

impl MupdfPage {
    fn err(&self, e: mupdf::Error) -> BackendError {
        BackendError::page(self.index, e.to_string())
    }

    fn text_page(&self) -> Result<&TextPage, BackendError> {
        self.text_page
            .get_or_try_init(|| self.inner.to_text_page(TextPageFlags::empty()))
            .map_err(|e| self.err(e))
    }
}

impl PdfPage for MupdfPage {
    fn bounds(&self) -> Result<Rect, BackendError> {
        let b = self.inner.bounds().map_err(|e| self.err(e))?;
        Ok(Rect::new(b.x0, b.y0, b.x1, b.y1))
    }

    fn drawings(&self) -> Result<Vec<Drawing>, BackendError> {
        let sink = Rc::new(RefCell::new(DrawingSink::default()));
        let device = Device::from_native(DrawingCollector {
            sink: Rc::clone(&sink),
        })
        .map_err(|e| self.err(e))?;

        self.inner
            .run(&device, &Matrix::IDENTITY)
            .map_err(|e| self.err(e))?;
        drop(device);

        let drawings = sink.take().into_result(self.index)?;
        tracing::trace!(page = self.index, drawings = drawings.len(), "collected drawings");
        Ok(drawings)
    }

    fn extract_text(&self, clip: Rect) -> Result<String, BackendError> {
        let text_page = self.text_page()?;

        // A glyph belongs to the clip when the centre of its quad does.
        let mut text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .filter(|c| clip.contains(quad_centre(&c.quad())))
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                if !line_text.is_empty() {
                    text.push_str(&line_text);
                    text.push('\n');
                }
            }
        }
        Ok(text)
    }
}

fn quad_centre(q: &mupdf::Quad) -> Point {
    Point::new(
        (q.ul.x + q.ur.x + q.ll.x + q.lr.x) / 4.0,
        (q.ul.y + q.ur.y + q.ll.y + q.lr.y) / 4.0,
    )
}

/// Drawings gathered while a page runs, plus the first path that could not
/// be walked.
#[derive(Debug, Default)]
struct DrawingSink {
    drawings: Vec<Drawing>,
    failure: Option<String>,
}

impl DrawingSink {
    fn push(&mut self, items: Vec<PathItem>) {
        if !items.is_empty() {
            self.drawings.push(Drawing::new(items));
        }
    }

    fn fail(&mut self, message: String) {
        if self.failure.is_none() {
            self.failure = Some(message);
        }
    }

    /// A page with an unreadable path has an incomplete set of rules, so it
    /// is reported instead of segmented.
    fn into_result(self, page: usize) -> Result<Vec<Drawing>, BackendError> {
        match self.failure {
            Some(message) => Err(BackendError::page(
                page,
                format!("failed to walk drawing path: {message}"),
            )),
            None => Ok(self.drawings),
        }
    }
}

/// Device that records every stroked or filled path as a [`Drawing`].
struct DrawingCollector {
    sink: Rc<RefCell<DrawingSink>>,
}

impl DrawingCollector {
    fn record(&mut self, path: &mupdf::Path, ctm: Matrix) {
        let mut walker = PathCollector::new(ctm);
        let mut sink = self.sink.borrow_mut();
        match path.walk(&mut walker) {
            Ok(()) => sink.push(walker.items),
            Err(e) => sink.fail(e.to_string()),
        }
    }
}

impl NativeDevice for DrawingCollector {
    fn fill_path(
        &mut self,
        path: &mupdf::Path,
        _even_odd: bool,
        ctm: Matrix,
        _color_space: &Colorspace,
        _color: &[f32],
        _alpha: f32,
        _cp: ColorParams,
    ) {
        self.record(path, ctm);
    }

    fn stroke_path(
        &mut self,
        path: &mupdf::Path,
        _stroke_state: &StrokeState,
        ctm: Matrix,
        _color_space: &Colorspace,
        _color: &[f32],
        _alpha: f32,
        _cp: ColorParams,
    ) {
        self.record(path, ctm);
    }
}

/// Flattens a path into page-space items. Straight `line_to` segments and
/// explicit closes become [`PathItem::Line`]; Béziers are kept only as
/// their endpoints. Rectangles, whether drawn with `re` or as an
/// axis-aligned move plus three lines, become [`PathItem::Rect`] and never
/// contribute edges as lines.
struct PathCollector {
    ctm: Matrix,
    current: Point,
    subpath_start: Point,
    // Vertices of the current subpath while it is made of straight lines only.
    corners: Option<Vec<Point>>,
    // The current subpath was folded into a rectangle; its close adds nothing.
    folded: bool,
    items: Vec<PathItem>,
}

impl PathCollector {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            current: Point::default(),
            subpath_start: Point::default(),
            corners: None,
            folded: false,
            items: Vec::new(),
        }
    }

    fn transform(&self, x: f32, y: f32) -> Point {
        let m = &self.ctm;
        Point::new(x * m.a + y * m.c + m.e, x * m.b + y * m.d + m.f)
    }

    /// Replace the last three lines with a rectangle when the subpath's four
    /// vertices form an axis-aligned quad.
    fn fold_quad(&mut self) {
        let Some(corners) = &self.corners else {
            return;
        };
        if corners.len() != 4 {
            return;
        }
        let [a, b, c, d] = [corners[0], corners[1], corners[2], corners[3]];
        let horizontal_first = a.y == b.y && b.x == c.x && c.y == d.y && d.x == a.x;
        let vertical_first = a.x == b.x && b.y == c.y && c.x == d.x && d.y == a.y;
        if !(horizontal_first || vertical_first) {
            return;
        }

        let rect = bounding_rect(&[a, b, c, d]);
        self.items.truncate(self.items.len() - 3);
        self.items.push(PathItem::Rect(rect));
        self.corners = None;
        self.folded = true;
    }
}

fn bounding_rect(points: &[Point]) -> Rect {
    let mut rect = Rect::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    for p in points {
        rect.x0 = rect.x0.min(p.x);
        rect.y0 = rect.y0.min(p.y);
        rect.x1 = rect.x1.max(p.x);
        rect.y1 = rect.y1.max(p.y);
    }
    rect
}

impl PathWalker for PathCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = self.transform(x, y);
        self.subpath_start = self.current;
        self.corners = Some(vec![self.current]);
        self.folded = false;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let end = self.transform(x, y);
        self.items
            .push(PathItem::Line(LineSegment::new(self.current, end)));
        self.current = end;
        if let Some(corners) = &mut self.corners {
            corners.push(end);
            self.fold_quad();
        }
    }

    fn curve_to(&mut self, _cx1: f32, _cy1: f32, _cx2: f32, _cy2: f32, ex: f32, ey: f32) {
        let end = self.transform(ex, ey);
        self.items.push(PathItem::Curve {
            start: self.current,
            end,
        });
        self.current = end;
        self.corners = None;
    }

    fn close(&mut self) {
        if !self.folded && self.current != self.subpath_start {
            self.items.push(PathItem::Line(LineSegment::new(
                self.current,
                self.subpath_start,
            )));
        }
        self.current = self.subpath_start;
        self.corners = None;
    }

    fn rect(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let corners = [
            self.transform(x1, y1),
            self.transform(x2, y1),
            self.transform(x2, y2),
            self.transform(x1, y2),
        ];
        self.items.push(PathItem::Rect(bounding_rect(&corners)));
        self.current = corners[0];
        self.subpath_start = corners[0];
        self.corners = None;
        self.folded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_collector_lines_and_close() {
        let mut walker = PathCollector::new(Matrix::IDENTITY);
        walker.move_to(0.0, 100.0);
        walker.line_to(500.0, 100.0);
        walker.line_to(500.0, 120.0);
        walker.close();

        assert_eq!(
            walker.items,
            vec![
                PathItem::Line(LineSegment::from_coords(0.0, 100.0, 500.0, 100.0)),
                PathItem::Line(LineSegment::from_coords(500.0, 100.0, 500.0, 120.0)),
                PathItem::Line(LineSegment::from_coords(500.0, 120.0, 0.0, 100.0)),
            ]
        );
    }

    #[test]
    fn test_path_collector_applies_ctm() {
        let translate = Matrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 20.0);
        let mut walker = PathCollector::new(translate);
        walker.move_to(0.0, 0.0);
        walker.line_to(100.0, 0.0);

        assert_eq!(
            walker.items,
            vec![PathItem::Line(LineSegment::from_coords(10.0, 20.0, 110.0, 20.0))]
        );
    }

    #[test]
    fn test_path_collector_curve_keeps_endpoints() {
        let mut walker = PathCollector::new(Matrix::IDENTITY);
        walker.move_to(0.0, 0.0);
        walker.curve_to(1.0, 5.0, 2.0, 5.0, 3.0, 0.0);
        walker.close();

        assert_eq!(walker.items.len(), 2);
        assert!(matches!(walker.items[0], PathItem::Curve { .. }));
    }

    #[test]
    fn test_rect_operator_yields_no_lines() {
        let mut walker = PathCollector::new(Matrix::IDENTITY);
        walker.rect(72.0, 300.0, 540.0, 340.0);
        walker.close();

        assert_eq!(
            walker.items,
            vec![PathItem::Rect(Rect::new(72.0, 300.0, 540.0, 340.0))]
        );
        assert!(!walker.items.iter().any(|i| matches!(i, PathItem::Line(_))));
    }

    #[test]
    fn test_rect_operator_applies_ctm() {
        let translate = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 50.0);
        let mut walker = PathCollector::new(translate);
        walker.rect(540.0, 340.0, 72.0, 300.0);

        assert_eq!(
            walker.items,
            vec![PathItem::Rect(Rect::new(72.0, 350.0, 540.0, 390.0))]
        );
    }

    #[test]
    fn test_axis_aligned_quad_folds_into_rect() {
        let mut walker = PathCollector::new(Matrix::IDENTITY);
        walker.move_to(72.0, 300.0);
        walker.line_to(540.0, 300.0);
        walker.line_to(540.0, 340.0);
        walker.line_to(72.0, 340.0);
        walker.close();

        assert_eq!(
            walker.items,
            vec![PathItem::Rect(Rect::new(72.0, 300.0, 540.0, 340.0))]
        );
    }

    #[test]
    fn test_skewed_quad_stays_lines() {
        let mut walker = PathCollector::new(Matrix::IDENTITY);
        walker.move_to(72.0, 300.0);
        walker.line_to(540.0, 300.0);
        walker.line_to(500.0, 340.0);
        walker.line_to(72.0, 340.0);
        walker.close();

        assert_eq!(walker.items.len(), 4);
        assert!(walker.items.iter().all(|i| matches!(i, PathItem::Line(_))));
    }

    #[test]
    fn test_rule_after_rect_in_same_path_is_kept() {
        let mut walker = PathCollector::new(Matrix::IDENTITY);
        walker.rect(72.0, 100.0, 540.0, 120.0);
        walker.move_to(0.0, 400.0);
        walker.line_to(612.0, 400.0);

        assert_eq!(
            walker.items,
            vec![
                PathItem::Rect(Rect::new(72.0, 100.0, 540.0, 120.0)),
                PathItem::Line(LineSegment::from_coords(0.0, 400.0, 612.0, 400.0)),
            ]
        );
    }

    #[test]
    fn test_walk_failure_fails_the_page() {
        let mut sink = DrawingSink::default();
        sink.push(vec![PathItem::Line(LineSegment::from_coords(
            0.0, 100.0, 612.0, 100.0,
        ))]);
        sink.fail("bad path".to_string());
        sink.fail("later".to_string());

        match sink.into_result(3) {
            Err(BackendError::PageAccess { page, message }) => {
                assert_eq!(page, 3);
                assert!(message.contains("bad path"), "{message}");
            }
            other => panic!("expected page error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_paths_are_not_recorded() {
        let mut sink = DrawingSink::default();
        sink.push(Vec::new());
        assert!(sink.into_result(0).unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_file_is_open_error() {
        let result = MupdfBackend::new().open_path(Path::new("/nonexistent/record.pdf"));
        assert!(matches!(result, Err(BackendError::OpenError(_))));
    }
}
