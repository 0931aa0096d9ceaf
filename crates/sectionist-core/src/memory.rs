//! In-memory document backend.
//!
//! Pages are described directly as text runs and drawings, which makes the
//! backend useful for tests and for JSON layout fixtures. A shared close
//! counter and per-page failure flag let callers observe how a consumer
//! handles the document's lifetime and page errors.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, PdfBackend, PdfDocument, PdfPage};
use crate::geometry::{Drawing, LineSegment, Point, Rect};

/// US Letter in points.
pub const LETTER: Rect = Rect::new(0.0, 0.0, 612.0, 792.0);

/// One line of text anchored at `origin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub origin: Point,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    pub bounds: Rect,
    #[serde(default)]
    pub drawings: Vec<Drawing>,
    #[serde(default)]
    pub runs: Vec<TextRun>,
    /// When set, every access to this page fails.
    #[serde(default)]
    pub fail: bool,
}

impl MemoryPage {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            drawings: Vec::new(),
            runs: Vec::new(),
            fail: false,
        }
    }

    pub fn letter() -> Self {
        Self::new(LETTER)
    }

    /// Add a full-width horizontal rule at `y`.
    pub fn with_rule(mut self, y: f32) -> Self {
        let rule = LineSegment::from_coords(self.bounds.x0, y, self.bounds.x1, y);
        self.drawings.push(Drawing::from_lines([rule]));
        self
    }

    pub fn with_drawing(mut self, drawing: Drawing) -> Self {
        self.drawings.push(drawing);
        self
    }

    /// Add a line of text whose baseline origin sits at `(x0 + 72, y)`.
    pub fn with_text(mut self, y: f32, text: impl Into<String>) -> Self {
        self.runs.push(TextRun {
            origin: Point::new(self.bounds.x0 + 72.0, y),
            text: text.into(),
        });
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub pages: Vec<MemoryPage>,
    #[serde(skip)]
    close_counter: Option<Arc<AtomicUsize>>,
}

impl MemoryDocument {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self {
            pages,
            close_counter: None,
        }
    }

    /// Count drops of this document into `counter`.
    pub fn with_close_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.close_counter = Some(counter);
        self
    }
}

impl Drop for MemoryDocument {
    fn drop(&mut self) {
        if let Some(counter) = &self.close_counter {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl PdfDocument for MemoryDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        Ok(self.pages.len())
    }

    fn page(&self, index: usize) -> Result<Box<dyn PdfPage + '_>, BackendError> {
        let page = self
            .pages
            .get(index)
            .ok_or_else(|| BackendError::page(index, "page index out of range"))?;
        Ok(Box::new(MemoryPageRef { page, index }))
    }
}

struct MemoryPageRef<'a> {
    page: &'a MemoryPage,
    index: usize,
}

impl MemoryPageRef<'_> {
    fn check(&self) -> Result<(), BackendError> {
        if self.page.fail {
            return Err(BackendError::page(self.index, "simulated extraction failure"));
        }
        Ok(())
    }
}

impl PdfPage for MemoryPageRef<'_> {
    fn bounds(&self) -> Result<Rect, BackendError> {
        self.check()?;
        Ok(self.page.bounds)
    }

    fn drawings(&self) -> Result<Vec<Drawing>, BackendError> {
        self.check()?;
        Ok(self.page.drawings.clone())
    }

    fn extract_text(&self, clip: Rect) -> Result<String, BackendError> {
        self.check()?;
        let mut text = String::new();
        for run in self.page.runs.iter().filter(|r| clip.contains(r.origin)) {
            text.push_str(&run.text);
            text.push('\n');
        }
        Ok(text)
    }
}

/// Opens JSON layout fixtures (a serialized [`MemoryDocument`]).
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackend;

impl PdfBackend for MemoryBackend {
    fn open_path(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        let bytes = std::fs::read(path)?;
        self.open_bytes(&bytes)
    }

    fn open_bytes(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>, BackendError> {
        let document: MemoryDocument =
            serde_json::from_slice(bytes).map_err(|e| BackendError::OpenError(e.to_string()))?;
        Ok(Box::new(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_respects_clip() {
        let doc = MemoryDocument::new(vec![
            MemoryPage::letter()
                .with_text(50.0, "Header")
                .with_text(150.0, "Body"),
        ]);
        let page = doc.page(0).unwrap();
        assert_eq!(page.extract_text(LETTER.band(0.0, 100.0)).unwrap(), "Header\n");
        assert_eq!(page.extract_text(LETTER.band(100.0, 792.0)).unwrap(), "Body\n");
        assert_eq!(page.extract_text(LETTER.band(300.0, 400.0)).unwrap(), "");
    }

    #[test]
    fn test_out_of_range_page_is_page_access_error() {
        let doc = MemoryDocument::new(vec![MemoryPage::letter()]);
        match doc.page(3) {
            Err(BackendError::PageAccess { page, .. }) => assert_eq!(page, 3),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_failing_page_errors_on_access() {
        let doc = MemoryDocument::new(vec![MemoryPage::letter().failing()]);
        let page = doc.page(0).unwrap();
        assert!(page.bounds().is_err());
        assert!(page.extract_text(LETTER).is_err());
    }

    #[test]
    fn test_close_counter_counts_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let doc = MemoryDocument::new(vec![]).with_close_counter(counter.clone());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        drop(doc);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backend_opens_json_fixture() {
        let fixture = r#"{
            "pages": [{
                "bounds": {"x0": 0, "y0": 0, "x1": 612, "y1": 792},
                "drawings": [{"items": [{"kind": "line",
                    "start": {"x": 0, "y": 200}, "end": {"x": 612, "y": 200}}]}],
                "runs": [{"origin": {"x": 72, "y": 100}, "text": "Intake"}]
            }]
        }"#;
        let doc = MemoryBackend.open_bytes(fixture.as_bytes()).unwrap();
        assert_eq!(doc.page_count().unwrap(), 1);
        let page = doc.page(0).unwrap();
        assert_eq!(page.drawings().unwrap()[0].lines().count(), 1);
        assert_eq!(page.extract_text(LETTER).unwrap(), "Intake\n");
    }

    #[test]
    fn test_backend_rejects_garbage() {
        match MemoryBackend.open_bytes(b"%PDF-1.7 not json") {
            Err(BackendError::OpenError(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an open error"),
        }
    }
}
