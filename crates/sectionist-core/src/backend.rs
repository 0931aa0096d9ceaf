use std::path::Path;

use thiserror::Error;

use crate::geometry::{Drawing, Rect};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to access page {page}: {message}")]
    PageAccess { page: usize, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    pub fn page(page: usize, message: impl Into<String>) -> Self {
        Self::PageAccess {
            page,
            message: message.into(),
        }
    }
}

/// Trait for document decoding backends.
///
/// Implementors turn raw bytes or a file into a [`PdfDocument`]; the section
/// pipeline (line scanning, band extraction, normalization) lives in
/// `sectionist_parsing::SectionExtractor`.
pub trait PdfBackend: Send + Sync {
    /// Open and decode the document at `path`.
    fn open_path(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError>;

    /// Decode a document held in memory.
    fn open_bytes(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>, BackendError>;
}

/// An opened document: an ordered sequence of pages.
///
/// The underlying decoder handle is released when the value is dropped, so
/// whoever owns the document controls when it closes.
pub trait PdfDocument {
    fn page_count(&self) -> Result<usize, BackendError>;

    /// Load page `index` (0-based). Out-of-range indices are a
    /// [`BackendError::PageAccess`].
    fn page(&self, index: usize) -> Result<Box<dyn PdfPage + '_>, BackendError>;
}

/// A loaded page.
pub trait PdfPage {
    /// The page rectangle in page space.
    fn bounds(&self) -> Result<Rect, BackendError>;

    /// Every vector drawing on the page, in content-stream order.
    fn drawings(&self) -> Result<Vec<Drawing>, BackendError>;

    /// Raw text whose glyphs fall inside `clip`, one `\n`-terminated line per
    /// text line. Returns an empty string when nothing is inside.
    fn extract_text(&self, clip: Rect) -> Result<String, BackendError>;
}

impl<D: PdfDocument + ?Sized> PdfDocument for Box<D> {
    fn page_count(&self) -> Result<usize, BackendError> {
        (**self).page_count()
    }

    fn page(&self, index: usize) -> Result<Box<dyn PdfPage + '_>, BackendError> {
        (**self).page(index)
    }
}
