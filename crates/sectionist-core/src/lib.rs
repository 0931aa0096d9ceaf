pub mod backend;
pub mod config_file;
pub mod geometry;
pub mod memory;
pub mod section;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend, PdfDocument, PdfPage};
pub use geometry::{DEFAULT_HORIZONTAL_TOLERANCE, Drawing, LineSegment, PathItem, Point, Rect};
pub use memory::{MemoryBackend, MemoryDocument, MemoryPage, TextRun};
pub use section::{Section, SectionMap};
