use std::path::Path;

use thiserror::Error;

pub mod assemble;
pub mod config;
pub mod extract;
pub mod extractor;
pub mod geometry;
pub mod normalize;
pub mod segmenter;

pub use assemble::{assemble, assemble_entries};
pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::SectionExtractor;
pub use geometry::{horizontal_lines, horizontal_lines_with_tolerance};
pub use normalize::{clean, clean_with_config, truncate_at};
pub use segmenter::{segment, segment_with_config};
// Re-export domain types from core (canonical definitions live there)
pub use sectionist_core::{BackendError, PdfBackend, PdfDocument, PdfPage, Section, SectionMap};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Extract the rule-delimited sections of the document at `path`, decoded
/// by `backend`.
///
/// Pipeline:
/// 1. Open the document via `backend`
/// 2. Find each page's horizontal rules
/// 3. Cut pages into bands between rules, carrying open text across pages
/// 4. Clean each closed band and key it by its first non-blank line
pub fn extract_sections(
    path: &Path,
    backend: &dyn PdfBackend,
) -> Result<SectionMap, ParsingError> {
    SectionExtractor::new().segment_path(path, backend)
}
