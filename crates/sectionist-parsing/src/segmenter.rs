//! Section segmentation by horizontal rule lines.
//!
//! Each page is cut into full-width bands at its horizontal rules. A band
//! that extracts any text closes the section currently open: the carry
//! buffer is prefixed, the result is cleaned, and it is stored under its
//! first non-blank line. Text below a page's last rule (or the whole page
//! when it has none) is appended to the carry buffer and continues onto the
//! next page.
//!
//! The walk is a fold over pages in order with the carry buffer and result
//! map as accumulator, so pages of one document are never processed
//! concurrently.

use sectionist_core::{BackendError, PdfDocument, PdfPage, SectionMap};

use crate::ParsingError;
use crate::config::ParsingConfig;
use crate::geometry::horizontal_lines_with_tolerance;
use crate::normalize::clean_with_config;

/// Accumulator threaded through the page fold.
#[derive(Debug, Default)]
struct SegmentState {
    /// Text of a section still open at the end of the previous band.
    carry: String,
    sections: SectionMap,
}

impl SegmentState {
    /// Close the open section with `band` as its final piece.
    fn close_section(&mut self, band: &str, config: &ParsingConfig) {
        let mut raw = std::mem::take(&mut self.carry);
        raw.push_str(band);
        let cleaned = clean_with_config(&raw, config);

        match derive_title(&cleaned) {
            Some(title) => {
                let title = title.to_string();
                tracing::trace!(title = %title, len = cleaned.len(), "closed section");
                if self.sections.insert(title.clone(), cleaned).is_some() {
                    tracing::debug!(title = %title, "section title repeated, keeping later content");
                }
            }
            None => tracing::debug!(len = raw.len(), "band has no non-blank line, skipped"),
        }
    }
}

/// Segment `document` with the default configuration.
pub fn segment<D: PdfDocument>(document: D) -> Result<SectionMap, ParsingError> {
    segment_with_config(document, &ParsingConfig::default())
}

/// Config-aware version of [`segment`].
///
/// Takes ownership of the document; it is dropped (and its decoder handle
/// released) when this returns, whether segmentation succeeded or a page
/// failed.
pub fn segment_with_config<D: PdfDocument>(
    document: D,
    config: &ParsingConfig,
) -> Result<SectionMap, ParsingError> {
    let page_count = document.page_count()?;
    let state = (0..page_count).try_fold(SegmentState::default(), |state, index| {
        let page = document.page(index)?;
        segment_page(&*page, index, state, config)
    })?;

    Ok(finish(state, config))
}

fn segment_page(
    page: &dyn PdfPage,
    index: usize,
    mut state: SegmentState,
    config: &ParsingConfig,
) -> Result<SegmentState, BackendError> {
    let bounds = page.bounds()?;
    let lines = horizontal_lines_with_tolerance(page, config.horizontal_tolerance)?;

    let mut previous_y = bounds.y0;
    let mut closed = 0usize;
    for line in &lines {
        let y = line.y();
        let text = page.extract_text(bounds.band(previous_y, y))?;
        if !text.is_empty() {
            state.close_section(&text, config);
            closed += 1;
        }
        previous_y = y;
    }

    let tail = page.extract_text(bounds.band(previous_y, bounds.y1))?;
    state.carry.push_str(&tail);

    tracing::debug!(
        page = index,
        lines = lines.len(),
        closed,
        carry = state.carry.len(),
        "segmented page"
    );
    Ok(state)
}

fn finish(mut state: SegmentState, config: &ParsingConfig) -> SectionMap {
    if !state.carry.is_empty() {
        if config.flush_trailing_section {
            state.close_section("", config);
        } else {
            tracing::debug!(
                len = state.carry.len(),
                "dropping unterminated trailing section"
            );
        }
    }
    state.sections
}

/// First line of `cleaned` that is not all whitespace, verbatim.
///
/// Lines break on every Unicode line boundary, not only `\n`, so a form
/// feed left by a page break ends the title.
pub(crate) fn derive_title(cleaned: &str) -> Option<&str> {
    cleaned
        .split(is_line_break)
        .find(|line| !line.trim().is_empty())
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}
