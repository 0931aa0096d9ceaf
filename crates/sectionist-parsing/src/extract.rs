use sectionist_core::PdfDocument;

use crate::ParsingError;

/// Full text of `document`, page after page, with no cleanup applied.
pub fn extract_text<D: PdfDocument>(document: D) -> Result<String, ParsingError> {
    let page_count = document.page_count()?;
    let mut text = String::new();

    for index in 0..page_count {
        let page = document.page(index)?;
        let bounds = page.bounds()?;
        text.push_str(&page.extract_text(bounds)?);
    }

    tracing::debug!(pages = page_count, len = text.len(), "extracted full text");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectionist_core::{MemoryDocument, MemoryPage};

    #[test]
    fn test_extract_text_concatenates_pages() {
        let doc = MemoryDocument::new(vec![
            MemoryPage::letter()
                .with_text(100.0, "first")
                .with_rule(200.0)
                .with_text(300.0, "second"),
            MemoryPage::letter().with_text(50.0, "third"),
        ]);
        assert_eq!(extract_text(doc).unwrap(), "first\nsecond\nthird\n");
    }

    #[test]
    fn test_extract_text_propagates_page_errors() {
        let doc = MemoryDocument::new(vec![
            MemoryPage::letter().with_text(100.0, "ok"),
            MemoryPage::letter().failing(),
        ]);
        assert!(matches!(extract_text(doc), Err(ParsingError::Backend(_))));
    }
}
