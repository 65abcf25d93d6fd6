//! Page text extraction for reference PDFs

use std::path::Path;

use lopdf::Document;

use crate::chunk::PageText;
use crate::error::IndexError;

/// Read the text of every page of a PDF on disk
///
/// Pages whose text cannot be decoded are returned empty rather than
/// failing the whole source; an unreadable or unparsable file is
/// `SourceUnavailable`.
pub fn read_pdf_pages(source_id: &str, path: &Path) -> Result<Vec<PageText>, IndexError> {
    let doc = Document::load(path).map_err(|e| IndexError::unavailable(source_id, e))?;
    Ok(page_texts(source_id, &doc))
}

/// Read the text of every page of an in-memory PDF
pub fn read_pdf_pages_mem(source_id: &str, bytes: &[u8]) -> Result<Vec<PageText>, IndexError> {
    let doc = Document::load_mem(bytes).map_err(|e| IndexError::unavailable(source_id, e))?;
    Ok(page_texts(source_id, &doc))
}

fn page_texts(source_id: &str, doc: &Document) -> Vec<PageText> {
    doc.get_pages()
        .keys()
        .map(|&page_number| {
            let raw_text = doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                tracing::warn!(source_id, page_number, error = %e, "page text not decodable");
                String::new()
            });
            PageText::new(page_number, raw_text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let result = read_pdf_pages("guide", Path::new("/nonexistent/guide.pdf"));
        assert!(matches!(
            result,
            Err(IndexError::SourceUnavailable { ref source_id, .. }) if source_id == "guide"
        ));
    }

    #[test]
    fn test_garbage_bytes_are_source_unavailable() {
        let result = read_pdf_pages_mem("guide", b"not a pdf at all");
        assert!(matches!(result, Err(IndexError::SourceUnavailable { .. })));
    }
}
