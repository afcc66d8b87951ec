use std::path::Path;
use std::time::Instant;

use crate::error::ExtractionError;
use crate::models::DocumentKind;

pub type ExtractionResult = Result<String, ExtractionError>;

/// Pull plain text out of the file at `path`.
///
/// Never panics and never returns an error that is not an [`ExtractionError`];
/// I/O failures, malformed PDFs and parser panics all become
/// [`ExtractionError::Read`].
pub fn extract(path: &Path, kind: DocumentKind) -> ExtractionResult {
    let start = Instant::now();

    tracing::debug!(path = %path.display(), kind = ?kind, "Starting text extraction");

    let result = match kind {
        DocumentKind::Txt => extract_txt(path),
        DocumentKind::Pdf => extract_pdf(path),
        DocumentKind::Unsupported => Err(ExtractionError::Unsupported),
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(text) => tracing::info!(
            kind = ?kind,
            characters = text.chars().count(),
            processing_time_ms = elapsed_ms,
            "Text extraction completed"
        ),
        Err(e) => tracing::warn!(
            kind = ?kind,
            error = %e,
            processing_time_ms = elapsed_ms,
            "Text extraction failed"
        ),
    }

    result
}

fn extract_txt(path: &Path) -> ExtractionResult {
    let bytes = std::fs::read(path)?;
    Ok(decode_utf8_dropping_invalid(&bytes))
}

/// Decode UTF-8, silently skipping any byte sequence that is not valid rather
/// than substituting U+FFFD.
pub fn decode_utf8_dropping_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Join per-page text with single spaces, in page order, skipping pages that
/// produced nothing, then trim the result.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for page in pages {
        let page = page.as_ref();
        if page.trim().is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(page);
    }
    joined.trim().to_string()
}

#[cfg(feature = "pdf")]
fn extract_pdf(path: &Path) -> ExtractionResult {
    let bytes = std::fs::read(path)?;

    // pdf-extract panics on some malformed inputs instead of returning an error.
    let parsed = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .map_err(|payload| {
            let cause = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "PDF parser panicked".to_string());
            ExtractionError::Read(cause)
        })?;

    let pages = parsed.map_err(|e| ExtractionError::Read(e.to_string()))?;
    tracing::debug!(pages = pages.len(), "PDF pages parsed");

    Ok(join_pages(pages))
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(_path: &Path) -> ExtractionResult {
    tracing::warn!("PDF uploaded but the crate was built without the `pdf` feature");
    Err(ExtractionError::PdfUnavailable)
}

/// Whether this build can read PDFs.
pub fn pdf_supported() -> bool {
    cfg!(feature = "pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_pages_skips_blank_pages_without_doubling_separators() {
        let joined = join_pages(["alpha", "", "beta", "   ", "gamma"]);
        assert_eq!(joined, "alpha beta gamma");
    }

    #[test]
    fn join_pages_trims_only_the_ends() {
        let joined = join_pages(["\n first page\n", "second\n\n"]);
        assert_eq!(joined, "first page\n second");
    }

    #[test]
    fn join_pages_of_nothing_is_empty() {
        assert_eq!(join_pages(Vec::<String>::new()), "");
    }

    #[test]
    fn decode_drops_invalid_sequences() {
        let bytes = b"hel\xfflo \xc3\x28docs";
        assert_eq!(decode_utf8_dropping_invalid(bytes), "hello (docs");
    }

    #[test]
    fn decode_keeps_multibyte_characters() {
        assert_eq!(decode_utf8_dropping_invalid("naïve ✓".as_bytes()), "naïve ✓");
    }
}
