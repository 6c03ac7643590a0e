//! Text extraction seam for uploaded documents.
//!
//! Document parsing is an external collaborator: the pipeline hands raw
//! bytes plus a format tag to a `TextExtractor` and only ever sees plain
//! text or a failure. `PlainTextExtractor` covers UTF-8 text; PDF and DOCX
//! need an external backend wired in at deployment time.

use novelty_core::error::NoveltyError;

/// Supported upload formats. Anything else is rejected before the
/// scoring pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Parse a caller-supplied format tag (file extension or query value).
    pub fn from_tag(tag: &str) -> Result<Self, NoveltyError> {
        match tag.trim().to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" | "text" => Ok(DocumentFormat::Txt),
            other => Err(NoveltyError::Extraction(format!(
                "Unsupported format '{}'. Supported formats: pdf, docx, txt",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
        }
    }
}

/// Service that turns raw document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from the given bytes.
    ///
    /// Fails with `NoveltyError::Extraction` when the document cannot be
    /// parsed or yields no text.
    fn extract(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, NoveltyError>;
}

/// Extractor for plain-text uploads.
///
/// PDF and DOCX require an external extraction backend; this implementation
/// reports them as unavailable rather than guessing at their contents.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, NoveltyError> {
        match format {
            DocumentFormat::Txt => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    NoveltyError::Extraction(format!("Document is not valid UTF-8: {}", e))
                })?;
                let text = text.trim();
                if text.is_empty() {
                    return Err(NoveltyError::Extraction(
                        "Extracted text is empty".to_string(),
                    ));
                }
                Ok(text.to_string())
            }
            DocumentFormat::Pdf | DocumentFormat::Docx => Err(NoveltyError::Extraction(format!(
                "No extraction backend configured for {} documents",
                format.as_str()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tags() {
        assert_eq!(DocumentFormat::from_tag("pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_tag("DOCX").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_tag(" txt ").unwrap(), DocumentFormat::Txt);
        assert_eq!(DocumentFormat::from_tag("text").unwrap(), DocumentFormat::Txt);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = DocumentFormat::from_tag("odt").unwrap_err();
        assert!(matches!(err, NoveltyError::Extraction(_)));
        assert!(err.to_string().contains("odt"));
    }

    #[test]
    fn test_plain_text_extraction() {
        let extractor = PlainTextExtractor::new();
        let text = extractor
            .extract(b"  A proposal about solar coatings.\n", DocumentFormat::Txt)
            .unwrap();
        assert_eq!(text, "A proposal about solar coatings.");
    }

    #[test]
    fn test_empty_document_rejected() {
        let extractor = PlainTextExtractor::new();
        let err = extractor.extract(b"   \n\t ", DocumentFormat::Txt).unwrap_err();
        assert!(matches!(err, NoveltyError::Extraction(_)));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let extractor = PlainTextExtractor::new();
        let err = extractor
            .extract(&[0xff, 0xfe, 0x00], DocumentFormat::Txt)
            .unwrap_err();
        assert!(matches!(err, NoveltyError::Extraction(_)));
    }

    #[test]
    fn test_pdf_without_backend_rejected() {
        let extractor = PlainTextExtractor::new();
        let err = extractor.extract(b"%PDF-1.4", DocumentFormat::Pdf).unwrap_err();
        assert!(err.to_string().contains("pdf"));
    }
}
