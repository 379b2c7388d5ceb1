//! File type detection

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PDF_MIME: &str = "application/pdf";
pub const LEGACY_WORD_MIME: &str = "application/msword";
pub const OPEN_XML_WORD_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Resume formats the extractor can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    LegacyWord,
    OpenXmlWord,
}

impl DocumentFormat {
    /// Resolve a declared MIME type. Parameters such as `; charset=binary` are ignored.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PDF_MIME | "application/x-pdf" => Some(DocumentFormat::Pdf),
            LEGACY_WORD_MIME => Some(DocumentFormat::LegacyWord),
            OPEN_XML_WORD_MIME => Some(DocumentFormat::OpenXmlWord),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => PDF_MIME,
            DocumentFormat::LegacyWord => LEGACY_WORD_MIME,
            DocumentFormat::OpenXmlWord => OPEN_XML_WORD_MIME,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::LegacyWord => "doc",
            DocumentFormat::OpenXmlWord => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::LegacyWord => write!(f, "Word (.doc)"),
            DocumentFormat::OpenXmlWord => write!(f, "Word (.docx)"),
        }
    }
}

/// Extension-based detection used by the command line driver.
#[derive(Debug, Clone, PartialEq)]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
    Text,
    Markdown,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "doc" => FileType::Doc,
            "docx" => FileType::Docx,
            "txt" => FileType::Text,
            "md" | "markdown" => FileType::Markdown,
            _ => FileType::Unknown,
        }
    }

    pub fn document_format(&self) -> Option<DocumentFormat> {
        match self {
            FileType::Pdf => Some(DocumentFormat::Pdf),
            FileType::Doc => Some(DocumentFormat::LegacyWord),
            FileType::Docx => Some(DocumentFormat::OpenXmlWord),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_detection() {
        assert_eq!(DocumentFormat::from_mime("application/pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(
            DocumentFormat::from_mime("Application/MSWord; charset=binary"),
            Some(DocumentFormat::LegacyWord)
        );
        assert_eq!(
            DocumentFormat::from_mime(OPEN_XML_WORD_MIME),
            Some(DocumentFormat::OpenXmlWord)
        );
        assert_eq!(DocumentFormat::from_mime("text/plain"), None);
        assert_eq!(DocumentFormat::from_mime(""), None);
    }

    #[test]
    fn test_extension_detection() {
        assert_eq!(FileType::from_extension("DOCX").document_format(), Some(DocumentFormat::OpenXmlWord));
        assert_eq!(FileType::from_extension("md"), FileType::Markdown);
        assert_eq!(FileType::from_extension("txt").document_format(), None);
    }
}
