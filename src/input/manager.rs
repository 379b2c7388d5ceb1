//! Document extraction: size gate, format routing, normalization

use crate::config::LimitsConfig;
use crate::error::{Result, ResumeAnalyzerError};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor::{extractor_for, RawText};
use crate::processing::document::ResumeDocument;
use crate::processing::text_processor::TextProcessor;
use log::{debug, info};

pub struct DocumentExtractor {
    max_file_bytes: usize,
    min_text_chars: usize,
    processor: TextProcessor,
}

impl DocumentExtractor {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_file_bytes: limits.max_file_bytes,
            min_text_chars: limits.min_text_chars,
            processor: TextProcessor::new(),
        }
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
    }

    /// Reject oversized input. Runs before any byte is parsed.
    pub fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_file_bytes {
            return Err(ResumeAnalyzerError::FileTooLarge {
                size,
                limit: self.max_file_bytes,
            });
        }
        Ok(())
    }

    pub fn resolve_format(mime_type: &str) -> Result<DocumentFormat> {
        DocumentFormat::from_mime(mime_type).ok_or_else(|| ResumeAnalyzerError::UnsupportedFormat {
            mime_type: mime_type.to_string(),
        })
    }

    /// Extract and normalize a resume from raw bytes and its declared MIME type.
    pub fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<ResumeDocument> {
        self.check_size(bytes.len())?;
        let format = Self::resolve_format(mime_type)?;
        self.extract_as(bytes, format)
    }

    pub fn extract_as(&self, bytes: &[u8], format: DocumentFormat) -> Result<ResumeDocument> {
        self.check_size(bytes.len())?;

        // Nothing to parse: report it as empty rather than malformed.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ResumeAnalyzerError::EmptyContent {
                extracted_chars: 0,
                minimum: self.min_text_chars,
            });
        }

        info!("Extracting text from {} document ({} bytes)", format, bytes.len());
        let raw = extractor_for(format).extract(bytes)?;
        self.build(bytes.to_vec(), format, raw)
    }

    /// Wrap text that is already decoded, as if it had been extracted from `format`.
    pub fn from_plain_text(&self, text: &str, format: DocumentFormat) -> Result<ResumeDocument> {
        self.build(text.as_bytes().to_vec(), format, RawText::plain(text))
    }

    fn build(&self, raw_bytes: Vec<u8>, format: DocumentFormat, raw: RawText) -> Result<ResumeDocument> {
        let text = self.processor.normalize(&raw.text);
        let extracted_chars = text.chars().count();
        debug!(
            "Normalized {} raw characters to {}",
            raw.text.chars().count(),
            extracted_chars
        );

        if extracted_chars < self.min_text_chars {
            return Err(ResumeAnalyzerError::EmptyContent {
                extracted_chars,
                minimum: self.min_text_chars,
            });
        }

        Ok(ResumeDocument::new(raw_bytes, format, text, raw.table_count))
    }
}
