//! Text processing and normalization

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Glyphs recognized as list bullets at the start of a line.
pub const BULLET_GLYPHS: &[char] = &[
    '•', '●', '○', '◦', '▪', '■', '□', '‣', '⁃', '∙', '➢', '➤', '►', '▸', '✓', '✔', '-', '*',
];

pub struct TextProcessor {
    email_regex: Regex,
    phone_regex: Regex,
    number_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .expect("Invalid email regex");

        let phone_regex = Regex::new(r"(?:\+?\d{1,3}[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b")
            .expect("Invalid phone regex");

        let number_regex = Regex::new(r"\d|%").expect("Invalid number regex");

        Self {
            email_regex,
            phone_regex,
            number_regex,
        }
    }

    /// Normalize extracted text.
    ///
    /// Control characters are dropped, typographic punctuation is folded to ASCII,
    /// horizontal whitespace collapses to a single space and every run of blank
    /// lines becomes exactly one blank line, which marks a paragraph boundary.
    pub fn normalize(&self, raw: &str) -> String {
        let unified = raw
            .replace("\r\n", "\n")
            .replace(['\r', '\u{0B}', '\u{2028}'], "\n")
            .replace(['\u{0C}', '\u{2029}'], "\n\n");

        let mut lines: Vec<String> = Vec::new();
        for line in unified.split('\n') {
            let cleaned: String = line
                .chars()
                .filter_map(Self::normalize_char)
                .collect();
            let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

            if collapsed.is_empty() {
                // Keep at most one blank line, and none at the start.
                if matches!(lines.last(), Some(last) if !last.is_empty()) {
                    lines.push(String::new());
                }
            } else {
                lines.push(collapsed);
            }
        }

        while matches!(lines.last(), Some(last) if last.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }

    fn normalize_char(c: char) -> Option<char> {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => Some('\''),
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => Some('-'),
            '\u{2026}' => Some('.'),
            // Symbol-font bullets that Word exports into the private use area
            '\u{F0B7}' | '\u{F0A7}' | '\u{F076}' | '\u{F0D8}' => Some('•'),
            '\t' => Some(' '),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' | '\u{AD}' => None,
            c if c.is_control() => None,
            c => Some(c),
        }
    }

    /// Split text into sentences, one line at a time so list items stay separate.
    pub fn split_sentences(&self, text: &str) -> Vec<String> {
        text.lines()
            .flat_map(|line| line.unicode_sentences())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Lowercased words, punctuation removed.
    pub fn words(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(|w| w.to_lowercase()).collect()
    }

    pub fn word_count(&self, text: &str) -> usize {
        text.unicode_words().count()
    }

    pub fn first_word(&self, text: &str) -> Option<String> {
        text.unicode_words().next().map(|w| w.to_lowercase())
    }

    pub fn contains_email(&self, text: &str) -> bool {
        self.email_regex.is_match(text)
    }

    pub fn contains_phone(&self, text: &str) -> bool {
        self.phone_regex.is_match(text)
    }

    /// True when the text carries a digit or a percent sign.
    pub fn contains_number(&self, text: &str) -> bool {
        self.number_regex.is_match(text)
    }

    /// The bullet glyph a line opens with, if any. `-` and `*` only count when
    /// followed by a space so negative numbers and emphasis are not mistaken for lists.
    pub fn bullet_glyph(&self, line: &str) -> Option<char> {
        let mut chars = line.trim_start().chars();
        let first = chars.next()?;
        if !BULLET_GLYPHS.contains(&first) {
            return None;
        }
        match (first, chars.next()) {
            (_, None) => None,
            ('-' | '*', Some(next)) if !next.is_whitespace() => None,
            _ => Some(first),
        }
    }

    /// Line text with any leading bullet glyph removed.
    pub fn strip_bullet<'a>(&self, line: &'a str) -> &'a str {
        match self.bullet_glyph(line) {
            Some(glyph) => line.trim_start()[glyph.len_utf8()..].trim_start(),
            None => line.trim(),
        }
    }

    /// Characters that are neither text nor ordinary punctuation: icons,
    /// private-use glyphs, box drawing and emoji. Bullets are not counted.
    pub fn is_decorative_symbol(&self, c: char) -> bool {
        !c.is_ascii()
            && !c.is_alphanumeric()
            && !c.is_whitespace()
            && !BULLET_GLYPHS.contains(&c)
            && !matches!(c, '\u{A0}'..='\u{BF}' | '\u{2010}'..='\u{2027}' | '\u{20AC}')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_keeps_paragraphs() {
        let processor = TextProcessor::new();
        let raw = "  John   Doe \t\r\n\r\n\r\n\nSenior\u{00A0}Engineer\u{0007}\n\u{2022}  Built  things\u{2014}fast\n\n";

        let normalized = processor.normalize(raw);

        assert_eq!(normalized, "John Doe\n\nSenior Engineer\n• Built things-fast");
    }

    #[test]
    fn test_normalize_folds_private_use_bullets() {
        let processor = TextProcessor::new();
        let normalized = processor.normalize("\u{F0B7} Led migration");
        assert_eq!(normalized, "• Led migration");
    }

    #[test]
    fn test_form_feed_becomes_paragraph_break() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize("page one\u{0C}page two"), "page one\n\npage two");
    }

    #[test]
    fn test_sentence_splitting() {
        let processor = TextProcessor::new();
        let sentences =
            processor.split_sentences("John Doe. Built APIs using Python.\n• Reduced latency by 30%");

        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[2], "• Reduced latency by 30%");
    }

    #[test]
    fn test_bullet_detection() {
        let processor = TextProcessor::new();
        assert_eq!(processor.bullet_glyph("• Led a team"), Some('•'));
        assert_eq!(processor.bullet_glyph("- Led a team"), Some('-'));
        assert_eq!(processor.bullet_glyph("-5% churn"), None);
        assert_eq!(processor.bullet_glyph("Led a team"), None);
        assert_eq!(processor.strip_bullet("▪ Shipped v2"), "Shipped v2");
    }

    #[test]
    fn test_contact_patterns() {
        let processor = TextProcessor::new();
        assert!(processor.contains_email("Reach me: jane.doe@example.com"));
        assert!(!processor.contains_email("jane.doe at example dot com"));
        assert!(processor.contains_phone("(555) 123-4567"));
        assert!(processor.contains_number("grew revenue 40%"));
        assert!(!processor.contains_number("grew revenue"));
    }

    #[test]
    fn test_decorative_symbols() {
        let processor = TextProcessor::new();
        assert!(processor.is_decorative_symbol('\u{E000}'));
        assert!(processor.is_decorative_symbol('☎'));
        assert!(!processor.is_decorative_symbol('•'));
        assert!(!processor.is_decorative_symbol('é'));
        assert!(!processor.is_decorative_symbol('-'));
    }
}
